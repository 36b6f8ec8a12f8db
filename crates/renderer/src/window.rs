use std::sync::Arc;
use std::time::Duration;

use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, KeyCode, NamedKey, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::types::{AdapterSummary, BufferMode, RendererConfig};

/// Window, event connection, and GPU context for one run.
///
/// Fields drop top to bottom: the held surface image goes before the context,
/// and the context before the window it renders into.
pub(crate) struct DisplayBridge {
    pending: Option<wgpu::SurfaceTexture>,
    gpu: GpuContext,
    window: Arc<Window>,
    event_loop: EventLoop<()>,
    buffer_mode: BufferMode,
    resized: Option<PhysicalSize<u32>>,
    reconfigured: bool,
}

impl DisplayBridge {
    /// Connects to the windowing system, opens a window of the configured
    /// size, and binds a GPU context to it.
    pub(crate) fn open(config: &RendererConfig) -> Result<Self, RenderError> {
        let event_loop =
            EventLoop::new().map_err(|err| RenderError::DisplayUnavailable(err.to_string()))?;

        let (width, height) = config.surface_size;
        let window = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(|err| RenderError::WindowCreation(err.to_string()))?;
        window.focus_window();
        let window = Arc::new(window);

        let gpu = GpuContext::new(window.clone(), config.surface_size, config.buffer_mode)?;
        tracing::info!(
            width,
            height,
            mode = %config.buffer_mode,
            "opened flipbook window"
        );

        Ok(Self {
            pending: None,
            gpu,
            window,
            event_loop,
            buffer_mode: config.buffer_mode,
            resized: None,
            reconfigured: false,
        })
    }

    pub(crate) fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub(crate) fn adapter_summary(&self) -> &AdapterSummary {
        &self.gpu.adapter_summary
    }

    /// Drains pending window events without blocking. Returns true if the
    /// quit key was pressed (or the window was closed) since the previous
    /// poll; everything else except size changes is discarded.
    pub(crate) fn poll_quit(&mut self) -> bool {
        let window_id = self.window.id();
        let mut quit = false;
        let mut resized = None;

        let status = self.event_loop.pump_events(Some(Duration::ZERO), |event, _| {
            let Event::WindowEvent { window_id: id, event } = event else {
                return;
            };
            if id != window_id {
                return;
            }
            match event {
                WindowEvent::KeyboardInput { event, .. } => {
                    if is_quit_key(&event.physical_key, &event.logical_key, event.state) {
                        quit = true;
                    }
                }
                WindowEvent::CloseRequested => quit = true,
                WindowEvent::Resized(size) => resized = Some(size),
                _ => {}
            }
        });

        if let PumpStatus::Exit(code) = status {
            tracing::debug!(code, "event loop exited");
            quit = true;
        }
        if resized.is_some() {
            self.resized = resized;
        }
        quit
    }

    /// Acquires the next surface image, reconfiguring a stale surface once.
    /// `Ok(None)` means the acquire timed out and this frame is skipped.
    pub(crate) fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        if let Some(size) = self.resized.take() {
            if size != self.gpu.size() {
                self.reconfigure(size);
            }
        }

        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure(self.window.inner_size());
                Ok(Some(self.gpu.surface.get_current_texture()?))
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface acquire timed out; skipping frame");
                Ok(None)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Hands a rendered image to the display. Single buffering shows it
    /// straight away; double buffering holds it until [`Self::swap`].
    pub(crate) fn finish_frame(&mut self, frame: wgpu::SurfaceTexture) {
        match self.buffer_mode {
            BufferMode::Single => frame.present(),
            BufferMode::Double => {
                if self.pending.replace(frame).is_some() {
                    tracing::trace!("discarded back buffer that was never swapped");
                }
            }
        }
    }

    /// Presents the held back buffer.
    pub(crate) fn swap(&mut self) {
        if let Some(frame) = self.pending.take() {
            frame.present();
        }
    }

    /// True once after the swapchain was rebuilt at a new size.
    pub(crate) fn take_reconfigured(&mut self) -> bool {
        std::mem::take(&mut self.reconfigured)
    }

    fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        self.pending = None;
        self.gpu.resize(size);
        self.reconfigured = true;
        tracing::debug!(width = size.width, height = size.height, "reconfigured surface");
    }
}

/// Escape, matched on the physical key first so keyboard layout and modifiers
/// don't matter, and on the logical key as a fallback.
pub(crate) fn is_quit_key(physical: &PhysicalKey, logical: &Key, state: ElementState) -> bool {
    state == ElementState::Pressed
        && (*physical == PhysicalKey::Code(KeyCode::Escape)
            || *logical == Key::Named(NamedKey::Escape))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_quits() {
        assert!(is_quit_key(
            &PhysicalKey::Code(KeyCode::Escape),
            &Key::Named(NamedKey::Escape),
            ElementState::Pressed
        ));
    }

    #[test]
    fn escape_release_is_ignored() {
        assert!(!is_quit_key(
            &PhysicalKey::Code(KeyCode::Escape),
            &Key::Named(NamedKey::Escape),
            ElementState::Released
        ));
    }

    #[test]
    fn remapped_escape_still_quits() {
        assert!(is_quit_key(
            &PhysicalKey::Code(KeyCode::CapsLock),
            &Key::Named(NamedKey::Escape),
            ElementState::Pressed
        ));
    }

    #[test]
    fn other_keys_do_not_quit() {
        assert!(!is_quit_key(
            &PhysicalKey::Code(KeyCode::KeyQ),
            &Key::Named(NamedKey::Space),
            ElementState::Pressed
        ));
    }
}
