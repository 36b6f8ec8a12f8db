use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::RenderError;
use crate::types::{AdapterSummary, BufferMode};

/// 8-bit four-channel formats in order of preference. Unorm first so the
/// swapchain stores exactly what the texture holds.
const PREFERRED_FORMATS: [wgpu::TextureFormat; 4] = [
    wgpu::TextureFormat::Bgra8Unorm,
    wgpu::TextureFormat::Rgba8Unorm,
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Rgba8UnormSrgb,
];

/// Owns the wgpu instance/device/surface wiring for the window.
pub(crate) struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub adapter_summary: AdapterSummary,
    _instance: wgpu::Instance,
}

impl GpuContext {
    /// Creates the rendering context bound to `window`.
    ///
    /// `texture_size` is the size of the frames that will be uploaded; it has
    /// to fit the adapter's texture limits just like the surface does.
    pub(crate) fn new(
        window: Arc<Window>,
        texture_size: (u32, u32),
        buffer_mode: BufferMode,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let initial_size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|err| RenderError::GpuInit(format!("failed to create rendering surface: {err}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| RenderError::GpuInit(format!("failed to find a suitable GPU adapter: {err}")))?;

        let adapter_info = adapter.get_info();
        let adapter_summary = AdapterSummary::from_wgpu(&adapter_info);
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;
        let (texture_width, texture_height) = texture_size;
        let size = PhysicalSize::new(initial_size.width.max(1), initial_size.height.max(1));
        for (width, height) in [(texture_width, texture_height), (size.width, size.height)] {
            if width > max_dimension || height > max_dimension {
                return Err(RenderError::GpuInit(format!(
                    "GPU max texture dimension is {max_dimension}, requested {width}x{height}"
                )));
            }
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("flipbook device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| RenderError::GpuInit(format!("failed to create GPU device: {err}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        if surface_caps.formats.is_empty() {
            return Err(RenderError::NoMatchingConfiguration(
                "surface is not compatible with the selected adapter".to_string(),
            ));
        }
        let format = choose_surface_format(&surface_caps.formats).ok_or_else(|| {
            RenderError::NoMatchingConfiguration(format!(
                "no RGBA colour format among {:?}",
                surface_caps.formats
            ))
        })?;

        let platform_default = surface
            .get_default_config(&adapter, size.width, size.height)
            .map(|config| config.present_mode)
            .unwrap_or(wgpu::PresentMode::Fifo);
        let present_mode =
            choose_present_mode(buffer_mode, &surface_caps.present_modes, platform_default);
        tracing::debug!(?format, ?present_mode, %buffer_mode, "using surface configuration");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: buffer_mode.frame_latency(),
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            adapter_summary,
            _instance: instance,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    /// Reconfigures the swapchain, e.g. after the surface went stale.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }
}

/// Picks a four-channel colour format the surface can present.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Option<wgpu::TextureFormat> {
    PREFERRED_FORMATS
        .iter()
        .copied()
        .find(|format| formats.contains(format))
        .or_else(|| {
            formats
                .iter()
                .copied()
                .find(|format| format.components() == 4)
        })
}

/// Double buffering keeps whatever the platform presents with by default, so
/// swap pacing stays in the driver's hands. Single buffering asks for the
/// least synchronised mode available.
pub(crate) fn choose_present_mode(
    buffer_mode: BufferMode,
    available: &[wgpu::PresentMode],
    platform_default: wgpu::PresentMode,
) -> wgpu::PresentMode {
    match buffer_mode {
        BufferMode::Double => platform_default,
        BufferMode::Single => [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
            .into_iter()
            .find(|mode| available.contains(mode))
            .unwrap_or_else(|| {
                tracing::warn!(
                    ?available,
                    fallback = ?platform_default,
                    "no unsynchronised present mode available; single-buffer mode will be paced by the platform"
                );
                platform_default
            }),
    }
}
