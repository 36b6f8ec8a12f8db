//! The render loop and the GPU-backed target it drives.
//!
//! `run_loop` only sees the [`FrameTarget`] and [`LapTimer`] traits, so the
//! ordering rules (poll, report, draw, swap, count) hold for any target.

use std::io::Write;

use stripes::FrameSet;

use crate::error::RenderError;
use crate::gpu::GpuResources;
use crate::runtime::{ElapsedTimer, LapTimer};
use crate::types::{BufferMode, RendererConfig};
use crate::window::DisplayBridge;

/// Iterations between FPS reports.
pub const FPS_INTERVAL: u64 = 100;

/// Something the loop can draw frames into.
pub trait FrameTarget {
    /// Non-blocking; true once the quit key has been seen.
    fn poll_quit(&mut self) -> bool;
    fn clear(&mut self) -> Result<(), RenderError>;
    /// Uploads `image` and draws the full-window quad with it.
    fn draw(&mut self, image: &[u8]) -> Result<(), RenderError>;
    fn swap(&mut self) -> Result<(), RenderError>;
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopReport {
    pub frames: u64,
    pub swaps: u64,
    pub last_fps: Option<f64>,
}

/// True on the iterations that close a reporting window.
pub fn fps_due(counter: u64) -> bool {
    counter % FPS_INTERVAL == FPS_INTERVAL - 1
}

/// Runs until `target` reports quit or a step fails.
///
/// The status line is rewritten in place with `\r` and a newline is written
/// on the way out, also when the loop stopped on an error.
pub fn run_loop<T, L, W>(
    target: &mut T,
    frames: &FrameSet,
    mode: BufferMode,
    timer: &mut L,
    status: &mut W,
) -> Result<LoopReport, RenderError>
where
    T: FrameTarget + ?Sized,
    L: LapTimer + ?Sized,
    W: Write + ?Sized,
{
    let mut report = LoopReport::default();
    let outcome = drive(target, frames, mode, timer, status, &mut report);
    let newline = status.write_all(b"\n").and_then(|()| status.flush());
    outcome?;
    newline?;
    Ok(report)
}

fn drive<T, L, W>(
    target: &mut T,
    frames: &FrameSet,
    mode: BufferMode,
    timer: &mut L,
    status: &mut W,
    report: &mut LoopReport,
) -> Result<(), RenderError>
where
    T: FrameTarget + ?Sized,
    L: LapTimer + ?Sized,
    W: Write + ?Sized,
{
    let mut counter: u64 = 0;
    loop {
        if target.poll_quit() {
            tracing::debug!(counter, "quit key pressed");
            return Ok(());
        }

        if fps_due(counter) {
            let fps = FPS_INTERVAL as f64 / timer.elapsed();
            write!(status, "FPS = {fps:.2}\r")?;
            status.flush()?;
            report.last_fps = Some(fps);
        }

        target.draw(frames.select(counter))?;
        report.frames += 1;

        if mode.is_double() {
            target.swap()?;
            report.swaps += 1;
        }

        counter += 1;
    }
}

/// GPU resources plus the window they render into. Resources are declared
/// first so they are released before the device and window go away.
struct Stage {
    resources: GpuResources,
    bridge: DisplayBridge,
}

impl Stage {
    /// Records one pass into the next surface image. `None` clears only.
    fn render(&mut self, image: Option<&[u8]>) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        let Some(frame) = self.bridge.acquire()? else {
            return Ok(None);
        };
        if self.bridge.take_reconfigured() {
            self.resources.surface_resized(self.bridge.gpu());
        }
        if let Some(image) = image {
            self.resources.upload(self.bridge.gpu(), image)?;
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self
            .resources
            .encode(self.bridge.gpu(), &view, image.is_some());
        self.bridge.gpu().queue.submit(Some(commands));
        Ok(Some(frame))
    }
}

impl FrameTarget for Stage {
    fn poll_quit(&mut self) -> bool {
        self.bridge.poll_quit()
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        if let Some(frame) = self.render(None)? {
            frame.present();
        }
        Ok(())
    }

    fn draw(&mut self, image: &[u8]) -> Result<(), RenderError> {
        if let Some(frame) = self.render(Some(image))? {
            self.bridge.finish_frame(frame);
        }
        Ok(())
    }

    fn swap(&mut self) -> Result<(), RenderError> {
        self.bridge.swap();
        Ok(())
    }
}

/// Entry point: opens the window, runs the flipbook, tears everything down.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Shows `frames` until the quit key is pressed.
    ///
    /// The adapter description and the FPS status line go to `out`. Every GPU
    /// and window resource is released before this returns, on success and
    /// on error alike.
    pub fn run<W: Write + ?Sized>(
        &self,
        frames: &FrameSet,
        out: &mut W,
    ) -> Result<LoopReport, RenderError> {
        let bridge = DisplayBridge::open(&self.config)?;
        writeln!(out, "{}", bridge.adapter_summary())?;
        out.flush()?;

        let resources = GpuResources::new(bridge.gpu(), frames.width(), frames.height())?;
        let mut stage = Stage { resources, bridge };
        stage.clear()?;

        let mut timer = ElapsedTimer::new();
        timer.reset();
        let report = run_loop(&mut stage, frames, self.config.buffer_mode, &mut timer, out);

        drop(stage);
        tracing::debug!("released window and GPU resources");
        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Poll,
        Draw(usize),
        Swap,
    }

    /// Records calls; quits on the poll after `frames_before_quit` draws.
    struct RecordingTarget<'a> {
        frames: &'a FrameSet,
        frames_before_quit: usize,
        fail_on_draw: Option<usize>,
        calls: Vec<Call>,
        draws: usize,
    }

    impl<'a> RecordingTarget<'a> {
        fn new(frames: &'a FrameSet, frames_before_quit: usize) -> Self {
            Self {
                frames,
                frames_before_quit,
                fail_on_draw: None,
                calls: Vec::new(),
                draws: 0,
            }
        }

        fn drawn(&self) -> Vec<usize> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Draw(index) => Some(*index),
                    _ => None,
                })
                .collect()
        }

        fn swaps(&self) -> usize {
            self.calls.iter().filter(|call| **call == Call::Swap).count()
        }
    }

    impl FrameTarget for RecordingTarget<'_> {
        fn poll_quit(&mut self) -> bool {
            self.calls.push(Call::Poll);
            self.draws >= self.frames_before_quit
        }

        fn clear(&mut self) -> Result<(), RenderError> {
            Ok(())
        }

        fn draw(&mut self, image: &[u8]) -> Result<(), RenderError> {
            if self.fail_on_draw == Some(self.draws) {
                return Err(RenderError::FrameSize {
                    expected: image.len(),
                    actual: 0,
                });
            }
            let index = (0..self.frames.len())
                .find(|&index| self.frames.frame_bytes(index) == image)
                .expect("drawn image is one of the generated frames");
            self.calls.push(Call::Draw(index));
            self.draws += 1;
            Ok(())
        }

        fn swap(&mut self) -> Result<(), RenderError> {
            self.calls.push(Call::Swap);
            Ok(())
        }
    }

    /// Hands out queued lap lengths, then a fixed step.
    struct StepTimer {
        laps: VecDeque<f64>,
        step: f64,
        calls: usize,
    }

    impl StepTimer {
        fn fixed(step: f64) -> Self {
            Self {
                laps: VecDeque::new(),
                step,
                calls: 0,
            }
        }
    }

    impl LapTimer for StepTimer {
        fn reset(&mut self) {}

        fn elapsed(&mut self) -> f64 {
            self.calls += 1;
            self.laps.pop_front().unwrap_or(self.step)
        }
    }

    fn small_frames() -> FrameSet {
        FrameSet::generate(40, 4, 10).unwrap()
    }

    fn status_text(status: Vec<u8>) -> String {
        String::from_utf8(status).unwrap()
    }

    #[test]
    fn double_buffering_swaps_once_per_frame() {
        let frames = small_frames();
        let mut target = RecordingTarget::new(&frames, 25);
        let mut status = Vec::new();

        let report = run_loop(
            &mut target,
            &frames,
            BufferMode::Double,
            &mut StepTimer::fixed(1.0),
            &mut status,
        )
        .unwrap();

        assert_eq!(report.frames, 25);
        assert_eq!(report.swaps, 25);
        assert_eq!(target.swaps(), 25);
        for window in target.calls.windows(2) {
            if let Call::Draw(_) = window[0] {
                assert_eq!(window[1], Call::Swap);
            }
        }
    }

    #[test]
    fn single_buffering_never_swaps() {
        let frames = small_frames();
        let mut target = RecordingTarget::new(&frames, 25);
        let mut status = Vec::new();

        let report = run_loop(
            &mut target,
            &frames,
            BufferMode::Single,
            &mut StepTimer::fixed(1.0),
            &mut status,
        )
        .unwrap();

        assert_eq!(report.frames, 25);
        assert_eq!(report.swaps, 0);
        assert_eq!(target.swaps(), 0);
    }

    #[test]
    fn fps_is_reported_every_hundred_iterations() {
        let frames = small_frames();
        let mut target = RecordingTarget::new(&frames, 250);
        let mut timer = StepTimer {
            laps: VecDeque::from([0.5, 2.0]),
            step: 1.0,
            calls: 0,
        };
        let mut status = Vec::new();

        let report = run_loop(
            &mut target,
            &frames,
            BufferMode::Double,
            &mut timer,
            &mut status,
        )
        .unwrap();

        assert_eq!(timer.calls, 2);
        assert_eq!(status_text(status), "FPS = 200.00\rFPS = 50.00\r\n");
        let last = report.last_fps.unwrap();
        assert!((last - 50.0).abs() < 1e-9);
    }

    #[test]
    fn no_fps_line_before_the_hundredth_iteration() {
        let frames = small_frames();
        let mut target = RecordingTarget::new(&frames, 99);
        let mut timer = StepTimer::fixed(1.0);
        let mut status = Vec::new();

        let report = run_loop(
            &mut target,
            &frames,
            BufferMode::Double,
            &mut timer,
            &mut status,
        )
        .unwrap();

        assert_eq!(timer.calls, 0);
        assert_eq!(report.last_fps, None);
        assert_eq!(status_text(status), "\n");
    }

    #[test]
    fn fps_cadence_matches_counter_rule() {
        let due: Vec<u64> = (0..400).filter(|&counter| fps_due(counter)).collect();
        assert_eq!(due, vec![99, 199, 299, 399]);
    }

    #[test]
    fn quit_stops_before_the_next_draw() {
        let frames = small_frames();
        let mut target = RecordingTarget::new(&frames, 0);
        let mut status = Vec::new();

        let report = run_loop(
            &mut target,
            &frames,
            BufferMode::Double,
            &mut StepTimer::fixed(1.0),
            &mut status,
        )
        .unwrap();

        assert_eq!(report, LoopReport::default());
        assert_eq!(target.calls, vec![Call::Poll]);
        assert_eq!(status_text(status), "\n");
    }

    #[test]
    fn frames_cycle_with_period_of_the_set() {
        let frames = small_frames();
        let mut target = RecordingTarget::new(&frames, 35);
        let mut status = Vec::new();

        run_loop(
            &mut target,
            &frames,
            BufferMode::Single,
            &mut StepTimer::fixed(1.0),
            &mut status,
        )
        .unwrap();

        let drawn = target.drawn();
        assert_eq!(drawn.len(), 35);
        assert_eq!(&drawn[..10], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        for k in 0..drawn.len() - 10 {
            assert_eq!(drawn[k], drawn[k + 10]);
        }
    }

    #[test]
    fn draw_failure_ends_the_loop_with_a_newline() {
        let frames = small_frames();
        let mut target = RecordingTarget::new(&frames, 100);
        target.fail_on_draw = Some(3);
        let mut status = Vec::new();

        let result = run_loop(
            &mut target,
            &frames,
            BufferMode::Double,
            &mut StepTimer::fixed(1.0),
            &mut status,
        );

        assert!(matches!(result, Err(RenderError::FrameSize { .. })));
        assert_eq!(target.drawn(), vec![0, 1, 2]);
        assert_eq!(target.swaps(), 3);
        assert_eq!(target.calls.last(), Some(&Call::Poll));
        assert_eq!(status_text(status), "\n");
    }
}
