//! Renderer crate for the flipbook tearing harness.
//!
//! Puts one window on screen, uploads a precomputed frame into a texture every
//! iteration, draws it across the window and swaps as fast as the platform
//! allows. The flow is:
//!
//! ```text
//!   flipbook CLI
//!          │ RendererConfig + FrameSet
//!          ▼
//!   Renderer::run ──▶ DisplayBridge::open ──▶ GpuResources::new ──▶ clear
//!          │
//!          └─▶ run_loop: poll_quit ─▶ FPS line ─▶ draw(frame) ─▶ swap (double only)
//! ```
//!
//! `DisplayBridge` owns the winit event loop, the window and the wgpu surface;
//! `GpuResources` owns the shader program, the quad and the frame texture.
//! `run_loop` is generic over [`FrameTarget`] and [`LapTimer`] so its rules can
//! be exercised without a GPU.

mod compile;
mod driver;
mod error;
mod gpu;
mod runtime;
mod types;
mod window;

pub use driver::{fps_due, run_loop, FrameTarget, LoopReport, Renderer, FPS_INTERVAL};
pub use error::{RenderError, ShaderStage};
pub use runtime::{ElapsedTimer, LapTimer};
pub use types::{vendor_name, AdapterSummary, BufferMode, RendererConfig};
