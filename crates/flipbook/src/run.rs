use std::io;

use anyhow::{Context, Result};
use renderer::{Renderer, RendererConfig};
use stripes::FrameSet;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Quiet GPU and windowing crates unless `RUST_LOG` says otherwise.
const DEFAULT_FILTER: &str =
    "warn,flipbook=info,renderer=info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";

pub fn run(args: Cli) -> Result<()> {
    initialise_tracing();

    let frames = FrameSet::standard(args.width, args.height)
        .with_context(|| format!("failed to build test frames at {}x{}", args.width, args.height))?;
    tracing::debug!(?frames, "generated test frames");

    let config = RendererConfig::new(args.width, args.height, args.mode);
    let renderer = Renderer::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = renderer.run(&frames, &mut out)?;

    tracing::info!(
        frames = report.frames,
        swaps = report.swaps,
        last_fps = ?report.last_fps,
        "flipbook finished"
    );
    Ok(())
}

/// Logs go to stderr; stdout carries the adapter lines and the FPS status line.
fn initialise_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
