use std::io;

/// Programmable stage a shader module was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures raised while bringing up or driving the harness.
///
/// Everything before the first frame is fatal for the run; there is no retry.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("can't open display: {0}")]
    DisplayUnavailable(String),
    #[error("failed to create window: {0}")]
    WindowCreation(String),
    #[error("no matching pixel configuration: {0}")]
    NoMatchingConfiguration(String),
    #[error("GPU initialisation failed: {0}")]
    GpuInit(String),
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{0}")]
    ProgramLink(String),
    #[error("frame payload is {actual} bytes, texture expects {expected}")]
    FrameSize { expected: usize, actual: usize },
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("failed to write status line")]
    Status(#[from] io::Error),
}
