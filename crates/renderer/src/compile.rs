use std::borrow::Cow;

use wgpu::naga;

use crate::error::{RenderError, ShaderStage};

/// Passes the quad corners straight through to clip space at depth 0.5.
pub(crate) const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.5, 1.0);
}
";

/// Samples the frame texture at the fragment's window position normalised by
/// `dims`. Window coordinates and texture `v` share a top-left origin here, so
/// image row 0 maps to the top of the window without flipping.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform FrameParams {
    vec2 dims;
} params;
layout(set = 0, binding = 1) uniform texture2D frame_texture;
layout(set = 0, binding = 2) uniform sampler frame_sampler;

void main() {
    vec2 uv = gl_FragCoord.xy / params.dims;
    outColor = texture(sampler2D(frame_texture, frame_sampler), uv);
}
";

/// Entry point shared by both stages.
pub(crate) const ENTRY_POINT: &str = "main";

pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, RenderError> {
    compile_shader(
        device,
        ShaderStage::Vertex,
        "flipbook vertex",
        VERTEX_SHADER_GLSL,
    )
}

pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, RenderError> {
    compile_shader(
        device,
        ShaderStage::Fragment,
        "flipbook fragment",
        FRAGMENT_SHADER_GLSL,
    )
}

/// Compiles one GLSL stage, turning validation failures into a
/// [`RenderError::ShaderCompile`] that carries the compiler log.
fn compile_shader(
    device: &wgpu::Device,
    stage: ShaderStage,
    label: &str,
    source: &'static str,
) -> Result<wgpu::ShaderModule, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage: naga_stage(stage),
            defines: &[],
        },
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(RenderError::ShaderCompile {
            stage,
            log: error.to_string(),
        });
    }
    tracing::debug!(%stage, "compiled shader stage");
    Ok(module)
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::front::glsl::{Frontend, Options};
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    fn parse_and_validate(source: &str, stage: naga::ShaderStage) -> naga::Module {
        let module = Frontend::default()
            .parse(&Options::from(stage), source)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed to parse: {err:?}"));
        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed validation: {err:?}"));
        module
    }

    #[test]
    fn vertex_shader_is_valid_glsl() {
        let module = parse_and_validate(VERTEX_SHADER_GLSL, naga::ShaderStage::Vertex);
        assert!(module
            .entry_points
            .iter()
            .any(|entry| entry.name == ENTRY_POINT && entry.stage == naga::ShaderStage::Vertex));
    }

    #[test]
    fn fragment_shader_is_valid_glsl() {
        let module = parse_and_validate(FRAGMENT_SHADER_GLSL, naga::ShaderStage::Fragment);
        assert!(module
            .entry_points
            .iter()
            .any(|entry| entry.name == ENTRY_POINT && entry.stage == naga::ShaderStage::Fragment));
    }

    #[test]
    fn broken_source_is_rejected() {
        let source = "#version 450\nvoid main() { gl_Position = no_such_symbol; }\n";
        assert!(Frontend::default()
            .parse(&Options::from(naga::ShaderStage::Vertex), source)
            .is_err());
    }
}
