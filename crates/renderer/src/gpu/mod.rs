//! GPU side of the harness.
//!
//! - `context` owns the wgpu instance/adapter/device/surface and picks the
//!   surface format and present mode for the requested buffering.
//! - `pipeline` compiles the two GLSL stages and links them into the render
//!   pipeline (the "program").
//! - `geometry` holds the static full-window quad.
//! - `texture` is the per-frame image carrier plus its sampler and `dims`
//!   uniform.

mod context;
mod geometry;
mod pipeline;
mod texture;

pub(crate) use context::GpuContext;

use geometry::QuadGeometry;
use pipeline::ShaderProgram;
use texture::FrameTexture;

use crate::error::RenderError;

/// Program, quad, and texture created once at start-up and reused for every
/// frame.
pub(crate) struct GpuResources {
    program: ShaderProgram,
    geometry: QuadGeometry,
    texture: FrameTexture,
}

impl GpuResources {
    pub fn new(context: &GpuContext, width: u32, height: u32) -> Result<Self, RenderError> {
        let program = ShaderProgram::new(&context.device, context.config.format)?;
        let geometry = QuadGeometry::new(&context.device);
        let surface = context.size();
        let texture = FrameTexture::new(
            &context.device,
            &program.bind_group_layout,
            width,
            height,
            (surface.width, surface.height),
        );
        tracing::debug!(width, height, "created GPU resources");
        Ok(Self {
            program,
            geometry,
            texture,
        })
    }

    pub fn upload(&self, context: &GpuContext, image: &[u8]) -> Result<(), RenderError> {
        self.texture.upload(&context.queue, image)
    }

    pub fn surface_resized(&self, context: &GpuContext) {
        let size = context.size();
        self.texture
            .set_surface_size(&context.queue, size.width, size.height);
    }

    /// Records the clear plus (optionally) the quad draw into `target`.
    pub fn encode(
        &self,
        context: &GpuContext,
        target: &wgpu::TextureView,
        draw_quad: bool,
    ) -> wgpu::CommandBuffer {
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("flipbook encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("flipbook pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if draw_quad {
                pass.set_pipeline(&self.program.pipeline);
                pass.set_bind_group(0, &self.texture.bind_group, &[]);
                self.geometry.draw(&mut pass);
            }
        }
        encoder.finish()
    }
}
