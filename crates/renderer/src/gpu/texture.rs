use bytemuck::{Pod, Zeroable};
use stripes::BYTES_PER_PIXEL;
use wgpu::util::DeviceExt;

use crate::error::RenderError;

/// Mirrors the `FrameParams` uniform block; padded to 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameParams {
    pub dims: [f32; 2],
    _padding: [f32; 2],
}

impl FrameParams {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dims: [width as f32, height as f32],
            _padding: [0.0; 2],
        }
    }
}

/// The texture every frame is copied into, plus the sampler and `dims`
/// uniform the fragment stage reads it through.
pub(crate) struct FrameTexture {
    texture: wgpu::Texture,
    params: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl FrameTexture {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        width: u32,
        height: u32,
        surface_size: (u32, u32),
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let (surface_width, surface_height) = surface_size;
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame params"),
            contents: bytemuck::bytes_of(&FrameParams::new(surface_width, surface_height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            params,
            bind_group,
            width,
            height,
        }
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Replaces the whole texture with `image` (tightly packed RGBA8 rows).
    pub fn upload(&self, queue: &wgpu::Queue, image: &[u8]) -> Result<(), RenderError> {
        let expected = self.expected_len();
        if image.len() != expected {
            return Err(RenderError::FrameSize {
                expected,
                actual: image.len(),
            });
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * BYTES_PER_PIXEL as u32),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    /// Updates `dims` after the surface changed size.
    pub fn set_surface_size(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(&self.params, 0, bytemuck::bytes_of(&FrameParams::new(width, height)));
    }
}

impl Drop for FrameTexture {
    fn drop(&mut self) {
        self.texture.destroy();
        self.params.destroy();
    }
}
