use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// One corner of the full-window quad, bound to the `position` input.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Top-left, top-right, bottom-right, bottom-left in normalised device space.
pub(crate) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, 1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [-1.0, -1.0] },
];

/// Two triangles sharing the 0-2 diagonal.
pub(crate) const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Static vertex and index buffers for the quad.
pub(crate) struct QuadGeometry {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
}

impl QuadGeometry {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        QUAD_INDICES.len() as u32
    }

    /// Binds both buffers and issues the single indexed draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count(), 0, 0..1);
    }
}

impl Drop for QuadGeometry {
    fn drop(&mut self) {
        self.indices.destroy();
        self.vertices.destroy();
        tracing::debug!("released quad geometry buffers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_spans_normalised_device_range() {
        let xs: Vec<f32> = QUAD_VERTICES.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = QUAD_VERTICES.iter().map(|v| v.position[1]).collect();
        for axis in [xs, ys] {
            assert_eq!(axis.iter().cloned().fold(f32::INFINITY, f32::min), -1.0);
            assert_eq!(axis.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 1.0);
        }
    }

    #[test]
    fn indices_cover_quad_with_two_triangles() {
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&index| (index as usize) < QUAD_VERTICES.len()));
        let mut used: Vec<u32> = QUAD_INDICES.to_vec();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3]);
    }

    #[test]
    fn vertex_layout_matches_position_input() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x2);
    }
}
