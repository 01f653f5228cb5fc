use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Unit quad vertex: position in `[-0.5, 0.5]`, uv in `[0, 1]` (v down).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // uv
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// Scene space is +Y up while image rows run top-down, hence v = 0 at the top edge.
const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [-0.5, -0.5], uv: [0.0, 1.0] },
    QuadVertex { pos: [0.5, -0.5], uv: [1.0, 1.0] },
    QuadVertex { pos: [0.5, 0.5], uv: [1.0, 0.0] },
    QuadVertex { pos: [-0.5, 0.5], uv: [0.0, 0.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// The single rectangle geometry shared by every gallery mesh.
///
/// Created once per renderer; each mesh is an instance of it, so adding items
/// never allocates new vertex or index buffers.
pub struct QuadGeometry {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
}

impl QuadGeometry {
    pub const INDEX_COUNT: u32 = QUAD_INDICES.len() as u32;

    pub fn new(device: &wgpu::Device) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("atelier quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("atelier quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self { vbo, ibo }
    }

    /// Binds vertex slot 0 and the index buffer.
    pub fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_centered_unit_square() {
        let (min, max) = QUAD_VERTICES.iter().fold(
            ([f32::MAX; 2], [f32::MIN; 2]),
            |(lo, hi), v| {
                (
                    [lo[0].min(v.pos[0]), lo[1].min(v.pos[1])],
                    [hi[0].max(v.pos[0]), hi[1].max(v.pos[1])],
                )
            },
        );
        assert_eq!(min, [-0.5, -0.5]);
        assert_eq!(max, [0.5, 0.5]);
    }

    #[test]
    fn top_edge_samples_first_image_row() {
        for v in QUAD_VERTICES {
            let expected_v = if v.pos[1] > 0.0 { 0.0 } else { 1.0 };
            assert_eq!(v.uv[1], expected_v);
        }
    }
}
