use bytemuck::{Pod, Zeroable};

use crate::coords::Sizes;
use crate::scene::{MeshCmd, MeshList, TextureRef};

use super::ctx::{RenderCtx, RenderTarget};
use super::geometry::{QuadGeometry, QuadVertex};
use super::texture::TextureCache;

/// Draws `scene::MeshCmd` items as textured quads.
///
/// Pipeline:
/// - static unit-quad geometry shared by every mesh
/// - per-instance transform + alpha
/// - group 0: scene uniform (half of `Sizes`), group 1: per-texture bindings
///
/// GPU resources are created lazily on first use and rebuilt when the surface
/// format changes.
pub struct MeshRenderer {
    pipeline: Option<wgpu::RenderPipeline>,
    pipeline_format: Option<wgpu::TextureFormat>,

    scene_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,
    scene_ubo: Option<wgpu::Buffer>,
    scene_bind_group: Option<wgpu::BindGroup>,

    geometry: Option<QuadGeometry>,
    textures: Option<TextureCache>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    // Reused each frame.
    scratch_instances: Vec<MeshInstance>,
    scratch_textures: Vec<Option<TextureRef>>,
    scratch_referenced: Vec<TextureRef>,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self {
            pipeline: None,
            pipeline_format: None,
            scene_bgl: None,
            texture_bgl: None,
            scene_ubo: None,
            scene_bind_group: None,
            geometry: None,
            textures: None,
            instance_vbo: None,
            instance_capacity: 0,
            scratch_instances: Vec::new(),
            scratch_textures: Vec::new(),
            scratch_referenced: Vec::new(),
        }
    }

    /// Renders `list` into `target`, loading existing contents.
    ///
    /// `sizes` is the visible scene extent; it maps scene space to clip space.
    /// Meshes with `alpha <= 0` are not drawn, but their textures stay
    /// resident: only meshes missing from `list` release theirs.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        list: &mut MeshList,
        sizes: Sizes,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_static(ctx);

        self.gather(list);

        let (Some(texture_bgl), Some(textures)) = (self.texture_bgl.as_ref(), self.textures.as_mut())
        else {
            return;
        };
        for texture in &self.scratch_referenced {
            textures.prepare(ctx, texture_bgl, Some(texture));
        }
        textures.retain_used();

        if self.scratch_instances.is_empty() {
            return;
        }

        self.write_scene_uniform(ctx, sizes);
        self.ensure_instance_capacity(ctx, self.scratch_instances.len());

        let (
            Some(pipeline),
            Some(scene_bg),
            Some(geometry),
            Some(textures),
            Some(instance_vbo),
        ) = (
            self.pipeline.as_ref(),
            self.scene_bind_group.as_ref(),
            self.geometry.as_ref(),
            self.textures.as_ref(),
            self.instance_vbo.as_ref(),
        )
        else {
            return;
        };

        ctx.queue
            .write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.scratch_instances));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("atelier media pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, scene_bg, &[]);
        geometry.bind(&mut rpass);
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));

        for (i, texture) in self.scratch_textures.iter().enumerate() {
            let i = i as u32;
            rpass.set_bind_group(1, textures.bind_group(texture.as_ref()), &[]);
            rpass.draw_indexed(0..QuadGeometry::INDEX_COUNT, 0, i..i + 1);
        }
    }

    /// Splits `list` into drawable instances (with their textures) and the
    /// full set of textures the frame references, transparent meshes included.
    fn gather(&mut self, list: &mut MeshList) {
        self.scratch_instances.clear();
        self.scratch_textures.clear();
        self.scratch_referenced.clear();
        for item in list.iter_in_paint_order() {
            if let Some(texture) = &item.mesh.texture {
                self.scratch_referenced.push(texture.clone());
            }
            if let Some(instance) = MeshInstance::from_cmd(&item.mesh) {
                self.scratch_instances.push(instance);
                self.scratch_textures.push(item.mesh.texture.clone());
            }
        }
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("atelier media shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/media.wgsl").into()),
        });

        let scene_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("atelier scene bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SceneUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("atelier texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("atelier media pipeline layout"),
            bind_group_layouts: &[&scene_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("atelier media pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), MeshInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Texture bind groups reference the old layout; rebuild them too.
        let rebuild_textures = self.texture_bgl.is_some();

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.scene_bgl = Some(scene_bgl);
        self.texture_bgl = Some(texture_bgl);
        self.scene_ubo = None;
        self.scene_bind_group = None;
        if rebuild_textures {
            self.textures = None;
        }
    }

    fn ensure_static(&mut self, ctx: &RenderCtx<'_>) {
        if self.geometry.is_none() {
            self.geometry = Some(QuadGeometry::new(ctx.device));
        }

        if self.textures.is_none() {
            if let Some(bgl) = self.texture_bgl.as_ref() {
                self.textures = Some(TextureCache::new(ctx, bgl));
            }
        }

        if self.scene_bind_group.is_none() {
            let Some(bgl) = self.scene_bgl.as_ref() else { return };

            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("atelier scene ubo"),
                size: std::mem::size_of::<SceneUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("atelier scene bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                }],
            });

            self.scene_ubo = Some(ubo);
            self.scene_bind_group = Some(bind_group);
        }
    }

    fn write_scene_uniform(&mut self, ctx: &RenderCtx<'_>, sizes: Sizes) {
        let Some(ubo) = self.scene_ubo.as_ref() else { return };
        ctx.queue
            .write_buffer(ubo, 0, bytemuck::bytes_of(&SceneUniform::new(sizes)));
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(32);
        let new_size = (new_cap * std::mem::size_of::<MeshInstance>()) as u64;
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("atelier media instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SceneUniform {
    half_sizes: [f32; 2],
    _pad: [f32; 2],
}

impl SceneUniform {
    fn new(sizes: Sizes) -> Self {
        Self {
            half_sizes: [sizes.width.max(1e-6) * 0.5, sizes.height.max(1e-6) * 0.5],
            _pad: [0.0; 2],
        }
    }
}

/// Instance data layout (24 bytes):
///
///  offset  0  position  [f32; 2]  loc 2
///  offset  8  scale     [f32; 2]  loc 3
///  offset 16  rotation  f32       loc 4
///  offset 20  alpha     f32       loc 5
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct MeshInstance {
    position: [f32; 2],
    scale: [f32; 2],
    rotation: f32,
    alpha: f32,
}

impl MeshInstance {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        2 => Float32x2, // position
        3 => Float32x2, // scale
        4 => Float32,   // rotation
        5 => Float32    // alpha
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// `None` for meshes that would not produce any visible pixel.
    fn from_cmd(cmd: &MeshCmd) -> Option<Self> {
        let t = &cmd.transform;
        if !(cmd.alpha > 0.0) || !t.position.is_finite() || !t.scale.is_finite() {
            return None;
        }
        let alpha = cmd.alpha.min(1.0);
        Some(Self {
            position: [t.position.x, t.position.y],
            scale: [t.scale.x, t.scale.y],
            rotation: t.rotation_z,
            alpha,
        })
    }
}

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::scene::{ImageData, MeshTransform, TextureId, ZIndex};

    fn cmd(alpha: f32) -> MeshCmd {
        MeshCmd {
            transform: MeshTransform {
                position: Vec2::new(1.0, -2.0),
                scale: Vec2::new(3.0, 4.0),
                rotation_z: 0.25,
            },
            alpha,
            texture: None,
        }
    }

    #[test]
    fn instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshInstance>(), 24);
        assert_eq!(std::mem::size_of::<SceneUniform>(), 16);
    }

    #[test]
    fn instance_copies_transform() {
        let inst = MeshInstance::from_cmd(&cmd(0.5)).unwrap();
        assert_eq!(inst.position, [1.0, -2.0]);
        assert_eq!(inst.scale, [3.0, 4.0]);
        assert_eq!(inst.rotation, 0.25);
        assert_eq!(inst.alpha, 0.5);
    }

    #[test]
    fn transparent_meshes_are_skipped() {
        assert!(MeshInstance::from_cmd(&cmd(0.0)).is_none());
        assert!(MeshInstance::from_cmd(&cmd(-1.0)).is_none());
        assert!(MeshInstance::from_cmd(&cmd(f32::NAN)).is_none());
    }

    #[test]
    fn alpha_is_capped_at_one() {
        assert_eq!(MeshInstance::from_cmd(&cmd(3.0)).unwrap().alpha, 1.0);
    }

    #[test]
    fn scene_uniform_halves_sizes() {
        let u = SceneUniform::new(Sizes::new(8.0, 6.0));
        assert_eq!(u.half_sizes, [4.0, 3.0]);
    }

    // ── frame gathering ───────────────────────────────────────────────────

    fn textured(alpha: f32, id: u64) -> MeshCmd {
        MeshCmd {
            texture: Some(TextureRef::new(TextureId(id), ImageData::solid(1, 1, [0; 4]))),
            ..cmd(alpha)
        }
    }

    #[test]
    fn hidden_meshes_keep_their_textures_referenced() {
        let mut list = MeshList::new();
        list.push(ZIndex(0), textured(0.0, 1));
        list.push(ZIndex(0), textured(0.7, 2));
        list.push(ZIndex(0), cmd(1.0));

        let mut renderer = MeshRenderer::new();
        renderer.gather(&mut list);

        assert_eq!(renderer.scratch_instances.len(), 2);
        assert_eq!(renderer.scratch_textures.len(), 2);
        let referenced: Vec<TextureId> =
            renderer.scratch_referenced.iter().map(|t| t.id).collect();
        assert_eq!(referenced, vec![TextureId(1), TextureId(2)]);
    }

    #[test]
    fn fully_hidden_frame_still_references_everything() {
        let mut list = MeshList::new();
        for id in 0..4 {
            list.push(ZIndex(0), textured(0.0, id));
        }

        let mut renderer = MeshRenderer::new();
        renderer.gather(&mut list);

        assert!(renderer.scratch_instances.is_empty());
        assert_eq!(renderer.scratch_referenced.len(), 4);
    }
}
