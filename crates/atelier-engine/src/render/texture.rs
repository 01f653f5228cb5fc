use std::collections::{HashMap, HashSet};

use crate::scene::{ImageData, TextureId, TextureRef};

use super::ctx::RenderCtx;

/// Uploaded texture plus the bind group that exposes it to the media shader
/// as `tMap` (binding 0) with its sampler (binding 1).
pub struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl GpuTexture {
    /// Uploads `image` as `Rgba8UnormSrgb`.
    ///
    /// Images wider or taller than `ctx.max_texture_dimension` are resampled
    /// (nearest) so that the longest edge fits the device limit.
    pub fn upload(
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        image: &ImageData,
        label: &str,
    ) -> Self {
        let fitted = fit_to_limit(image, ctx.max_texture_dimension.max(1));
        let image = fitted.as_ref().unwrap_or(image);

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.bytes_per_row()),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            _texture: texture,
            bind_group,
            width: image.width,
            height: image.height,
        }
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// GPU copies of the textures referenced by the scene, keyed by `TextureId`.
///
/// Each id is uploaded once. Entries that were not referenced during a frame
/// are released by `retain_used`. The placeholder is a 1x1 transparent texture
/// bound for meshes whose sampler has no image yet.
pub struct TextureCache {
    sampler: wgpu::Sampler,
    placeholder: GpuTexture,
    resident: Residency<GpuTexture>,
}

impl TextureCache {
    pub fn new(ctx: &RenderCtx<'_>, layout: &wgpu::BindGroupLayout) -> Self {
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atelier media sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let placeholder = GpuTexture::upload(
            ctx,
            layout,
            &sampler,
            &ImageData::solid(1, 1, [0, 0, 0, 0]),
            "atelier placeholder texture",
        );

        Self {
            sampler,
            placeholder,
            resident: Residency::new(),
        }
    }

    /// Marks `texture` as used this frame, uploading it on first sight.
    pub fn prepare(
        &mut self,
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        texture: Option<&TextureRef>,
    ) {
        let Some(texture) = texture else { return };
        if !self.resident.mark(texture.id) {
            return;
        }

        let label = format!("atelier media texture {}", texture.id.0);
        let gpu = GpuTexture::upload(ctx, layout, &self.sampler, &texture.image, &label);
        log::debug!(
            "uploaded texture {} ({}x{})",
            texture.id.0,
            gpu.width,
            gpu.height
        );
        self.resident.insert(texture.id, gpu);
    }

    /// Bind group for `texture`, or the placeholder when it is absent.
    pub fn bind_group(&self, texture: Option<&TextureRef>) -> &wgpu::BindGroup {
        texture
            .and_then(|t| self.resident.get(t.id))
            .unwrap_or(&self.placeholder)
            .bind_group()
    }

    /// Drops every texture that was not prepared since the last call.
    pub fn retain_used(&mut self) {
        let released = self.resident.sweep();
        if released > 0 {
            log::debug!("released {released} unused texture(s)");
        }
    }
}

/// Id bookkeeping behind `TextureCache`: what is resident, and what was
/// referenced since the last sweep.
struct Residency<T> {
    entries: HashMap<TextureId, T>,
    used: HashSet<TextureId>,
}

impl<T> Residency<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            used: HashSet::new(),
        }
    }

    /// Records a reference to `id`. Returns `true` when it still needs an entry.
    fn mark(&mut self, id: TextureId) -> bool {
        self.used.insert(id);
        !self.entries.contains_key(&id)
    }

    fn insert(&mut self, id: TextureId, value: T) {
        self.entries.insert(id, value);
    }

    fn get(&self, id: TextureId) -> Option<&T> {
        self.entries.get(&id)
    }

    /// Drops entries not marked since the previous sweep; returns how many.
    fn sweep(&mut self) -> usize {
        let used = std::mem::take(&mut self.used);
        let before = self.entries.len();
        self.entries.retain(|id, _| used.contains(id));
        before - self.entries.len()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Nearest-neighbour downscale so neither edge exceeds `limit`.
/// Returns `None` when the image already fits.
fn fit_to_limit(image: &ImageData, limit: u32) -> Option<ImageData> {
    let (w, h) = (image.width, image.height);
    if w <= limit && h <= limit {
        return None;
    }

    let scale = limit as f64 / w.max(h) as f64;
    let nw = ((w as f64 * scale).round() as u32).clamp(1, limit);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, limit);

    let mut pixels = Vec::with_capacity(nw as usize * nh as usize * 4);
    for y in 0..nh {
        let sy = (y as u64 * h as u64 / nh as u64) as usize;
        for x in 0..nw {
            let sx = (x as u64 * w as u64 / nw as u64) as usize;
            let i = (sy * w as usize + sx) * 4;
            pixels.extend_from_slice(&image.pixels[i..i + 4]);
        }
    }

    ImageData::new(nw, nh, pixels)
}
