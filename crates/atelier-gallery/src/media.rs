use atelier_engine::coords::{Rect, Vec2};
use atelier_engine::scene::{MeshCmd, MeshTransform, TextureRef};
use log::{debug, warn};

use crate::fade::{Fade, FadeConfig, FadeState};
use crate::projection::{Projection, project};
use crate::texture::{LoadError, TextureLoader, TextureState};
use crate::viewport::{BoundsSource, MediaElement, ViewportContext};

/// One page element and its textured mesh.
///
/// Placement is derived entirely from the bounds captured at the last resize
/// and the scroll vector passed to `update`; texture readiness never affects
/// it. Opacity only moves through `show`/`hide` and `animate`.
#[derive(Debug)]
pub struct MediaItem {
    element: MediaElement,
    index: usize,

    ctx: ViewportContext,
    bounds: Option<Rect>,
    extra: Vec2,
    transform: MeshTransform,

    fade: Fade,
    texture: TextureState,

    warned_degenerate: bool,
}

impl MediaItem {
    /// Creates the item and starts its single texture request.
    ///
    /// `rotation_z` is fixed for the item's lifetime.
    pub fn new(
        element: MediaElement,
        index: usize,
        loader: &TextureLoader,
        fade: FadeConfig,
        rotation_z: f32,
    ) -> Self {
        let texture = match element.data_src.as_deref() {
            Some(src) => TextureState::Pending(loader.request(src)),
            None => {
                warn!("media `{}` has no data-src; it will stay untextured", element.id);
                TextureState::Failed(LoadError::MissingSource)
            }
        };

        Self {
            element,
            index,
            ctx: ViewportContext::default(),
            bounds: None,
            extra: Vec2::ZERO,
            transform: MeshTransform {
                rotation_z,
                ..MeshTransform::default()
            },
            fade: Fade::new(fade),
            texture,
            warned_degenerate: false,
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn element(&self) -> &MediaElement {
        &self.element
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Layout box captured at the last resize.
    #[inline]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    #[inline]
    pub fn extra(&self) -> Vec2 {
        self.extra
    }

    #[inline]
    pub fn transform(&self) -> &MeshTransform {
        &self.transform
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.fade.opacity()
    }

    #[inline]
    pub fn fade_state(&self) -> FadeState {
        self.fade.state()
    }

    #[inline]
    pub fn texture_state(&self) -> &TextureState {
        &self.texture
    }

    #[inline]
    pub fn texture(&self) -> Option<&TextureRef> {
        self.texture.texture()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Stores the new extents, re-reads the element's bounds and re-projects
    /// with `scroll`. The wrap offset is reset.
    pub fn on_resize(&mut self, ctx: ViewportContext, source: &dyn BoundsSource, scroll: Vec2) {
        self.ctx = ctx;
        self.extra = Vec2::ZERO;
        self.warned_degenerate = false;

        self.bounds = source.bounds(&self.element).filter(|b| b.is_finite());
        if self.bounds.is_none() {
            debug!("media `{}` is not laid out", self.element.id);
        }

        self.update(scroll);
    }

    /// Re-projects from the captured bounds and `scroll`.
    ///
    /// No-op until bounds have been captured. A degenerate viewport keeps the
    /// previous transform.
    pub fn update(&mut self, scroll: Vec2) {
        let Some(bounds) = self.bounds else { return };

        match project(bounds, &self.ctx, scroll, self.extra) {
            Some(Projection { position, scale }) => {
                self.transform.position = position;
                self.transform.scale = scale;
            }
            None => {
                if !self.warned_degenerate {
                    debug!("media `{}`: degenerate viewport {:?}, keeping transform", self.element.id, self.ctx);
                    self.warned_degenerate = true;
                }
            }
        }
    }

    /// Shifts the horizontal extra offset and re-projects with `scroll`.
    pub(crate) fn shift_extra_x(&mut self, dx: f32, scroll: Vec2) {
        self.extra.x += dx;
        self.update(scroll);
    }

    /// Horizontal scene-space edges of the current transform, rotation included:
    /// the extent of the rotated quad, not of its unrotated box.
    pub(crate) fn horizontal_edges(&self) -> (f32, f32) {
        let t = &self.transform;
        let (sin, cos) = t.rotation_z.sin_cos();
        let half = (t.scale.x * cos).abs() / 2.0 + (t.scale.y * sin).abs() / 2.0;
        (t.position.x - half, t.position.x + half)
    }

    pub fn show(&mut self) {
        self.fade.show();
    }

    pub fn hide(&mut self) {
        self.fade.hide();
    }

    /// Advances the fade tween by `dt` seconds.
    pub fn animate(&mut self, dt: f32) {
        self.fade.advance(dt);
    }

    /// Picks up a finished decode. Returns `true` when the state changed.
    pub fn poll_texture(&mut self) -> bool {
        let TextureState::Pending(pending) = &self.texture else {
            return false;
        };
        let Some(result) = pending.poll() else {
            return false;
        };

        self.texture = match result {
            Ok(texture) => {
                debug!(
                    "media `{}` textured ({}x{})",
                    self.element.id, texture.image.width, texture.image.height
                );
                TextureState::Loaded(texture)
            }
            Err(e) => {
                warn!("media `{}`: {e}", self.element.id);
                TextureState::Failed(e)
            }
        };
        true
    }

    /// The mesh to draw this frame. Untextured items carry no texture and are
    /// drawn with the renderer's placeholder.
    pub fn mesh_cmd(&self) -> MeshCmd {
        MeshCmd {
            transform: self.transform,
            alpha: self.fade.opacity(),
            texture: self.texture.texture().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::ImageDecoder;
    use atelier_engine::coords::{Sizes, Viewport};
    use atelier_engine::scene::ImageData;
    use std::path::Path;

    struct SolidDecoder;

    impl ImageDecoder for SolidDecoder {
        fn decode(&self, _path: &Path) -> Result<ImageData, LoadError> {
            Ok(ImageData::solid(4, 4, [10, 20, 30, 255]))
        }
    }

    /// Never finishes: the worker blocks until the test drops the loader.
    struct StuckDecoder(crossbeam_channel::Receiver<()>);

    impl ImageDecoder for StuckDecoder {
        fn decode(&self, _path: &Path) -> Result<ImageData, LoadError> {
            let _ = self.0.recv();
            Err(LoadError::Disconnected)
        }
    }

    fn ctx() -> ViewportContext {
        ViewportContext::new(Viewport::new(1000.0, 800.0), Sizes::new(10.0, 8.0))
    }

    fn layout(_: &MediaElement) -> Option<Rect> {
        Some(Rect::new(100.0, 50.0, 200.0, 100.0))
    }

    fn item(loader: &TextureLoader) -> MediaItem {
        MediaItem::new(MediaElement::new("m0", "a.png"), 0, loader, FadeConfig::default(), 0.0)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    // ── placement ─────────────────────────────────────────────────────────

    #[test]
    fn update_before_resize_is_a_no_op() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        let before = *m.transform();
        m.update(Vec2::new(123.0, -45.0));
        assert_eq!(*m.transform(), before);
        assert_eq!(m.bounds(), None);
    }

    #[test]
    fn resize_projects_reference_element() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        m.on_resize(ctx(), &layout, Vec2::ZERO);
        let t = m.transform();
        assert!(approx(t.position.x, -3.0) && approx(t.position.y, 3.0), "{t:?}");
        assert!(approx(t.scale.x, 2.0) && approx(t.scale.y, 1.0), "{t:?}");
    }

    #[test]
    fn repeated_resize_does_not_drift() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        let scroll = Vec2::new(-37.0, 12.5);
        m.on_resize(ctx(), &layout, scroll);
        let first = *m.transform();
        m.on_resize(ctx(), &layout, scroll);
        assert_eq!(*m.transform(), first);
    }

    #[test]
    fn pending_texture_still_places_mesh() {
        let (release, stuck) = crossbeam_channel::unbounded();
        let loader = TextureLoader::new(1, StuckDecoder(stuck)).unwrap();
        let mut m = item(&loader);

        m.on_resize(ctx(), &layout, Vec2::ZERO);
        assert!(!m.poll_texture());
        assert!(m.texture_state().is_pending());
        assert!(approx(m.transform().position.x, -3.0));
        assert!(approx(m.transform().scale.x, 2.0));
        assert_eq!(m.mesh_cmd().texture, None);

        drop(m);
        drop(release);
    }

    #[test]
    fn unlaid_element_keeps_no_bounds() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        let before = *m.transform();
        m.on_resize(ctx(), &|_: &MediaElement| -> Option<Rect> { None }, Vec2::ZERO);
        assert_eq!(m.bounds(), None);
        assert_eq!(*m.transform(), before);
    }

    #[test]
    fn degenerate_viewport_keeps_last_transform() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        m.on_resize(ctx(), &layout, Vec2::ZERO);
        let placed = *m.transform();

        let collapsed = ViewportContext::new(Viewport::new(0.0, 0.0), Sizes::new(10.0, 8.0));
        m.on_resize(collapsed, &layout, Vec2::ZERO);
        assert_eq!(*m.transform(), placed);
    }

    #[test]
    fn resize_clears_wrap_offset() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        m.on_resize(ctx(), &layout, Vec2::ZERO);
        m.shift_extra_x(20.0, Vec2::ZERO);
        assert!(approx(m.transform().position.x, 17.0));

        m.on_resize(ctx(), &layout, Vec2::ZERO);
        assert_eq!(m.extra(), Vec2::ZERO);
        assert!(approx(m.transform().position.x, -3.0));
    }

    #[test]
    fn rotation_survives_updates() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = MediaItem::new(MediaElement::new("r", "r.png"), 3, &loader, FadeConfig::default(), 0.05);
        m.on_resize(ctx(), &layout, Vec2::new(10.0, 10.0));
        m.update(Vec2::ZERO);
        assert_eq!(m.transform().rotation_z, 0.05);
        assert_eq!(m.index(), 3);
    }

    #[test]
    fn edges_of_an_unrotated_item_match_its_scale() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        m.on_resize(ctx(), &layout, Vec2::ZERO);
        let (left, right) = m.horizontal_edges();
        assert!(approx(left, -4.0) && approx(right, -2.0), "{left} {right}");
    }

    #[test]
    fn edges_cover_the_rotated_corners() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let quarter = std::f32::consts::FRAC_PI_2;
        let mut m = MediaItem::new(MediaElement::new("q", "q.png"), 0, &loader, FadeConfig::default(), quarter);
        m.on_resize(ctx(), &layout, Vec2::ZERO);
        // 2 x 1 quad turned upright: 1 unit wide around x = -3.
        let (left, right) = m.horizontal_edges();
        assert!(approx(left, -3.5) && approx(right, -2.5), "{left} {right}");

        let eighth = std::f32::consts::FRAC_PI_4;
        let mut m = MediaItem::new(MediaElement::new("e", "e.png"), 0, &loader, FadeConfig::default(), eighth);
        m.on_resize(ctx(), &layout, Vec2::ZERO);
        let (left, right) = m.horizontal_edges();
        // (2 + 1) * cos(45°) wide.
        assert!((right - left - 3.0 * eighth.cos()).abs() < 1e-5);
        assert!(right > -2.0);
    }

    // ── texture ───────────────────────────────────────────────────────────

    #[test]
    fn poll_moves_pending_to_loaded() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        assert!(m.texture_state().is_pending());
        assert!(m.poll_texture());
        assert!(m.texture().is_some());
        assert!(!m.poll_texture());
        assert_eq!(m.mesh_cmd().texture.map(|t| t.image.width), Some(4));
    }

    #[test]
    fn missing_source_fails_without_request() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = MediaItem::new(MediaElement::without_source("x"), 0, &loader, FadeConfig::default(), 0.0);
        assert_eq!(m.texture_state().error(), Some(&LoadError::MissingSource));
        assert!(!m.poll_texture());
    }

    // ── fade ──────────────────────────────────────────────────────────────

    #[test]
    fn update_never_touches_opacity() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut m = item(&loader);
        m.on_resize(ctx(), &layout, Vec2::ZERO);
        m.show();
        m.animate(0.1);
        let alpha = m.opacity();
        for _ in 0..10 {
            m.update(Vec2::new(5.0, 5.0));
        }
        assert_eq!(m.opacity(), alpha);
        assert_eq!(m.mesh_cmd().alpha, alpha);
    }

    #[test]
    fn fresh_item_is_transparent() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let m = item(&loader);
        assert_eq!(m.mesh_cmd().alpha, 0.0);
        assert_eq!(m.fade_state(), FadeState::Hidden);
    }
}
