use atelier_engine::coords::Vec2;
use atelier_engine::scene::{MeshList, ZIndex};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GalleryConfig;
use crate::media::MediaItem;
use crate::scroll::{DragSession, ScrollAxis};
use crate::texture::TextureLoader;
use crate::viewport::{BoundsSource, MediaElement, ViewportContext};

/// A set of media items sharing one smoothed scroll state.
///
/// Frame order expected from the driver:
/// 1. `on_resize` (only after a size change)
/// 2. input (`on_input_*`, `on_wheel`)
/// 3. `poll_textures`, `animate(dt)`, `update()`
/// 4. `draw`
///
/// `update` steps the smoothing exactly once and hands the same scroll vector
/// to every item, so items never drift relative to each other.
#[derive(Debug)]
pub struct GalleryGroup {
    config: GalleryConfig,
    items: Vec<MediaItem>,

    x: ScrollAxis,
    y: ScrollAxis,
    drag: Option<DragSession>,

    ctx: Option<ViewportContext>,
    wrap_period: Option<f32>,
}

impl GalleryGroup {
    /// Creates one item per element, in order, and starts their texture loads.
    pub fn new<I>(elements: I, loader: &TextureLoader, config: GalleryConfig) -> Self
    where
        I: IntoIterator<Item = MediaElement>,
    {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let jitter = config
            .rotation_jitter
            .filter(|j| j.is_finite() && *j > 0.0);

        let items: Vec<MediaItem> = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let rotation = jitter.map_or(0.0, |j| rng.gen_range(-j..=j));
                MediaItem::new(element, index, loader, config.fade, rotation)
            })
            .collect();

        debug!("gallery created with {} item(s), axes {:?}", items.len(), config.axes);

        Self {
            x: ScrollAxis::new(config.smoothing),
            y: ScrollAxis::new(config.smoothing),
            config,
            items,
            drag: None,
            ctx: None,
            wrap_period: None,
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    #[inline]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Smoothed scroll vector published to items. Locked axes read 0.
    pub fn scroll(&self) -> Vec2 {
        let axes = self.config.axes;
        Vec2::new(
            if axes.horizontal() { self.x.current } else { 0.0 },
            if axes.vertical() { self.y.current } else { 0.0 },
        )
    }

    /// Scroll target. Locked axes read 0.
    pub fn target(&self) -> Vec2 {
        let axes = self.config.axes;
        Vec2::new(
            if axes.horizontal() { self.x.target } else { 0.0 },
            if axes.vertical() { self.y.target } else { 0.0 },
        )
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Horizontal wrap period in scene units, when wrapping is active.
    #[inline]
    pub fn wrap_period(&self) -> Option<f32> {
        self.wrap_period
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.config.smoothing = smoothing;
        self.x.set_smoothing(smoothing);
        self.y.set_smoothing(smoothing);
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Pointer down at `point` (logical px): remembers where the drag started
    /// and the scroll value at that moment.
    pub fn on_input_start(&mut self, point: Vec2) {
        self.drag = Some(DragSession::new(point, self.scroll()));
    }

    /// Pointer moved to `point`. Ignored unless a drag is active.
    pub fn on_input_move(&mut self, point: Vec2) {
        let Some(drag) = self.drag else { return };
        self.set_target(drag.target_for(point));
    }

    /// Pointer released. The target stays where the drag left it.
    pub fn on_input_end(&mut self) {
        self.drag = None;
    }

    /// Wheel / trackpad scroll by `delta` logical px.
    pub fn on_wheel(&mut self, delta: Vec2) {
        let target = self.target() + delta;
        self.set_target(target);
    }

    /// Sets the scroll target on every unlocked axis.
    pub fn set_target(&mut self, target: Vec2) {
        if self.config.axes.horizontal() {
            self.x.target = target.x;
        }
        if self.config.axes.vertical() {
            self.y.target = target.y;
        }
    }

    /// Moves scroll and target to `value` with no smoothing.
    pub fn jump_to(&mut self, value: Vec2) {
        if self.config.axes.horizontal() {
            self.x.jump_to(value.x);
        }
        if self.config.axes.vertical() {
            self.y.jump_to(value.y);
        }
        self.project_all();
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// One smoothing step, then every item re-projects with the new scroll.
    pub fn update(&mut self) {
        self.x.step();
        self.y.step();
        self.project_all();
    }

    /// Stores the new extents; every item re-reads its bounds from `source`
    /// and re-projects at the current scroll.
    pub fn on_resize(&mut self, ctx: ViewportContext, source: &dyn BoundsSource) {
        self.ctx = Some(ctx);
        let scroll = self.scroll();

        for item in &mut self.items {
            item.on_resize(ctx, source, scroll);
        }

        self.wrap_period = self.config.wrap.and_then(|policy| {
            policy.period(self.items.iter().filter_map(MediaItem::bounds), &ctx)
        });
        if let Some(period) = self.wrap_period {
            debug!("wrap period {period:.3} units");
        }

        self.apply_wrap(scroll);
    }

    /// Advances every fade tween by `dt` seconds.
    pub fn animate(&mut self, dt: f32) {
        for item in &mut self.items {
            item.animate(dt);
        }
    }

    /// Picks up finished decodes. Returns how many items changed state.
    pub fn poll_textures(&mut self) -> usize {
        self.items
            .iter_mut()
            .map(MediaItem::poll_texture)
            .filter(|&changed| changed)
            .count()
    }

    pub fn show(&mut self) {
        for item in &mut self.items {
            item.show();
        }
    }

    pub fn hide(&mut self) {
        for item in &mut self.items {
            item.hide();
        }
    }

    /// Records one mesh per item on layer `z`, in item order.
    pub fn draw(&self, list: &mut MeshList, z: ZIndex) {
        for item in &self.items {
            list.push(z, item.mesh_cmd());
        }
    }

    /// Detaches every item. Pending decodes are cancelled and texture
    /// references released.
    pub fn destroy(&mut self) {
        debug!("gallery destroyed ({} item(s))", self.items.len());
        self.items.clear();
        self.drag = None;
        self.wrap_period = None;
    }

    fn project_all(&mut self) {
        let scroll = self.scroll();
        for item in &mut self.items {
            item.update(scroll);
        }
        self.apply_wrap(scroll);
    }

    fn apply_wrap(&mut self, scroll: Vec2) {
        let (Some(policy), Some(period), Some(ctx)) = (self.config.wrap, self.wrap_period, self.ctx)
        else {
            return;
        };

        let half_width = ctx.sizes.width / 2.0;
        for item in &mut self.items {
            if item.bounds().is_none() {
                continue;
            }
            let (_, right) = item.horizontal_edges();
            let dx = policy.correction(right, half_width, period);
            if dx != 0.0 {
                item.shift_extra_x(dx, scroll);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrollAxes;
    use crate::fade::FadeState;
    use crate::texture::{ImageDecoder, LoadError};
    use crate::wrap::WrapPolicy;
    use atelier_engine::coords::{Rect, Sizes, Viewport};
    use atelier_engine::scene::ImageData;
    use std::path::Path;

    struct SolidDecoder;

    impl ImageDecoder for SolidDecoder {
        fn decode(&self, _path: &Path) -> Result<ImageData, LoadError> {
            Ok(ImageData::solid(2, 2, [255; 4]))
        }
    }

    /// A horizontal strip: item `i` sits at x = i * 250, 200 px wide.
    struct Strip;

    impl BoundsSource for Strip {
        fn bounds(&self, element: &MediaElement) -> Option<Rect> {
            let i: f32 = element.id.parse().ok()?;
            Some(Rect::new(i * 250.0, 100.0, 200.0, 300.0))
        }
    }

    fn ctx() -> ViewportContext {
        ViewportContext::new(Viewport::new(1000.0, 800.0), Sizes::new(10.0, 8.0))
    }

    fn elements(n: usize) -> Vec<MediaElement> {
        (0..n).map(|i| MediaElement::new(i.to_string(), format!("{i}.png"))).collect()
    }

    fn group(n: usize, config: GalleryConfig) -> GalleryGroup {
        let loader = TextureLoader::immediate(SolidDecoder);
        let mut g = GalleryGroup::new(elements(n), &loader, config.rotation_jitter(None));
        g.on_resize(ctx(), &Strip);
        g
    }

    // ── scroll ────────────────────────────────────────────────────────────

    #[test]
    fn update_steps_once_per_call() {
        let mut g = group(1, GalleryConfig::default());
        g.set_target(Vec2::new(100.0, 0.0));
        g.update();
        assert!((g.scroll().x - 10.0).abs() < 1e-5);
        g.update();
        assert!((g.scroll().x - 19.0).abs() < 1e-4);
    }

    #[test]
    fn all_items_see_the_same_scroll() {
        let mut g = group(4, GalleryConfig::default());
        g.set_target(Vec2::new(333.0, -71.0));
        for _ in 0..5 {
            g.update();
        }
        // Same scroll means the horizontal spacing is preserved exactly.
        let xs: Vec<f32> = g.items().iter().map(|m| m.transform().position.x).collect();
        for pair in xs.windows(2) {
            assert!((pair[1] - pair[0] - 2.5).abs() < 1e-5, "{xs:?}");
        }
    }

    #[test]
    fn locked_axis_ignores_input() {
        let mut g = group(1, GalleryConfig::default().axes(ScrollAxes::Horizontal));
        g.on_wheel(Vec2::new(50.0, 80.0));
        g.on_input_start(Vec2::new(0.0, 0.0));
        g.on_input_move(Vec2::new(-10.0, 400.0));
        for _ in 0..100 {
            g.update();
        }
        assert_eq!(g.scroll().y, 0.0);
        assert_eq!(g.target(), Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn wheel_accumulates_target() {
        let mut g = group(1, GalleryConfig::default());
        g.on_wheel(Vec2::new(0.0, 30.0));
        g.on_wheel(Vec2::new(5.0, 30.0));
        assert_eq!(g.target(), Vec2::new(5.0, 60.0));
        assert_eq!(g.scroll(), Vec2::ZERO);
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn drag_without_motion_keeps_target() {
        let mut g = group(2, GalleryConfig::default());
        g.set_target(Vec2::new(120.0, -30.0));
        for _ in 0..3 {
            g.update();
        }
        let before = g.target();

        g.on_input_start(Vec2::new(400.0, 300.0));
        assert!(g.is_dragging());
        g.on_input_end();

        assert!(!g.is_dragging());
        assert_eq!(g.target(), before);
    }

    #[test]
    fn drag_is_relative_to_smoothed_scroll() {
        let mut g = group(1, GalleryConfig::default().smoothing(1.0));
        g.set_target(Vec2::new(50.0, 0.0));
        g.update();

        g.on_input_start(Vec2::new(500.0, 500.0));
        g.on_input_move(Vec2::new(420.0, 530.0));
        assert_eq!(g.target(), Vec2::new(-30.0, 30.0));
        g.on_input_end();
        assert_eq!(g.target(), Vec2::new(-30.0, 30.0));
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut g = group(1, GalleryConfig::default());
        g.on_input_move(Vec2::new(999.0, 999.0));
        assert_eq!(g.target(), Vec2::ZERO);
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_twice_is_idempotent() {
        let mut g = group(3, GalleryConfig::default());
        g.set_target(Vec2::new(-80.0, 40.0));
        g.update();

        g.on_resize(ctx(), &Strip);
        let first: Vec<_> = g.items().iter().map(|m| *m.transform()).collect();
        g.on_resize(ctx(), &Strip);
        let second: Vec<_> = g.items().iter().map(|m| *m.transform()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn resize_uses_current_scroll() {
        let mut g = group(1, GalleryConfig::default().smoothing(1.0));
        g.set_target(Vec2::new(100.0, 0.0));
        g.update();
        g.on_resize(ctx(), &Strip);
        // Bounds x = 0, scroll 100 px -> +1 unit from the unscrolled -4.
        assert!((g.items()[0].transform().position.x + 3.0).abs() < 1e-5);
    }

    // ── wrap ──────────────────────────────────────────────────────────────

    fn wrapping(n: usize) -> GalleryGroup {
        group(
            n,
            GalleryConfig::default()
                .axes(ScrollAxes::Horizontal)
                .smoothing(1.0)
                .wrap(Some(WrapPolicy::new(0.0, 50.0))),
        )
    }

    #[test]
    fn period_covers_the_strip() {
        // 8 items: span 0..1950 px, + 50 gap = 2000 px = 20 units.
        let g = wrapping(8);
        assert!((g.wrap_period().unwrap() - 20.0).abs() < 1e-5);
    }

    #[test]
    fn item_leaving_left_reappears_right() {
        let mut g = wrapping(8);
        // Scroll left by 300 px: item 0 spans -300..-100 px, fully off screen.
        g.set_target(Vec2::new(-300.0, 0.0));
        g.update();

        let first = &g.items()[0];
        assert_eq!(first.extra().x, 20.0);
        let (left, _) = first.horizontal_edges();
        assert!(left > 5.0, "wrapped item should sit right of the viewport, left = {left}");

        // Scroll state is unaffected by wrapping.
        assert_eq!(g.scroll(), Vec2::new(-300.0, 0.0));
        assert_eq!(g.target(), Vec2::new(-300.0, 0.0));
    }

    #[test]
    fn item_leaving_right_reappears_left() {
        let mut g = wrapping(8);
        g.set_target(Vec2::new(300.0, 0.0));
        g.update();

        // Item 7 spans 1750..1950 px, + 300 -> far right of the 1000 px viewport.
        let last = &g.items()[7];
        assert_eq!(last.extra().x, -20.0);
        let (_, right) = last.horizontal_edges();
        assert!(right < 5.0);
    }

    #[test]
    fn visible_items_never_wrap() {
        let mut g = wrapping(8);
        g.update();
        assert!(g.items().iter().all(|m| m.extra().x == 0.0));
    }

    #[test]
    fn wrap_window_follows_the_latest_resize() {
        let mut g = wrapping(8);
        g.set_target(Vec2::new(-150.0, 0.0));
        g.update();
        // Item 0 spans -150..50 px: still partly visible.
        assert_eq!(g.items()[0].extra().x, 0.0);

        // Same page in a viewport half as wide: 500 px across 5 units, so the
        // window starts at -2.5 and item 0's right edge (-2) is inside it.
        let narrow = ViewportContext::new(Viewport::new(500.0, 800.0), Sizes::new(5.0, 8.0));
        g.on_resize(narrow, &Strip);
        assert_eq!(g.items()[0].extra().x, 0.0);

        g.set_target(Vec2::new(-260.0, 0.0));
        g.update();
        // -260..-60 px is off the narrow viewport; the period is still 2000 px.
        assert!((g.items()[0].extra().x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn wrapped_item_does_not_bounce_back() {
        let mut g = wrapping(8);
        g.set_target(Vec2::new(-300.0, 0.0));
        for _ in 0..10 {
            g.update();
        }
        assert_eq!(g.items()[0].extra().x, 20.0);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn seeded_jitter_is_reproducible_and_bounded() {
        let loader = TextureLoader::immediate(SolidDecoder);
        let config = GalleryConfig::default().seed(42);
        let a = GalleryGroup::new(elements(6), &loader, config.clone());
        let b = GalleryGroup::new(elements(6), &loader, config);

        let max = std::f32::consts::PI * 0.03;
        for (ma, mb) in a.items().iter().zip(b.items()) {
            assert_eq!(ma.transform().rotation_z, mb.transform().rotation_z);
            assert!(ma.transform().rotation_z.abs() <= max);
        }
    }

    #[test]
    fn show_hide_fan_out() {
        let mut g = group(3, GalleryConfig::default());
        g.show();
        g.animate(0.1);
        g.hide();
        assert!(g.items().iter().all(|m| m.fade_state() == FadeState::FadingOut));
        g.animate(1.0);
        assert!(g.items().iter().all(|m| m.opacity() == 0.0));
    }

    #[test]
    fn textures_arrive_through_polling() {
        let mut g = group(3, GalleryConfig::default());
        assert!(g.items().iter().all(|m| m.texture().is_none()));
        assert_eq!(g.poll_textures(), 3);
        assert_eq!(g.poll_textures(), 0);
        assert!(g.items().iter().all(|m| m.texture().is_some()));
    }

    #[test]
    fn draw_records_one_mesh_per_item() {
        let g = group(5, GalleryConfig::default());
        let mut list = MeshList::new();
        g.draw(&mut list, ZIndex(0));
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn destroy_detaches_items() {
        let mut g = group(2, GalleryConfig::default());
        g.on_input_start(Vec2::ZERO);
        g.destroy();
        assert!(g.is_empty());
        assert!(!g.is_dragging());
        g.update();
    }
}
