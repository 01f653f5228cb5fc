use atelier_engine::coords::{Rect, Sizes, Viewport};

/// The two extents every projection needs: the layout viewport (logical px)
/// and the visible scene extent (world units).
///
/// Passed explicitly on every resize; nothing in the gallery reads global
/// window state.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewportContext {
    pub viewport: Viewport,
    pub sizes: Sizes,
}

impl ViewportContext {
    #[inline]
    pub const fn new(viewport: Viewport, sizes: Sizes) -> Self {
        Self { viewport, sizes }
    }

    /// Derives `sizes` from a perspective camera: vertical field of view `fov_y`
    /// (radians) looking at the mesh plane `distance` units away.
    pub fn from_perspective(viewport: Viewport, fov_y: f32, distance: f32) -> Self {
        Self {
            viewport,
            sizes: Sizes::from_perspective(fov_y, distance, viewport.aspect()),
        }
    }

    /// Both extents are positive and finite.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.viewport.is_valid() && self.sizes.is_valid()
    }

    /// Scene units per logical pixel along X.
    #[inline]
    pub fn units_per_px_x(&self) -> f32 {
        self.sizes.width / self.viewport.width
    }
}

/// A page element that becomes one gallery item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaElement {
    pub id: String,
    /// Deferred image source (`data-src`). `None` is a configuration error:
    /// the item is still placed but never gets a texture.
    pub data_src: Option<String>,
}

impl MediaElement {
    pub fn new(id: impl Into<String>, data_src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_src: Some(data_src.into()),
        }
    }

    pub fn without_source(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_src: None,
        }
    }
}

/// Supplies the current layout box of an element.
///
/// Queried once per resize per item. `None` means the element is not laid out;
/// the item then keeps no bounds and its per-frame update is a no-op.
pub trait BoundsSource {
    fn bounds(&self, element: &MediaElement) -> Option<Rect>;
}

impl<F> BoundsSource for F
where
    F: Fn(&MediaElement) -> Option<Rect>,
{
    fn bounds(&self, element: &MediaElement) -> Option<Rect> {
        self(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perspective_sizes_follow_viewport_aspect() {
        let ctx = ViewportContext::from_perspective(
            Viewport::new(1600.0, 800.0),
            std::f32::consts::FRAC_PI_2,
            5.0,
        );
        // tan(45deg) = 1 -> height = 2 * 5
        assert!((ctx.sizes.height - 10.0).abs() < 1e-5);
        assert!((ctx.sizes.width - 20.0).abs() < 1e-5);
        assert!(ctx.is_valid());
    }

    #[test]
    fn zero_viewport_is_invalid() {
        let ctx = ViewportContext::new(Viewport::new(0.0, 800.0), Sizes::new(10.0, 8.0));
        assert!(!ctx.is_valid());
    }

    #[test]
    fn closures_are_bounds_sources() {
        let source = |e: &MediaElement| (e.id == "a").then(|| Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            source.bounds(&MediaElement::new("a", "a.png")),
            Some(Rect::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(source.bounds(&MediaElement::without_source("b")), None);
    }
}
