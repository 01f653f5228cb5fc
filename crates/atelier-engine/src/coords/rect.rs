use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin, +Y down).
///
/// This is the shape of an element's layout box: what a page reports as an
/// element's bounding rectangle.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn left(self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Returns a copy moved by `offset`.
    #[inline]
    pub fn translated(self, offset: Vec2) -> Self {
        Self::from_origin_size(self.origin + offset, self.size)
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[inline]
    pub fn union(self, other: Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── edges ─────────────────────────────────────────────────────────────

    #[test]
    fn edges_follow_layout_axes() {
        let rect = r(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.left(), 100.0);
        assert_eq!(rect.top(), 50.0);
        assert_eq!(rect.right(), 300.0);
        assert_eq!(rect.bottom(), 150.0);
    }

    // ── union ─────────────────────────────────────────────────────────────

    #[test]
    fn union_spans_disjoint_boxes() {
        let a = r(0.0, 0.0, 10.0, 10.0);
        let b = r(30.0, 5.0, 10.0, 20.0);
        assert_eq!(a.union(b), r(0.0, 0.0, 40.0, 25.0));
    }

    #[test]
    fn union_with_contained_is_outer() {
        let outer = r(0.0, 0.0, 100.0, 100.0);
        let inner = r(10.0, 10.0, 20.0, 20.0);
        assert_eq!(outer.union(inner), outer);
    }

    // ── translated ────────────────────────────────────────────────────────

    #[test]
    fn translated_keeps_size() {
        let moved = r(10.0, 10.0, 5.0, 5.0).translated(Vec2::new(-10.0, 2.0));
        assert_eq!(moved, r(0.0, 12.0, 5.0, 5.0));
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
