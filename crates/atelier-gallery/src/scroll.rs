use atelier_engine::coords::Vec2;

/// One smoothed scroll dimension.
///
/// `target` moves instantly on input; `current` chases it once per frame via
/// `current += (target - current) * smoothing`. The step never overshoots, and
/// `smoothing >= 1` snaps straight to `target`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollAxis {
    pub current: f32,
    pub target: f32,
    smoothing: f32,
}

impl ScrollAxis {
    pub const DEFAULT_SMOOTHING: f32 = 0.1;

    pub fn new(smoothing: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            smoothing: sanitize_smoothing(smoothing),
        }
    }

    #[inline]
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = sanitize_smoothing(smoothing);
    }

    /// Advances `current` one frame toward `target`.
    pub fn step(&mut self) {
        let delta = self.target - self.current;
        let next = self.current + delta * self.smoothing;

        // Rounding can push `next` past `target` when `smoothing` is near 1.
        self.current = if delta >= 0.0 {
            next.min(self.target)
        } else {
            next.max(self.target)
        };
    }

    /// Puts both values at `value` with no smoothing.
    pub fn jump_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

impl Default for ScrollAxis {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SMOOTHING)
    }
}

// Anything outside (0, 1] (or NaN) is clamped into range; 0 would freeze the axis.
fn sanitize_smoothing(s: f32) -> f32 {
    if s.is_nan() {
        ScrollAxis::DEFAULT_SMOOTHING
    } else {
        s.clamp(f32::EPSILON, 1.0)
    }
}

/// Snapshot taken when a drag starts.
///
/// While the session is alive, a pointer at `point` maps to the scroll target
/// `origin - (start - point)`, independent of per-frame smoothing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DragSession {
    /// Pointer position at drag start (logical px).
    pub start: Vec2,
    /// Smoothed scroll value at drag start.
    pub origin: Vec2,
}

impl DragSession {
    #[inline]
    pub fn new(start: Vec2, origin: Vec2) -> Self {
        Self { start, origin }
    }

    /// Scroll target for the pointer at `point`.
    #[inline]
    pub fn target_for(&self, point: Vec2) -> Vec2 {
        self.origin - (self.start - point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── smoothing ─────────────────────────────────────────────────────────

    #[test]
    fn converges_by_closed_form() {
        let mut axis = ScrollAxis::new(0.1);
        axis.target = 100.0;
        for n in 1..=60 {
            axis.step();
            let expected = 100.0 * (1.0 - 0.9f64.powi(n));
            assert!(
                (axis.current as f64 - expected).abs() < 1e-2,
                "step {n}: {} vs {expected}",
                axis.current
            );
        }
        assert!(axis.current > 99.8);
    }

    #[test]
    fn never_overshoots() {
        for &s in &[0.01, 0.1, 0.5, 0.9, 0.999, 1.0] {
            for &target in &[100.0, -37.5, 1e6] {
                let mut axis = ScrollAxis::new(s);
                axis.target = target;
                for _ in 0..500 {
                    axis.step();
                    if target > 0.0 {
                        assert!(axis.current <= target, "s={s} t={target} c={}", axis.current);
                    } else {
                        assert!(axis.current >= target, "s={s} t={target} c={}", axis.current);
                    }
                }
            }
        }
    }

    #[test]
    fn full_smoothing_snaps() {
        let mut axis = ScrollAxis::new(1.0);
        axis.target = 42.0;
        axis.step();
        assert_eq!(axis.current, 42.0);
        assert!(axis.is_settled());
    }

    #[test]
    fn out_of_range_smoothing_is_clamped() {
        assert_eq!(ScrollAxis::new(5.0).smoothing(), 1.0);
        assert!(ScrollAxis::new(0.0).smoothing() > 0.0);
        assert!(ScrollAxis::new(-1.0).smoothing() > 0.0);
        assert_eq!(ScrollAxis::new(f32::NAN).smoothing(), ScrollAxis::DEFAULT_SMOOTHING);
    }

    #[test]
    fn jump_settles_immediately() {
        let mut axis = ScrollAxis::default();
        axis.jump_to(-12.0);
        assert_eq!(axis.current, -12.0);
        assert!(axis.is_settled());
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn drag_follows_pointer_from_origin() {
        let drag = DragSession::new(Vec2::new(500.0, 300.0), Vec2::new(-40.0, 10.0));
        assert_eq!(drag.target_for(Vec2::new(500.0, 300.0)), Vec2::new(-40.0, 10.0));
        // Dragging left by 100 px scrolls the content left.
        assert_eq!(drag.target_for(Vec2::new(400.0, 300.0)), Vec2::new(-140.0, 10.0));
        assert_eq!(drag.target_for(Vec2::new(500.0, 350.0)), Vec2::new(-40.0, 60.0));
    }
}
