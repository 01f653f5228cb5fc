use atelier_engine::coords::Rect;

use crate::viewport::ViewportContext;

/// Infinite-carousel policy: an item that leaves the visible band on one side
/// is moved by whole gallery periods to the other side, via its extra offset.
/// Scroll state is never touched, and a wrapped item stays put until it
/// leaves the window again.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WrapPolicy {
    /// How far past the viewport edge (scene units) an item must be before it wraps.
    pub threshold: f32,
    /// Spacing (logical px) inserted between the last and first item.
    pub gap: f32,
}

impl WrapPolicy {
    #[inline]
    pub const fn new(threshold: f32, gap: f32) -> Self {
        Self { threshold, gap }
    }

    /// Horizontal period in scene units: the span of all bounds plus `gap`.
    ///
    /// `None` when there are no bounds or the span is not positive.
    pub fn period<I>(&self, bounds: I, ctx: &ViewportContext) -> Option<f32>
    where
        I: IntoIterator<Item = Rect>,
    {
        if !ctx.is_valid() {
            return None;
        }

        let span = bounds.into_iter().reduce(Rect::union)?;
        let period = (span.size.x + self.gap) * ctx.units_per_px_x();
        (period > 0.0 && period.is_finite()).then_some(period)
    }

    /// Change to apply to an item's `extra.x` given the right edge of its
    /// projection (scene units).
    ///
    /// Right edges are kept in the window `[-limit, -limit + period)` where
    /// `limit = half_width + threshold`: an item leaving the left side by more
    /// than `threshold` moves right by whole periods, one past the far end of
    /// the window moves left. When `period` exceeds the viewport width plus
    /// twice the threshold plus the item width, the far end lies beyond the
    /// right threshold too.
    pub fn correction(&self, right: f32, half_width: f32, period: f32) -> f32 {
        let start = -(half_width + self.threshold);
        let periods = ((right - start) / period).floor();
        if periods == 0.0 || !periods.is_finite() {
            0.0
        } else {
            -periods * period
        }
    }
}

impl Default for WrapPolicy {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_engine::coords::{Sizes, Viewport};

    fn ctx() -> ViewportContext {
        ViewportContext::new(Viewport::new(1000.0, 800.0), Sizes::new(10.0, 8.0))
    }

    #[test]
    fn period_spans_all_bounds_plus_gap() {
        let policy = WrapPolicy::new(0.0, 100.0);
        let bounds = [Rect::new(0.0, 0.0, 300.0, 100.0), Rect::new(1700.0, 0.0, 200.0, 100.0)];
        // (1900 - 0 + 100) px of 1000 px -> 2 viewports -> 20 units.
        let period = policy.period(bounds, &ctx()).unwrap();
        assert!((period - 20.0).abs() < 1e-5);
    }

    #[test]
    fn period_ignores_vertical_spread_and_order() {
        let policy = WrapPolicy::new(0.0, 0.0);
        let bounds = [
            Rect::new(600.0, 900.0, 400.0, 50.0),
            Rect::new(-200.0, -300.0, 100.0, 50.0),
            Rect::new(100.0, 0.0, 100.0, 50.0),
        ];
        // -200..1000 px -> 12 units.
        let period = policy.period(bounds, &ctx()).unwrap();
        assert!((period - 12.0).abs() < 1e-5);
    }

    #[test]
    fn no_bounds_no_period() {
        assert_eq!(WrapPolicy::default().period(Vec::<Rect>::new(), &ctx()), None);
    }

    #[test]
    fn off_left_moves_right() {
        let policy = WrapPolicy::new(1.0, 0.0);
        assert_eq!(policy.correction(-7.0, 5.0, 20.0), 20.0);
    }

    #[test]
    fn past_far_end_moves_left() {
        let policy = WrapPolicy::new(1.0, 0.0);
        // Window is [-6, 14).
        assert_eq!(policy.correction(16.0, 5.0, 20.0), -20.0);
        assert_eq!(policy.correction(13.9, 5.0, 20.0), 0.0);
    }

    #[test]
    fn threshold_delays_wrap() {
        let policy = WrapPolicy::new(1.0, 0.0);
        // Right edge at -5.5: past the viewport edge but inside the threshold.
        assert_eq!(policy.correction(-5.5, 5.0, 20.0), 0.0);
    }

    #[test]
    fn far_items_jump_whole_periods() {
        let policy = WrapPolicy::new(0.0, 0.0);
        assert_eq!(policy.correction(-45.0, 5.0, 20.0), 40.0);
    }

    #[test]
    fn wrapped_item_is_stable() {
        let policy = WrapPolicy::new(0.0, 0.0);
        let right = -6.0 + policy.correction(-6.0, 5.0, 20.0);
        assert_eq!(policy.correction(right, 5.0, 20.0), 0.0);
    }
}
