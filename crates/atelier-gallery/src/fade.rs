//! Opacity tween driving the media shader's `uAlpha`.
//!
//! ```text
//!            show()               advance
//!   Hidden ─────────▶ FadingIn ───────────▶ Visible
//!     ▲                │    ▲                  │
//!     │         hide() │    │ show()           │ hide()
//!     │ advance        ▼    │                  │
//!     └────────────── FadingOut ◀──────────────┘
//! ```
//!
//! A new `show`/`hide` always replaces the in-flight tween and starts from the
//! current opacity. Nothing but `advance` moves the value.

/// Interpolation curve, `t` in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    #[default]
    EaseOutQuad,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Duration and curve shared by every fade of a gallery.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeConfig {
    /// Seconds for a full 0 to 1 (or 1 to 0) tween.
    pub duration: f32,
    pub easing: Easing,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            duration: 0.5,
            easing: Easing::EaseOutQuad,
        }
    }
}

impl FadeConfig {
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FadeState {
    Hidden,
    FadingIn,
    Visible,
    FadingOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    config: FadeConfig,
    state: FadeState,
    opacity: f32,
    from: f32,
    elapsed: f32,
}

impl Fade {
    pub fn new(config: FadeConfig) -> Self {
        Self {
            config,
            state: FadeState::Hidden,
            opacity: 0.0,
            from: 0.0,
            elapsed: 0.0,
        }
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    #[inline]
    pub fn state(&self) -> FadeState {
        self.state
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        matches!(self.state, FadeState::FadingIn | FadeState::FadingOut)
    }

    pub fn config(&self) -> FadeConfig {
        self.config
    }

    /// Starts (or restarts) a tween toward 1.
    pub fn show(&mut self) {
        self.start(FadeState::FadingIn);
    }

    /// Starts (or restarts) a tween toward 0.
    pub fn hide(&mut self) {
        self.start(FadeState::FadingOut);
    }

    /// Advances the running tween by `dt` seconds. Idle states ignore it.
    pub fn advance(&mut self, dt: f32) {
        let Some(to) = self.goal() else { return };

        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }

        let duration = self.config.duration;
        let t = if duration > 0.0 { self.elapsed / duration } else { 1.0 };

        if t >= 1.0 {
            self.settle(to);
        } else {
            self.opacity = self.from + (to - self.from) * self.config.easing.apply(t);
        }
    }

    fn start(&mut self, state: FadeState) {
        self.state = state;
        self.from = self.opacity;
        self.elapsed = 0.0;

        if let Some(to) = self.goal() {
            if self.opacity == to || self.config.duration <= 0.0 {
                self.settle(to);
            }
        }
    }

    fn goal(&self) -> Option<f32> {
        match self.state {
            FadeState::FadingIn => Some(1.0),
            FadeState::FadingOut => Some(0.0),
            FadeState::Hidden | FadeState::Visible => None,
        }
    }

    fn settle(&mut self, to: f32) {
        self.opacity = to;
        self.state = if to > 0.0 { FadeState::Visible } else { FadeState::Hidden };
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(FadeConfig::default())
    }
}
