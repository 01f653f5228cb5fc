use crate::fade::FadeConfig;
use crate::scroll::ScrollAxis;
use crate::wrap::WrapPolicy;

/// Which scroll dimensions respond to input.
///
/// A locked axis always publishes 0 to the items.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ScrollAxes {
    #[default]
    Both,
    Horizontal,
    Vertical,
}

impl ScrollAxes {
    #[inline]
    pub fn horizontal(self) -> bool {
        matches!(self, ScrollAxes::Both | ScrollAxes::Horizontal)
    }

    #[inline]
    pub fn vertical(self) -> bool {
        matches!(self, ScrollAxes::Both | ScrollAxes::Vertical)
    }
}

/// Everything that distinguishes one gallery page from another.
///
/// ```rust,ignore
/// let config = GalleryConfig::default()
///     .axes(ScrollAxes::Horizontal)
///     .rotation_jitter(None)
///     .wrap(Some(WrapPolicy::new(0.5, 24.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Per-frame scroll smoothing factor in `(0, 1]`.
    pub smoothing: f32,
    pub axes: ScrollAxes,
    /// Max |rotation| in radians; each item draws a fixed angle in
    /// `[-jitter, jitter]` at creation.
    pub rotation_jitter: Option<f32>,
    /// Seed for the jitter RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub fade: FadeConfig,
    pub wrap: Option<WrapPolicy>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            smoothing: ScrollAxis::DEFAULT_SMOOTHING,
            axes: ScrollAxes::Both,
            rotation_jitter: Some(std::f32::consts::PI * 0.03),
            seed: None,
            fade: FadeConfig::default(),
            wrap: None,
        }
    }
}

impl GalleryConfig {
    pub fn smoothing(mut self, v: f32) -> Self {
        self.smoothing = v;
        self
    }

    pub fn axes(mut self, v: ScrollAxes) -> Self {
        self.axes = v;
        self
    }

    pub fn rotation_jitter(mut self, v: Option<f32>) -> Self {
        self.rotation_jitter = v;
        self
    }

    pub fn seed(mut self, v: u64) -> Self {
        self.seed = Some(v);
        self
    }

    pub fn fade(mut self, v: FadeConfig) -> Self {
        self.fade = v;
        self
    }

    pub fn wrap(mut self, v: Option<WrapPolicy>) -> Self {
        self.wrap = v;
        self
    }
}
