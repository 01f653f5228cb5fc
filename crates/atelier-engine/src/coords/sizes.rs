/// Visible scene extent at the mesh plane, in world units.
///
/// Derived from the camera frustum rather than from pixel counts. A mesh whose
/// scale equals `Sizes` covers the whole viewport.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Sizes {
    pub width: f32,
    pub height: f32,
}

impl Sizes {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Frustum extent of a perspective camera looking down -Z at a plane
    /// `distance` units away.
    ///
    /// `fov_y` is the vertical field of view in radians; `aspect` is width / height.
    pub fn from_perspective(fov_y: f32, distance: f32, aspect: f32) -> Self {
        let height = 2.0 * (fov_y * 0.5).tan() * distance;
        Self {
            width: height * aspect,
            height,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}
