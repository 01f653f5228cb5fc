use crate::coords::Vec2;

use super::TextureRef;

/// Scene-space transform of a unit quad.
///
/// Applied as scale, then rotation about Z, then translation. The quad spans
/// `[-0.5, 0.5]` on both axes, so `scale` is the on-screen size in world units
/// and `position` is its center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshTransform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation_z: f32,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotation_z: 0.0,
        }
    }
}

/// One textured mesh to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCmd {
    pub transform: MeshTransform,
    /// Opacity multiplier (`uAlpha`), 0 = fully transparent.
    pub alpha: f32,
    /// Color input (`tMap`). `None` draws with the renderer's unbound placeholder.
    pub texture: Option<TextureRef>,
}
