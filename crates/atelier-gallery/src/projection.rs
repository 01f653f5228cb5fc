//! Layout-space to scene-space mapping.
//!
//! Layout space is Y-down with the origin at the document's top-left corner;
//! scene space is Y-up with the origin at the viewport center. For an element
//! with bounds `b`, scroll `s` and extra offset `e`:
//!
//! ```text
//! scale.x    = sizes.w * b.w / viewport.w
//! scale.y    = sizes.h * b.h / viewport.h
//! n          = (b.origin + s) / viewport
//! position.x = -sizes.w / 2 + scale.x / 2 + n.x * sizes.w + e.x
//! position.y = +sizes.h / 2 - scale.y / 2 - n.y * sizes.h + e.y
//! ```
//!
//! The minus in `position.y` is the Y-down to Y-up flip.

use atelier_engine::coords::{Rect, Vec2};

use crate::viewport::ViewportContext;

/// Scene-space placement of one element.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Projection {
    /// Center of the mesh.
    pub position: Vec2,
    /// Size of the mesh (unit quad scale).
    pub scale: Vec2,
}

/// Scale of a mesh covering `bounds`: the element's fraction of the viewport,
/// applied to the scene extent.
#[inline]
pub fn project_scale(bounds: Rect, ctx: &ViewportContext) -> Vec2 {
    Vec2::new(
        ctx.sizes.width * (bounds.size.x / ctx.viewport.width),
        ctx.sizes.height * (bounds.size.y / ctx.viewport.height),
    )
}

/// Projects `bounds` at scroll offset `scroll`, shifted by `extra` scene units.
///
/// Returns `None` for a degenerate context (zero or non-finite extents); the
/// caller keeps its previous transform.
pub fn project(bounds: Rect, ctx: &ViewportContext, scroll: Vec2, extra: Vec2) -> Option<Projection> {
    if !ctx.is_valid() {
        return None;
    }

    let scale = project_scale(bounds, ctx);

    let nx = (bounds.origin.x + scroll.x) / ctx.viewport.width;
    let ny = (bounds.origin.y + scroll.y) / ctx.viewport.height;

    let position = Vec2::new(
        -ctx.sizes.width / 2.0 + scale.x / 2.0 + nx * ctx.sizes.width + extra.x,
        ctx.sizes.height / 2.0 - scale.y / 2.0 - ny * ctx.sizes.height + extra.y,
    );

    Some(Projection { position, scale })
}

impl Projection {
    #[inline]
    pub fn left(&self) -> f32 {
        self.position.x - self.scale.x / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.position.x + self.scale.x / 2.0
    }
}
