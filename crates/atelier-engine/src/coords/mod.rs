//! Coordinate and geometry types shared across the renderer and the gallery.
//!
//! Two spaces are in play:
//! - Layout space: logical pixels, origin top-left, +X right, +Y down.
//!   `Rect`, `Vec2` and `Viewport` live here.
//! - Scene space: abstract world units, origin center, +Y up.
//!   `Sizes` gives the visible extent of the scene at the mesh plane.
//!
//! The mesh renderer converts scene space to NDC using a `Sizes` uniform.

mod rect;
mod sizes;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use sizes::Sizes;
pub use vec2::Vec2;
pub use viewport::Viewport;
