//! Scene (mesh stream) types.
//!
//! Responsibilities:
//! - describe textured meshes in scene space (transform + opacity + texture)
//! - provide deterministic paint ordering (z-index + insertion order)
//!
//! The scene is rebuilt every frame by the gallery and consumed by
//! `render::MeshRenderer`; it owns no GPU resources.

mod image;
mod list;
mod mesh;
mod order;

pub use image::{ImageData, TextureId, TextureRef};
pub use list::{MeshItem, MeshList};
pub use mesh::{MeshCmd, MeshTransform};
pub use order::{SortKey, ZIndex};
