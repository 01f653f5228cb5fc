//! GPU rendering subsystem.
//!
//! `MeshRenderer` consumes a `scene::MeshList` and issues wgpu commands.
//! It owns its GPU resources (pipeline, shared quad geometry, texture cache).
//!
//! Convention:
//! - mesh transforms are in scene space (center origin, +Y up, world units)
//! - the vertex shader maps scene space to NDC using the `Sizes` uniform

mod ctx;
mod geometry;
mod mesh;
mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use geometry::QuadGeometry;
pub use mesh::MeshRenderer;
pub use texture::{GpuTexture, TextureCache};
