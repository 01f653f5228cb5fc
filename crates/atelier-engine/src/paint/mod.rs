//! Color model shared between the driver and the renderer.
//!
//! Colors are linear premultiplied RGBA. Images are sampled from sRGB textures,
//! so the GPU performs the decode and the shader only multiplies by alpha.

pub mod color;

pub use color::Color;
