//! Atelier engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the gallery layer:
//! window/event loop, input translation, frame timing, and the textured mesh renderer.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
