//! Atelier gallery: scroll-synchronized textured meshes over a page layout.
//!
//! Every page element becomes a [`MediaItem`] whose mesh overlays the
//! element's layout box in scene space. A [`GalleryGroup`] owns the items and
//! one smoothed scroll state, and fans resize and per-frame updates out to
//! them.
//!
//! ```rust,ignore
//! use atelier_gallery::prelude::*;
//!
//! let loader = TextureLoader::with_default_workers(FileDecoder)?;
//! let mut gallery = GalleryGroup::new(elements, &loader, GalleryConfig::default());
//!
//! // After every size change:
//! gallery.on_resize(ViewportContext::from_perspective(viewport, fov_y, 5.0), &layout);
//!
//! // Every frame:
//! gallery.poll_textures();
//! gallery.animate(time.dt);
//! gallery.update();
//! gallery.draw(&mut meshes, ZIndex(0));
//! ```
//!
//! Nothing here touches a window or a GPU; the engine's `MeshRenderer`
//! consumes the recorded `MeshList`.

pub mod config;
pub mod fade;
pub mod group;
pub mod media;
pub mod projection;
pub mod scroll;
pub mod texture;
pub mod viewport;
pub mod wrap;

pub use config::{GalleryConfig, ScrollAxes};
pub use group::GalleryGroup;
pub use media::MediaItem;

/// The types a driver needs to build and run a gallery.
pub mod prelude {
    pub use crate::config::{GalleryConfig, ScrollAxes};
    pub use crate::fade::{Easing, FadeConfig, FadeState};
    pub use crate::group::GalleryGroup;
    pub use crate::media::MediaItem;
    pub use crate::texture::{FileDecoder, ImageDecoder, LoadError, TextureLoader, TextureState};
    pub use crate::viewport::{BoundsSource, MediaElement, ViewportContext};
    pub use crate::wrap::WrapPolicy;
}
