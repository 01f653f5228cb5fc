use std::fmt;
use std::sync::Arc;

/// Decoded RGBA8 bitmap (straight alpha, sRGB), row-major, no padding.
#[derive(Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Returns `None` when `pixels` does not hold exactly `width * height` RGBA texels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (width > 0 && height > 0 && pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A `width x height` image filled with one straight-alpha RGBA value.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let texels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: rgba.repeat(texels),
        }
    }

    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

// Pixel buffers are large; keep `Debug` output to the header.
impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Identity of a decoded image; the renderer caches one GPU texture per id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Shared handle to a decoded image, as carried by mesh commands.
#[derive(Debug, Clone)]
pub struct TextureRef {
    pub id: TextureId,
    pub image: Arc<ImageData>,
}

impl TextureRef {
    pub fn new(id: TextureId, image: ImageData) -> Self {
        Self {
            id,
            image: Arc::new(image),
        }
    }
}

impl PartialEq for TextureRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
