//! Rasterization backend traits and shared types.
//!
//! A [`RasterBackend`] hands out offscreen [`Surface`]s. Every façade
//! operation follows the same shape: create a surface of the output size,
//! fill and draw into it, then [`Surface::finish`] it into an [`Image`].
//! Dropping a surface releases it, so a surface acquired inside an operation
//! is released on every exit path, `?` early returns included.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` in this module.

use super::params::{Color, Rect};
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot allocate a {width}x{height} surface")]
    AllocationFailed { width: u32, height: u32 },
    #[error("Scale factor must be finite and greater than zero, got {0}")]
    InvalidScale(f64),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Pixel dimensions of an image or surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longest_edge(self) -> u32 {
        self.width.max(self.height)
    }

    /// True when either side is zero. Such a surface cannot be allocated.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An immutable RGBA8 raster.
///
/// Every operation returns a freshly allocated `Image`; nothing holds on to
/// an input image after the call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pixels: RgbaImage,
}

impl Image {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn from_dynamic(img: DynamicImage) -> Self {
        Self {
            pixels: img.into_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    /// Color at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixels.get_pixel_checked(x, y).map(|&px| Color::from(px))
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }
}

impl From<RgbaImage> for Image {
    fn from(pixels: RgbaImage) -> Self {
        Self::from_rgba(pixels)
    }
}

impl From<DynamicImage> for Image {
    fn from(img: DynamicImage) -> Self {
        Self::from_dynamic(img)
    }
}

/// Offscreen drawing surface. Released when dropped.
pub trait Surface {
    fn size(&self) -> Dimensions;

    /// Replace every pixel inside `rect` (clipped to the surface) with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw `image` scaled to `rect`, compositing source-over, clipped to the surface.
    fn draw_image(&mut self, image: &Image, rect: Rect) -> Result<(), BackendError>;

    /// Read the surface back as an image, consuming it.
    fn finish(self) -> Image;
}

/// Source of offscreen surfaces.
///
/// Backends hold only immutable settings, so one backend can be shared
/// across threads while each call works on its own surface.
pub trait RasterBackend: Sync {
    type Surface: Surface;

    /// Allocate a transparent surface. Fails with
    /// [`BackendError::AllocationFailed`] for empty or oversized dimensions.
    fn create_surface(&self, size: Dimensions) -> Result<Self::Surface, BackendError>;
}
