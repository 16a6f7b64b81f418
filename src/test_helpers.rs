//! Shared test utilities for the imgfit test suite.
//!
//! Builders for small synthetic images and pixel-region assertions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let src = gradient_image(100, 50);
//! let out = image_with_padding(&RustBackend::new(), &src, Padding::new(10, 5), Color::TRANSPARENT)?;
//! assert_region_matches(&out, &src, 10, 5);
//! ```

use crate::imaging::{Color, Image};
use image::{Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Image builders
// =========================================================================

/// Opaque image where every pixel encodes its own coordinates.
pub fn gradient_image(width: u32, height: u32) -> Image {
    Image::from_rgba(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    }))
}

/// Image filled with a single color.
pub fn solid(width: u32, height: u32, color: Color) -> Image {
    Image::from_rgba(RgbaImage::from_pixel(width, height, color.into()))
}

/// Write a gradient PNG to disk for batch tests.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    gradient_image(width, height).into_rgba().save(path).unwrap();
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert every pixel of `image` equals `color`.
pub fn assert_all_pixels(image: &Image, color: Color) {
    for (x, y, px) in image.as_rgba().enumerate_pixels() {
        assert_eq!(
            Color::from(*px),
            color,
            "pixel ({x}, {y}) differs from {color}"
        );
    }
}

/// Assert `inner` is reproduced pixel-for-pixel inside `outer` at `(ox, oy)`.
pub fn assert_region_matches(outer: &Image, inner: &Image, ox: u32, oy: u32) {
    for (x, y, px) in inner.as_rgba().enumerate_pixels() {
        assert_eq!(
            outer.pixel(ox + x, oy + y),
            Some(Color::from(*px)),
            "pixel ({x}, {y}) of inner image not found at ({}, {})",
            ox + x,
            oy + y
        );
    }
}
