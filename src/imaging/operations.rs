//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Each one
//! computes the output size, asks the backend for a surface of that size,
//! draws into it and reads it back. The surface is dropped on every path, so
//! a failing draw never leaks it.
//!
//! All functions take the backend explicitly. The [`Image`] shorthands at
//! the bottom of this module run the same operations on a default
//! [`RustBackend`].

use super::backend::{BackendError, Dimensions, Image, RasterBackend, Surface};
use super::calculations::{
    FillPlan, calculate_fill_plan, calculate_longest_edge_dimensions, calculate_padded_dimensions,
    calculate_scaled_dimensions,
};
use super::params::{Color, Padding, Rect, Scale};
use super::rust_backend::RustBackend;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A 1×1 image of `color`.
pub fn image_with_color(backend: &impl RasterBackend, color: Color) -> Result<Image> {
    solid_image(backend, color, Dimensions::new(1, 1))
}

/// An image of `size` where every pixel is `color`.
pub fn solid_image(backend: &impl RasterBackend, color: Color, size: Dimensions) -> Result<Image> {
    let mut surface = backend.create_surface(size)?;
    surface.fill_rect(Rect::covering(size), color);
    Ok(surface.finish())
}

/// Surround `original` with a border of `padding` pixels filled with `fill`.
///
/// The original is drawn unscaled at `(padding.horizontal, padding.vertical)`.
/// With a transparent fill the original's pixels come through unchanged.
pub fn image_with_padding(
    backend: &impl RasterBackend,
    original: &Image,
    padding: Padding,
    fill: Color,
) -> Result<Image> {
    let size = calculate_padded_dimensions(original.dimensions(), padding);
    let mut surface = backend.create_surface(size)?;

    // Fresh surfaces are already transparent.
    if fill != Color::TRANSPARENT {
        surface.fill_rect(Rect::covering(size), fill);
    }

    let dest = Rect::new(
        padding.horizontal as i64,
        padding.vertical as i64,
        original.dimensions(),
    );
    surface.draw_image(original, dest)?;
    Ok(surface.finish())
}

/// Draw `image` stretched over a whole new surface of `size`.
fn redraw(backend: &impl RasterBackend, image: &Image, size: Dimensions) -> Result<Image> {
    let mut surface = backend.create_surface(size)?;
    surface.draw_image(image, Rect::covering(size))?;
    Ok(surface.finish())
}

/// Uniform resize: output is `(round(w * scale), round(h * scale))`.
pub fn resize_by_scale(backend: &impl RasterBackend, image: &Image, scale: Scale) -> Result<Image> {
    let size = calculate_scaled_dimensions(image.dimensions(), scale.value());
    redraw(backend, image, size)
}

/// Uniform resize so the longer side is exactly `edge` pixels.
pub fn resize_to_longest_edge(
    backend: &impl RasterBackend,
    image: &Image,
    edge: u32,
) -> Result<Image> {
    let size = calculate_longest_edge_dimensions(image.dimensions(), edge);
    redraw(backend, image, size)
}

/// Aspect-fill resize to exactly `target`, center-cropping the overflow.
///
/// See [`calculate_fill_plan`](super::calculate_fill_plan) for the crop
/// rounding rule. An empty source fails with
/// [`BackendError::AllocationFailed`].
pub fn resize_to_fill(
    backend: &impl RasterBackend,
    image: &Image,
    target: Dimensions,
) -> Result<Image> {
    // Nothing to scale up, so the target could never be covered.
    if image.dimensions().is_empty() {
        return Err(BackendError::AllocationFailed {
            width: image.width(),
            height: image.height(),
        });
    }

    let FillPlan {
        scaled,
        crop_x,
        crop_y,
        ..
    } = calculate_fill_plan(image.dimensions(), target);

    let mut surface = backend.create_surface(target)?;
    surface.draw_image(image, Rect::new(-(crop_x as i64), -(crop_y as i64), scaled))?;
    Ok(surface.finish())
}

// =============================================================================
// Default-backend shorthands
// =============================================================================

impl Image {
    /// 1×1 image of `color` on the default backend.
    pub fn with_color(color: Color) -> Result<Image> {
        image_with_color(&RustBackend::default(), color)
    }

    /// See [`image_with_padding`].
    pub fn padded(&self, padding: Padding, fill: Color) -> Result<Image> {
        image_with_padding(&RustBackend::default(), self, padding, fill)
    }

    /// See [`resize_by_scale`]. Rejects non-finite or non-positive factors.
    pub fn scaled(&self, factor: f64) -> Result<Image> {
        resize_by_scale(&RustBackend::default(), self, Scale::new(factor)?)
    }

    /// See [`resize_to_longest_edge`].
    pub fn fit_longest_edge(&self, edge: u32) -> Result<Image> {
        resize_to_longest_edge(&RustBackend::default(), self, edge)
    }

    /// See [`resize_to_fill`].
    pub fn fill_to(&self, target: Dimensions) -> Result<Image> {
        resize_to_fill(&RustBackend::default(), self, target)
    }
}
