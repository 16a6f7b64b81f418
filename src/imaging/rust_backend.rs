//! Pure Rust rasterization backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Surface call | Crate / function |
//! |---|---|
//! | Allocate | `image::RgbaImage::new` behind a pixel-count limit |
//! | Fill rect | direct pixel writes, clipped |
//! | Draw image | `imageops::crop_imm` to the visible source window, `imageops::resize` (configurable [`Filter`]), source-over composite |
//! | Read back | the surface buffer itself, moved into an [`Image`] |

use super::backend::{BackendError, Dimensions, Image, RasterBackend, Surface};
use super::params::{Color, Filter, Rect};
use image::{Pixel, Rgba, RgbaImage, imageops};
use std::ops::Range;

/// Largest surface the backend will allocate by default (16384 × 16384).
pub const DEFAULT_MAX_PIXELS: u64 = 16384 * 16384;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RustBackend {
    filter: Filter,
    max_pixels: u64,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            filter: Filter::default(),
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    pub fn with_filter(self, filter: Filter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_max_pixels(self, max_pixels: u64) -> Self {
        Self { max_pixels, ..self }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject sizes that are empty, over the limit, or too large to address.
fn check_allocation(size: Dimensions, max_pixels: u64) -> Result<(), BackendError> {
    let fits_address_space = size
        .pixel_count()
        .checked_mul(4)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .is_some();

    if size.is_empty() || size.pixel_count() > max_pixels || !fits_address_space {
        return Err(BackendError::AllocationFailed {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

/// Intersect `rect` with a `bounds`-sized surface at the origin.
///
/// Returns `(x0, y0, x1, y1)` in surface coordinates, end-exclusive, or
/// `None` when nothing is visible.
fn clip(rect: Rect, bounds: Dimensions) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = (rect.x + rect.width as i64).min(bounds.width as i64);
    let y1 = (rect.y + rect.height as i64).min(bounds.height as i64);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// One axis of the source window behind a visible run of a stretched draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceSpan {
    /// First source pixel of the window.
    start: u32,
    /// Source pixels in the window.
    len: u32,
    /// The window's length once stretched.
    scaled: u32,
    /// Where the visible run begins inside the stretched window.
    offset: u32,
}

impl SourceSpan {
    /// Smallest source window covering `visible`, a range of a `src`-long
    /// axis stretched to `dst` pixels.
    fn covering(visible: Range<u32>, src: u32, dst: u32) -> Self {
        let (v0, v1) = (visible.start as u128, visible.end as u128);
        let (src, dst) = (src as u128, dst as u128);

        let start = v0 * src / dst;
        let end = (v1 * src).div_ceil(dst).clamp(start + 1, src);
        let len = end - start;
        // Round half up, in the stretched axis.
        let stretch = |n: u128| (n * dst * 2 + src) / (2 * src);
        let scaled = stretch(len).max(1);
        let offset = v0.saturating_sub(stretch(start));

        Self {
            start: start as u32,
            len: len as u32,
            scaled: scaled.min(u32::MAX as u128) as u32,
            offset: offset.min(u32::MAX as u128) as u32,
        }
    }
}

/// Source-over composite of one straight-alpha pixel.
///
/// Over a fully transparent destination the source is copied verbatim, so
/// drawing onto a fresh surface reproduces the source exactly.
fn composite(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    match (dst.0[3], src.0[3]) {
        (_, 0) => {}
        (0, _) | (_, 255) => *dst = *src,
        _ => dst.blend(src),
    }
}

/// Offscreen RGBA8 surface produced by [`RustBackend`].
pub struct RustSurface {
    canvas: RgbaImage,
    filter: Filter,
    max_pixels: u64,
}

impl RasterBackend for RustBackend {
    type Surface = RustSurface;

    fn create_surface(&self, size: Dimensions) -> Result<RustSurface, BackendError> {
        check_allocation(size, self.max_pixels)?;
        Ok(RustSurface {
            canvas: RgbaImage::new(size.width, size.height),
            filter: self.filter,
            max_pixels: self.max_pixels,
        })
    }
}

impl Surface for RustSurface {
    fn size(&self) -> Dimensions {
        Dimensions::new(self.canvas.width(), self.canvas.height())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = clip(rect, self.size()) else {
            return;
        };
        let px: Rgba<u8> = color.into();
        for y in y0..y1 {
            for x in x0..x1 {
                self.canvas.put_pixel(x, y, px);
            }
        }
    }

    fn draw_image(&mut self, image: &Image, rect: Rect) -> Result<(), BackendError> {
        if image.dimensions().is_empty() {
            return Ok(());
        }
        let Some((x0, y0, x1, y1)) = clip(rect, self.size()) else {
            return Ok(());
        };

        if rect.size() == image.dimensions() {
            let source = image.as_rgba();
            for y in y0..y1 {
                let sy = (y as i64 - rect.y) as u32;
                for x in x0..x1 {
                    let sx = (x as i64 - rect.x) as u32;
                    composite(self.canvas.get_pixel_mut(x, y), source.get_pixel(sx, sy));
                }
            }
            return Ok(());
        }

        // Resample only the source window that lands on the surface.
        let vx = (x0 as i64 - rect.x) as u32..(x1 as i64 - rect.x) as u32;
        let vy = (y0 as i64 - rect.y) as u32..(y1 as i64 - rect.y) as u32;
        let span_x = SourceSpan::covering(vx, image.width(), rect.width);
        let span_y = SourceSpan::covering(vy, image.height(), rect.height);
        check_allocation(Dimensions::new(span_x.scaled, span_y.scaled), self.max_pixels)?;

        let window =
            imageops::crop_imm(image.as_rgba(), span_x.start, span_y.start, span_x.len, span_y.len)
                .to_image();
        let resampled = imageops::resize(&window, span_x.scaled, span_y.scaled, self.filter.into());

        for y in y0..y1 {
            let sy = (span_y.offset + (y - y0)).min(span_y.scaled - 1);
            for x in x0..x1 {
                let sx = (span_x.offset + (x - x0)).min(span_x.scaled - 1);
                composite(self.canvas.get_pixel_mut(x, y), resampled.get_pixel(sx, sy));
            }
        }
        Ok(())
    }

    fn finish(self) -> Image {
        Image::from_rgba(self.canvas)
    }
}
