//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any pixels or backend.
//! Results may contain a zero side; the backend turns that into an
//! allocation failure when a surface of that size is requested.

use super::backend::Dimensions;
use super::params::Padding;

/// Output size of a padding operation: `(w + 2h, h + 2v)`.
///
/// Saturates instead of overflowing so absurd padding fails at allocation.
///
/// # Examples
/// ```
/// # use imgfit::imaging::{Dimensions, Padding, calculate_padded_dimensions};
/// let out = calculate_padded_dimensions(Dimensions::new(100, 50), Padding::new(10, 5));
/// assert_eq!(out, Dimensions::new(120, 60));
/// ```
pub fn calculate_padded_dimensions(source: Dimensions, padding: Padding) -> Dimensions {
    Dimensions {
        width: source
            .width
            .saturating_add(padding.horizontal.saturating_mul(2)),
        height: source
            .height
            .saturating_add(padding.vertical.saturating_mul(2)),
    }
}

/// Round `side * scale` to the nearest pixel.
fn scale_side(side: u32, scale: f64) -> u32 {
    // `as` saturates: NaN → 0, overflow → u32::MAX.
    (side as f64 * scale).round() as u32
}

/// Uniformly scaled size: `(round(w * s), round(h * s))`.
///
/// # Examples
/// ```
/// # use imgfit::imaging::{Dimensions, calculate_scaled_dimensions};
/// assert_eq!(
///     calculate_scaled_dimensions(Dimensions::new(200, 100), 0.5),
///     Dimensions::new(100, 50)
/// );
/// ```
pub fn calculate_scaled_dimensions(source: Dimensions, scale: f64) -> Dimensions {
    Dimensions {
        width: scale_side(source.width, scale),
        height: scale_side(source.height, scale),
    }
}

/// Size whose longer side is exactly `edge`, preserving aspect ratio.
///
/// The shorter side is `round(short * edge / long)`. Square sources use
/// `edge` for both sides.
pub fn calculate_longest_edge_dimensions(source: Dimensions, edge: u32) -> Dimensions {
    let longest = source.longest_edge();
    if longest == 0 {
        return Dimensions::new(0, 0);
    }
    let scale = edge as f64 / longest as f64;

    if source.width >= source.height {
        // Landscape or square
        Dimensions::new(edge, scale_side(source.height, scale))
    } else {
        // Portrait
        Dimensions::new(scale_side(source.width, scale), edge)
    }
}

/// Scale factor that makes `source` fully cover `target`.
pub fn calculate_fill_scale(source: Dimensions, target: Dimensions) -> f64 {
    let sx = target.width as f64 / source.width as f64;
    let sy = target.height as f64 / source.height as f64;
    sx.max(sy)
}

/// How an aspect-fill resize is laid out before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    /// Size of the scaled source; covers `target` on both axes.
    pub scaled: Dimensions,
    /// Final output size.
    pub target: Dimensions,
    /// Pixels cropped from the leading (left, top) edges.
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Plan an aspect-fill resize followed by a center crop.
///
/// Overflow that does not split evenly is floored on the leading edge; the
/// extra pixel comes off the trailing edge. The same rule applies on both
/// axes.
///
/// # Examples
/// ```
/// # use imgfit::imaging::{Dimensions, calculate_fill_plan};
/// // 200x100 → 50x50: scale 0.5 gives 100x50, crop 25px off each side
/// let plan = calculate_fill_plan(Dimensions::new(200, 100), Dimensions::new(50, 50));
/// assert_eq!(plan.scaled, Dimensions::new(100, 50));
/// assert_eq!((plan.crop_x, plan.crop_y), (25, 0));
/// ```
pub fn calculate_fill_plan(source: Dimensions, target: Dimensions) -> FillPlan {
    if source.is_empty() || target.is_empty() {
        return FillPlan {
            scaled: target,
            target,
            crop_x: 0,
            crop_y: 0,
        };
    }

    let scale = calculate_fill_scale(source, target);
    let scaled = calculate_scaled_dimensions(source, scale);
    // Rounding must never leave an uncovered strip.
    let scaled = Dimensions {
        width: scaled.width.max(target.width),
        height: scaled.height.max(target.height),
    };

    FillPlan {
        scaled,
        target,
        crop_x: (scaled.width - target.width) / 2,
        crop_y: (scaled.height - target.height) / 2,
    }
}
