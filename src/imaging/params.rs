//! Parameter types for image operations.
//!
//! These are plain value types passed by value into the
//! [`operations`](super::operations) façade and down to the
//! [`backend`](super::backend). None of them has identity or a lifecycle.
//!
//! ## Types
//!
//! - [`Color`]: Straight RGBA8 color. Parses from `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`.
//! - [`Padding`]: Horizontal and vertical border widths in pixels. Non-negative by type.
//! - [`Scale`]: Uniform resize factor. Finite and strictly positive on construction.
//! - [`Rect`]: Destination rectangle on a surface. Signed origin so it can hang off the edge.
//! - [`Filter`]: Resampling filter used when a draw changes an image's size.
//! - [`Quality`]: Lossy encoding quality (1-100, default 90). Clamped on construction.

use super::backend::{BackendError, Dimensions};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color {input:?}: expected #rgb, #rgba, #rrggbb or #rrggbbaa")]
pub struct ParseColorError {
    input: String,
}

/// Straight (non-premultiplied) RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Hex form, `#rrggbb` when opaque and `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(px: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self { r, g, b, a }
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(c: Color) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_string(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        // Short forms repeat each nibble: "f80" → "ff8800".
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return Err(err()),
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16);
        let r = channel(0).map_err(|_| err())?;
        let g = channel(1).map_err(|_| err())?;
        let b = channel(2).map_err(|_| err())?;
        let a = if expanded.len() == 8 {
            channel(3).map_err(|_| err())?
        } else {
            255
        };
        Ok(Self { r, g, b, a })
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Border added around an image, in pixels, on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Padding {
    pub fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn uniform(px: u32) -> Self {
        Self::new(px, px)
    }
}

/// Uniform resize factor applied to both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    pub fn new(factor: f64) -> Result<Self, BackendError> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(BackendError::InvalidScale(factor))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Scale {
    type Error = BackendError;

    fn try_from(factor: f64) -> Result<Self, Self::Error> {
        Self::new(factor)
    }
}

/// Destination rectangle on a surface.
///
/// The origin is signed: a negative `x`/`y` places the top-left corner off
/// the surface and the overhang is clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i64, y: i64, size: Dimensions) -> Self {
        Self {
            x,
            y,
            width: size.width,
            height: size.height,
        }
    }

    /// Rectangle covering a whole surface of the given size.
    pub fn covering(size: Dimensions) -> Self {
        Self::new(0, 0, size)
    }

    pub fn size(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Resampling filter for draws that change an image's size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<Filter> for FilterType {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32")]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_long_forms() {
        assert_eq!("#ff0000".parse::<Color>().unwrap(), Color::RED);
        assert_eq!(
            "#11223344".parse::<Color>().unwrap(),
            Color::rgba(0x11, 0x22, 0x33, 0x44)
        );
    }

    #[test]
    fn color_parses_short_forms() {
        assert_eq!("#f80".parse::<Color>().unwrap(), Color::rgb(0xff, 0x88, 0x00));
        assert_eq!("#0000".parse::<Color>().unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn color_rejects_garbage() {
        assert!("ff0000".parse::<Color>().is_err());
        assert!("#ff000".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert!("#".parse::<Color>().is_err());
    }

    #[test]
    fn color_hex_drops_alpha_when_opaque() {
        assert_eq!(Color::RED.to_hex(), "#ff0000");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn color_roundtrips_through_rgba_pixel() {
        let c = Color::rgba(10, 20, 30, 40);
        let px: image::Rgba<u8> = c.into();
        assert_eq!(Color::from(px), c);
    }

    #[test]
    fn scale_rejects_non_positive_and_non_finite() {
        assert!(Scale::new(0.0).is_err());
        assert!(Scale::new(-1.5).is_err());
        assert!(Scale::new(f64::NAN).is_err());
        assert!(Scale::new(f64::INFINITY).is_err());
        assert_eq!(Scale::new(0.5).unwrap().value(), 0.5);
    }

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn filter_default_is_lanczos3() {
        assert_eq!(Filter::default(), Filter::Lanczos3);
    }

    #[test]
    fn rect_covering_starts_at_origin() {
        let r = Rect::covering(Dimensions {
            width: 3,
            height: 4,
        });
        assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 3, 4));
    }
}
