//! Reading and writing [`Image`]s on disk.
//!
//! Decoding uses the `image` crate's pure Rust codecs. Encoding picks the
//! codec from the output path's extension:
//!
//! | Extension | Encoder |
//! |---|---|
//! | `png` | `PngEncoder` (keeps alpha) |
//! | `jpg`, `jpeg` | `JpegEncoder` with [`Quality`], alpha dropped |
//! | `webp` | `WebPEncoder::new_lossless` |
//! | `tif`, `tiff` | `TiffEncoder` |

use super::backend::{BackendError, Image};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Extensions with a decoder compiled in.
const INPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// Returns the set of image file extensions that can be read.
pub fn supported_input_extensions() -> &'static [&'static str] {
    INPUT_EXTENSIONS
}

/// True when `path` has an extension listed in [`supported_input_extensions`].
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| INPUT_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(e)))
}

/// Encoded file format for written images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Tiff,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Tiff => "tiff",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, BackendError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "tif" | "tiff" => Ok(Self::Tiff),
            other => Err(BackendError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Load and decode an image from disk.
pub fn load_image(path: &Path) -> Result<Image, BackendError> {
    let decoded = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))?;
    Ok(Image::from_dynamic(decoded))
}

/// Encode `image` to `path`, choosing the codec from the extension.
pub fn save_image(image: &Image, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = OutputFormat::from_path(path)?;
    let writer = BufWriter::new(File::create(path)?);
    let (w, h) = (image.width(), image.height());
    let encode_err = |e: image::ImageError| BackendError::Encode(format!("{}: {}", path.display(), e));

    match format {
        OutputFormat::Png => PngEncoder::new(writer)
            .write_image(image.as_rgba().as_raw(), w, h, ExtendedColorType::Rgba8)
            .map_err(encode_err),
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(image.as_rgba().clone()).into_rgb8();
            JpegEncoder::new_with_quality(writer, quality.value() as u8)
                .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(encode_err)
        }
        OutputFormat::Webp => WebPEncoder::new_lossless(writer)
            .write_image(image.as_rgba().as_raw(), w, h, ExtendedColorType::Rgba8)
            .map_err(encode_err),
        OutputFormat::Tiff => TiffEncoder::new(writer)
            .write_image(image.as_rgba().as_raw(), w, h, ExtendedColorType::Rgba8)
            .map_err(encode_err),
    }
}
