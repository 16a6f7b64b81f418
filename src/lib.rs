//! # imgfit
//!
//! Five stateless image helpers over a swappable rasterization backend:
//! solid-color images, padding, uniform resize by scale, uniform resize to a
//! longest edge, and aspect-fill resize with a center crop.
//!
//! ```
//! use imgfit::imaging::{Color, Dimensions, Padding, RustBackend};
//! use imgfit::imaging::{image_with_color, image_with_padding, resize_to_fill};
//!
//! let backend = RustBackend::new();
//! let dot = image_with_color(&backend, Color::RED)?;
//! let framed = image_with_padding(&backend, &dot, Padding::new(2, 1), Color::WHITE)?;
//! assert_eq!(framed.dimensions(), Dimensions::new(5, 3));
//!
//! let square = resize_to_fill(&backend, &framed, Dimensions::new(4, 4))?;
//! assert_eq!(square.dimensions(), Dimensions::new(4, 4));
//! # Ok::<(), imgfit::imaging::BackendError>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The operations, their value types, the backend traits and the `image`-crate backend |
//! | [`config`] | `imgfit.toml` loading, merging over stock defaults, validation |
//! | [`batch`] | Apply one operation to many files in parallel, with a serializable report |
//! | [`output`] | CLI output formatting for batch progress and results |
//!
//! # Design Decisions
//!
//! ## Explicit Backend
//!
//! Every operation takes a [`RasterBackend`](imaging::RasterBackend) and
//! follows the same three steps: allocate a surface of the output size, draw,
//! read the surface back as a new [`Image`](imaging::Image). Dimension math
//! lives in pure functions, so tests check sizes and crop offsets without
//! pixels, and check draw calls against a recording mock backend.
//!
//! ## Scoped Surfaces
//!
//! A surface is released when dropped. An operation that fails halfway,
//! through `?` or otherwise, never leaks one.
//!
//! ## One Failure Class
//!
//! Surfaces that cannot exist (a zero side, or more pixels than the backend
//! allows) fail with
//! [`BackendError::AllocationFailed`](imaging::BackendError::AllocationFailed).
//! There are no partial results and nothing is retried.
//!
//! ## Crop Rounding
//!
//! When an aspect-fill overflow does not split evenly, the leading edge
//! (left, top) loses `floor(overflow / 2)` pixels and the trailing edge the
//! rest, on both axes.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
