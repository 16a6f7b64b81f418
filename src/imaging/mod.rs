//! Image helpers over a swappable rasterization backend.
//!
//! | Operation | Function | Output size |
//! |---|---|---|
//! | **Solid color** | [`image_with_color`], [`solid_image`] | 1×1, or any size |
//! | **Padding** | [`image_with_padding`] | `(w + 2h, h + 2v)` |
//! | **Scale** | [`resize_by_scale`] | `(round(w·s), round(h·s))` |
//! | **Longest edge** | [`resize_to_longest_edge`] | longer side = `edge` |
//! | **Aspect fill** | [`resize_to_fill`] | exactly the target, center-cropped |
//!
//! Layers, bottom up:
//! - **Parameters**: colors, padding, scale factors, rectangles, filters
//! - **Calculations**: output sizes and crop offsets, no pixels involved
//! - **Backend**: [`RasterBackend`] / [`Surface`] traits, [`RustBackend`]
//! - **Operations**: size from the calculations, pixels from the backend
//! - **IO**: reading and writing image files

pub mod backend;
mod calculations;
pub mod io;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, Image, RasterBackend, Surface};
pub use calculations::{
    FillPlan, calculate_fill_plan, calculate_fill_scale, calculate_longest_edge_dimensions,
    calculate_padded_dimensions, calculate_scaled_dimensions,
};
pub use io::{OutputFormat, load_image, save_image, supported_input_extensions};
pub use operations::{
    image_with_color, image_with_padding, resize_by_scale, resize_to_fill, resize_to_longest_edge,
    solid_image,
};
pub use params::{Color, Filter, Padding, ParseColorError, Quality, Rect, Scale};
pub use rust_backend::{DEFAULT_MAX_PIXELS, RustBackend};
