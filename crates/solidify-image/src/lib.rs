//! Image layers for solidify.
//!
//! Encodes decoded raster images into the compact blob format read by the
//! on-chain layer renderer: cropped to the visible frame, rows bottom to top,
//! channels in BMP order, with the alpha channel dropped when the layer is
//! opaque. Images come from the `image` crate: any decoded view with RGBA8
//! pixels is a [`Raster`], and [`PremultipliedImage`] wraps buffers whose
//! colors are premultiplied.

pub mod blend;
pub mod codec;
pub mod error;
pub mod raster;

pub use image;

pub use blend::composite_over;
pub use codec::{shrink_bounds, Image, HEADER_LEN};
pub use error::{ImageError, ImageResult};
pub use raster::{unpremultiply, PremultipliedImage, Raster, Rect};
