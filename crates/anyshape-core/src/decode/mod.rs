//! Image decoding pipeline.
//!
//! This module provides functionality for:
//! - Holding loaded files as [`ImageSource`] (raw bytes or `data:` URIs)
//! - Decoding them to upright RGBA with EXIF orientation applied
//! - Square cover thumbnails for image lists
//!
//! # Architecture
//!
//! Decoding is a single synchronous call that either completes or fails.
//! Batch export runs many of them on a blocking pool; the wasm bindings
//! call them directly.

mod raster;
mod resize;
mod source;
mod types;

pub use raster::{decode_image, decode_source, get_orientation};
pub use resize::{cover_thumbnail, resize};
pub use source::{display_name, ImageSource};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
