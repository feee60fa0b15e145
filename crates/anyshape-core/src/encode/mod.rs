//! Image encoding for export.
//!
//! Only PNG is produced: clipped output is transparent outside the shape.

mod png;

pub use png::{encode_png, encode_rgba_png, EncodeError};
