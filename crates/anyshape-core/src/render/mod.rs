//! Rendering of a transformed image through a clip shape.
//!
//! Two backends share one geometry source, [`Placement`](crate::Placement):
//!
//! - [`raster`] draws into an `S x S` RGBA buffer with `tiny-skia`. The
//!   live preview is the same render at the on-screen preview size.
//! - [`vector`] writes a self-contained SVG document that embeds the
//!   original file as a `data:` URI.
//!
//! # Layering
//!
//! Both backends paint, in order: the optional solid background over the
//! whole square, the image clipped by the shape (non-zero fill rule), then
//! the optional border stroke along the shape outline, unclipped.

mod config;
mod context;
pub mod raster;
pub mod vector;

pub use config::{
    Background, Border, ExportConfig, ExportFormat, OutputSize, ParseColorError, Rgba,
    UnsupportedSize, MAX_BORDER_WIDTH, MIN_BORDER_WIDTH,
};
pub use context::{ImageCache, RenderContext};
pub use raster::{render_png, render_raster, render_raster_sized};
pub use vector::render_svg;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::shape::ShapeError;

/// Errors that can occur while producing a render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Clip shape rejected: {0}")]
    Shape(#[from] ShapeError),

    /// The drawing surface could not be created or drawn on.
    #[error("Canvas error: {0}")]
    Canvas(String),
}
