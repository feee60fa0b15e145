//! Anyshape Core - Shape-masked image editing and export
//!
//! This crate places images inside arbitrary vector clip shapes and exports
//! them. It covers transform state with undo history, preview-to-export
//! coordinate mapping, raster (PNG) and vector (SVG) rendering, and batch
//! export into a ZIP archive.
//!
//! # Coordinate model
//!
//! Transforms are stored in preview units against a fixed reference square
//! of [`PREVIEW_REFERENCE_SIZE`] pixels. Every render maps them to its own
//! output size through [`Placement`], so the preview, PNG and SVG outputs
//! agree at any resolution.

pub mod clip;
pub mod collection;
pub mod decode;
pub mod encode;
pub mod export;
pub mod mapping;
pub mod render;
pub mod shape;
pub mod transform;

pub use clip::ClipRegion;
pub use collection::{BatchItem, CollectionEvent, Commit, ImageCollection, ImageId, ImageItem};
pub use decode::{DecodeError, DecodedImage, ImageSource};
pub use encode::EncodeError;
pub use export::{
    BatchExport, ExportError, ExportFailure, ExportTicket, ExportedFile, Exporter, TOOL_NAME,
};
pub use mapping::{DragSession, Placement, Point, PreviewSurface, PREVIEW_REFERENCE_SIZE};
pub use render::{
    Background, Border, ExportConfig, ExportFormat, ImageCache, OutputSize, RenderContext,
    RenderError, Rgba,
};
pub use shape::{validate_path, ClipShape, ShapeError};
pub use transform::{Axis, Transform, TransformHistory};
