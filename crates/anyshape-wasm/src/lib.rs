//! Anyshape WASM - WebAssembly bindings for the anyshape engine
//!
//! This crate exposes the anyshape-core editor to JavaScript/TypeScript.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor`: image list, gestures, undo/redo, preview and export
//! - `shape` - Polygon, star and freehand path generators, path validation
//! - `types` - WASM-compatible wrappers for frames and exported files
//!
//! Batch export runs sequentially here; the core's tokio-backed batch is not
//! available on wasm32.
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, star_path } from '@anyshape/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor('star', 'Star', star_path(5, 0.4));
//! editor.add_file(file.name, new Uint8Array(await file.arrayBuffer()));
//! const png = editor.export_current();
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod shape;
mod types;

pub use editor::JsEditor;
pub use shape::{freehand_path, freehand_path_from_points, polygon_path, star_path, validate_path};
pub use types::{JsBatchExport, JsExportedFile, JsRgbaImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Prefix used for exported file names.
#[wasm_bindgen]
pub fn tool_name() -> String {
    anyshape_core::TOOL_NAME.to_string()
}
