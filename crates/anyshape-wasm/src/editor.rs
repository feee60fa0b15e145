//! Interactive editor bindings.
//!
//! `JsEditor` owns the image collection, the decoded-image cache, the active
//! clip shape and the export settings. The page forwards pointer, touch and
//! wheel events in preview-element pixels together with the element's
//! rendered size; everything else is a plain method call.
//!
//! # Example
//!
//! ```typescript
//! const editor = new JsEditor('circle', 'Circle', CIRCLE_PATH);
//! editor.add_file(file.name, new Uint8Array(await file.arrayBuffer()));
//!
//! canvas.onpointerdown = (e) => editor.pointer_down(e.offsetX, e.offsetY, canvas.clientWidth);
//! canvas.onpointermove = (e) => editor.pointer_move(e.offsetX, e.offsetY, canvas.clientWidth) && redraw();
//! canvas.onpointerup = () => editor.pointer_up();
//!
//! const frame = editor.render_preview(canvas.clientWidth);
//! ```

use anyshape_core::decode::{cover_thumbnail, DecodedImage, ImageSource};
use anyshape_core::render::{render_raster_sized, Background, Border, ExportConfig, ExportFormat, OutputSize};
use anyshape_core::{Axis, ClipShape, Exporter, ImageCollection, PreviewSurface, RenderContext};
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::types::{JsBatchExport, JsExportedFile, JsRgbaImage};

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Editor state for one page.
#[wasm_bindgen]
pub struct JsEditor {
    collection: ImageCollection,
    ctx: RenderContext,
    exporter: Exporter,
    shape: ClipShape,
    config: ExportConfig,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor clipping to the given shape.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid, non-degenerate SVG path.
    #[wasm_bindgen(constructor)]
    pub fn new(shape_id: &str, shape_name: &str, path: &str) -> Result<JsEditor, JsValue> {
        Ok(JsEditor {
            collection: ImageCollection::new(),
            ctx: RenderContext::new(),
            exporter: Exporter::default(),
            shape: ClipShape::new(shape_id, shape_name, path).map_err(to_js)?,
            config: ExportConfig::default(),
        })
    }

    /// Replace the clip shape. Transforms are kept.
    pub fn set_shape(&mut self, shape_id: &str, shape_name: &str, path: &str) -> Result<(), JsValue> {
        self.shape = ClipShape::new(shape_id, shape_name, path).map_err(to_js)?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn shape_id(&self) -> String {
        self.shape.id.clone()
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// Add an uploaded file. Returns `false` for non-image files.
    pub fn add_file(&mut self, file_name: &str, bytes: Vec<u8>) -> bool {
        self.add_source(file_name, ImageSource::from_bytes(bytes))
    }

    /// Add an image from a base64 `data:` URI. Returns `false` for non-image
    /// MIME types.
    pub fn add_data_uri(&mut self, file_name: &str, data_uri: &str) -> Result<bool, JsValue> {
        let source = ImageSource::from_data_uri(data_uri).map_err(to_js)?;
        Ok(self.add_source(file_name, source))
    }

    /// Remove the image at `index`.
    pub fn remove(&mut self, index: usize) -> bool {
        match self.collection.remove(index) {
            Some(item) => {
                self.ctx.cache.evict(item.id());
                true
            }
            None => false,
        }
    }

    pub fn remove_current(&mut self) -> bool {
        self.remove(self.collection.selected_index())
    }

    /// Remove every image. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.collection.clear();
        self.ctx.cache.clear();
        removed.len()
    }

    pub fn select(&mut self, index: usize) -> bool {
        self.collection.select(index)
    }

    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    #[wasm_bindgen(getter)]
    pub fn selected_index(&self) -> usize {
        self.collection.selected_index()
    }

    /// Display name (file name without extension) of the image at `index`.
    pub fn image_name(&self, index: usize) -> Option<String> {
        self.collection.iter().nth(index).map(|item| item.name().to_string())
    }

    /// Counter bumped on every observable change; compare to decide redraws.
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> f64 {
        self.collection.revision() as f64
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Start a drag at `(x, y)` pixels inside a preview rendered at
    /// `rendered_size` pixels.
    pub fn pointer_down(&mut self, x: f64, y: f64, rendered_size: f64) -> bool {
        let point = PreviewSurface::new(rendered_size).to_preview(x, y);
        self.collection.pointer_down(point)
    }

    /// Move the active drag. Returns `true` if the transform changed.
    pub fn pointer_move(&mut self, x: f64, y: f64, rendered_size: f64) -> bool {
        let point = PreviewSurface::new(rendered_size).to_preview(x, y);
        self.collection.pointer_move(point).is_some()
    }

    /// End the drag, recording one history entry if the image moved.
    pub fn pointer_up(&mut self) -> bool {
        self.collection.pointer_up()
    }

    /// Single-finger touch; same semantics as [`JsEditor::pointer_down`].
    pub fn touch_start(&mut self, x: f64, y: f64, rendered_size: f64) -> bool {
        self.pointer_down(x, y, rendered_size)
    }

    pub fn touch_move(&mut self, x: f64, y: f64, rendered_size: f64) -> bool {
        self.pointer_move(x, y, rendered_size)
    }

    pub fn touch_end(&mut self) -> bool {
        self.pointer_up()
    }

    /// Zoom by one wheel notch; negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.collection.wheel(delta_y).is_some()
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        self.collection.set_scale(scale).is_some()
    }

    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        self.collection.set_rotation(degrees).is_some()
    }

    pub fn flip_horizontal(&mut self) -> bool {
        self.collection.toggle_flip(Axis::Horizontal).is_some()
    }

    pub fn flip_vertical(&mut self) -> bool {
        self.collection.toggle_flip(Axis::Vertical).is_some()
    }

    pub fn reset(&mut self) -> bool {
        self.collection.reset().is_some()
    }

    pub fn undo(&mut self) -> bool {
        self.collection.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.collection.redo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.collection.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.collection.can_redo()
    }

    /// Transform of the current image as a plain object, or `undefined`.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        match self.collection.current() {
            Some(item) => serde_wasm_bindgen::to_value(&item.transform()).map_err(to_js),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // ------------------------------------------------------------------
    // Export settings
    // ------------------------------------------------------------------

    /// Set the export size: 256, 512, 1024 or 2048.
    pub fn set_output_size(&mut self, size: u32) -> Result<(), JsValue> {
        self.config.output_size = OutputSize::try_from(size).map_err(to_js)?;
        Ok(())
    }

    /// Set the background: `"transparent"` or a hex color.
    pub fn set_background(&mut self, value: &str) -> Result<(), JsValue> {
        self.config.background = Background::try_from(value.to_string()).map_err(to_js)?;
        Ok(())
    }

    /// Configure the outline stroke. Positive widths are clamped to 1-20
    /// pixels; a width of 0 or less draws no border.
    pub fn set_border(&mut self, enabled: bool, width: f64, color: &str) -> Result<(), JsValue> {
        self.config.border = Border {
            enabled,
            width,
            color: color.parse().map_err(to_js)?,
        };
        Ok(())
    }

    /// Set the export format: `"png"` or `"svg"`.
    pub fn set_format(&mut self, format: &str) -> Result<(), JsValue> {
        self.config.format = match format.to_ascii_lowercase().as_str() {
            "png" => ExportFormat::Png,
            "svg" => ExportFormat::Svg,
            other => return Err(JsValue::from_str(&format!("Unsupported format: {other}"))),
        };
        Ok(())
    }

    /// Current export settings as a plain object.
    pub fn config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.config).map_err(to_js)
    }

    /// Replace the export settings. Missing fields take their defaults.
    pub fn set_config(&mut self, value: JsValue) -> Result<(), JsValue> {
        self.config = serde_wasm_bindgen::from_value(value).map_err(to_js)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rendering and export
    // ------------------------------------------------------------------

    /// Render the current image for a preview element `rendered_size`
    /// pixels wide. Returns `undefined` when there is no image.
    pub fn render_preview(&self, rendered_size: f64) -> Result<Option<JsRgbaImage>, JsValue> {
        let Some(item) = self.collection.current() else {
            return Ok(None);
        };
        let decoded = self.decoded(item.id(), item.source())?;
        let size = PreviewSurface::new(rendered_size).pixel_size();
        let frame = render_raster_sized(&decoded, &item.transform(), &self.shape, &self.config, size, &self.ctx)
            .map_err(to_js)?;
        Ok(Some(JsRgbaImage::from_rgba(frame)))
    }

    /// Square, center-cropped thumbnail of the image at `index`.
    pub fn thumbnail(&self, index: usize, size: u32) -> Result<Option<JsRgbaImage>, JsValue> {
        let Some(item) = self.collection.iter().nth(index) else {
            return Ok(None);
        };
        let decoded = self.decoded(item.id(), item.source())?;
        let thumb = cover_thumbnail(&decoded, size).map_err(to_js)?;
        Ok(Some(JsRgbaImage::from_decoded(thumb)))
    }

    /// Export the current image. Returns `undefined` when there is no image.
    ///
    /// # Errors
    ///
    /// Fails if an export is already running or rendering fails.
    pub fn export_current(&self) -> Result<Option<JsExportedFile>, JsValue> {
        let file = self
            .exporter
            .export_current(&self.ctx, &self.collection, &self.shape, &self.config)
            .map_err(to_js)?;
        Ok(file.map(JsExportedFile::from))
    }

    /// Export every image into one ZIP archive. Images that fail are
    /// skipped and reported on the console.
    pub fn export_all(&self) -> Result<Option<JsBatchExport>, JsValue> {
        let batch = self
            .exporter
            .export_collection_blocking(&self.ctx, &self.collection, &self.shape, &self.config)
            .map_err(to_js)?;
        let Some(batch) = batch else {
            return Ok(None);
        };
        for failure in &batch.failures {
            console::warn_1(&JsValue::from_str(&format!(
                "Skipped {} in batch export: {}",
                failure.image_name, failure.error
            )));
        }
        Ok(Some(JsBatchExport::from(batch)))
    }
}

impl JsEditor {
    fn add_source(&mut self, file_name: &str, source: ImageSource) -> bool {
        if !source.is_image() {
            return false;
        }
        self.collection.add(file_name, source);
        true
    }

    fn decoded(&self, id: anyshape_core::ImageId, source: &ImageSource) -> Result<Arc<DecodedImage>, JsValue> {
        self.ctx.cache.get_or_decode(id, source).map_err(to_js)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SQUARE: &str = "M 0 0 L 100 0 L 100 100 L 0 100 Z";

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(w, h));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn editor() -> JsEditor {
        match JsEditor::new("square", "Square", SQUARE) {
            Ok(editor) => editor,
            Err(_) => panic!("valid shape rejected"),
        }
    }

    #[test]
    fn test_add_filters_non_images() {
        let mut editor = editor();
        assert!(editor.add_file("photo.png", png_bytes(4, 4)));
        assert!(!editor.add_file("notes.txt", b"hello".to_vec()));
        assert_eq!(editor.len(), 1);
        assert_eq!(editor.image_name(0).as_deref(), Some("photo"));
    }

    #[test]
    fn test_gestures_on_native() {
        let mut editor = editor();
        assert!(!editor.wheel(-1.0));
        editor.add_file("a.png", png_bytes(4, 4));

        assert!(editor.wheel(-1.0));
        assert!(editor.flip_horizontal());
        assert!(editor.undo());
        assert!(editor.can_redo());
        assert!(editor.reset());
    }

    #[test]
    fn test_remove_evicts_cache() {
        let mut editor = editor();
        editor.add_file("a.png", png_bytes(4, 4));
        editor.add_file("b.png", png_bytes(4, 4));
        assert!(editor.render_preview(64.0).is_ok());
        assert!(editor.thumbnail(1, 16).is_ok());
        assert_eq!(editor.ctx.cache.len(), 2);

        assert!(editor.remove(0));
        assert_eq!(editor.ctx.cache.len(), 1);
        assert_eq!(editor.clear(), 1);
        assert!(editor.ctx.cache.is_empty());
        assert!(!editor.remove_current());
    }
}
