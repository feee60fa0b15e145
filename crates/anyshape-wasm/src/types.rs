//! WASM-compatible wrapper types for rendered images and exports.
//!
//! Byte buffers are copied into JavaScript memory as `Uint8Array` on access.

use anyshape_core::decode::DecodedImage;
use anyshape_core::export::{BatchExport, ExportedFile};
use image::RgbaImage;
use wasm_bindgen::prelude::*;

/// An RGBA image for JavaScript, e.g. a preview frame or thumbnail.
///
/// `pixels()` is laid out for `new ImageData(new Uint8ClampedArray(px), w, h)`.
#[wasm_bindgen]
pub struct JsRgbaImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRgbaImage {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns straight-alpha RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsRgbaImage {
    pub(crate) fn from_rgba(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }

    pub(crate) fn from_decoded(image: DecodedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            pixels: image.pixels,
        }
    }
}

/// A single exported file, ready to be wrapped in a `Blob` and downloaded.
#[wasm_bindgen]
pub struct JsExportedFile {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsExportedFile {
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl From<ExportedFile> for JsExportedFile {
    fn from(file: ExportedFile) -> Self {
        Self {
            file_name: file.file_name,
            mime_type: file.mime_type.to_string(),
            bytes: file.bytes,
        }
    }
}

/// A batch ZIP archive plus the names of images that were skipped.
#[wasm_bindgen]
pub struct JsBatchExport {
    archive_name: String,
    archive: Vec<u8>,
    entries: Vec<String>,
    failed: Vec<String>,
}

#[wasm_bindgen]
impl JsBatchExport {
    #[wasm_bindgen(getter)]
    pub fn archive_name(&self) -> String {
        self.archive_name.clone()
    }

    /// ZIP bytes (a copy).
    pub fn archive(&self) -> Vec<u8> {
        self.archive.clone()
    }

    /// Entry names inside the archive.
    pub fn entries(&self) -> Vec<String> {
        self.entries.clone()
    }

    /// Display names of images that could not be exported.
    pub fn failed(&self) -> Vec<String> {
        self.failed.clone()
    }
}

impl From<BatchExport> for JsBatchExport {
    fn from(batch: BatchExport) -> Self {
        Self {
            archive_name: batch.archive_name,
            archive: batch.archive,
            entries: batch.entries,
            failed: batch.failures.into_iter().map(|f| f.image_name).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyshape_core::export::{ExportError, ExportFailure};

    #[test]
    fn test_rgba_image_from_buffer() {
        let img = JsRgbaImage::from_rgba(RgbaImage::new(4, 3));
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.byte_length(), 48);
    }

    #[test]
    fn test_rgba_image_from_decoded() {
        let img = JsRgbaImage::from_decoded(DecodedImage::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(img.pixels(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_batch_conversion_keeps_failed_names() {
        let batch = BatchExport {
            archive_name: "anyshape-batch-export.zip".to_string(),
            archive: vec![0x50, 0x4b],
            entries: vec!["anyshape-a-circle.png".to_string()],
            failures: vec![ExportFailure {
                image_name: "b".to_string(),
                error: ExportError::Task("cancelled".to_string()),
            }],
        };
        let js = JsBatchExport::from(batch);
        assert_eq!(js.archive_name(), "anyshape-batch-export.zip");
        assert_eq!(js.entries(), vec!["anyshape-a-circle.png"]);
        assert_eq!(js.failed(), vec!["b"]);
    }
}
