//! Single and batch export.
//!
//! Only one export runs at a time. [`Exporter::begin`] hands out an
//! [`ExportTicket`] that holds the in-progress flag until it is dropped, so a
//! second request is rejected with [`ExportError::InProgress`] without
//! touching any state.
//!
//! A batch renders every item independently. Items that fail to decode or
//! render are reported in [`BatchExport::failures`] and left out of the
//! archive; the batch itself only fails when the archive cannot be written.

mod archive;

pub use archive::ArchiveBuilder;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use zip::result::ZipError;

use crate::collection::{BatchItem, ImageCollection};
use crate::render::{render_png, render_svg, ExportConfig, ExportFormat, RenderContext, RenderError};
use crate::shape::ClipShape;

/// Prefix of every exported file name.
pub const TOOL_NAME: &str = "anyshape";

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    InProgress,

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Archive failed: {0}")]
    Archive(#[from] ZipError),

    #[error("Task join error: {0}")]
    Task(String),
}

/// One exported file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// An item left out of a batch archive.
#[derive(Debug)]
pub struct ExportFailure {
    pub image_name: String,
    pub error: ExportError,
}

/// Result of a batch export.
#[derive(Debug)]
pub struct BatchExport {
    pub archive_name: String,
    /// ZIP bytes.
    pub archive: Vec<u8>,
    /// Entry names in input order, after de-duplication.
    pub entries: Vec<String>,
    pub failures: Vec<ExportFailure>,
}

/// `{tool}-{image}-{shape}.{ext}`
pub fn export_file_name(tool: &str, image_name: &str, shape_id: &str, format: ExportFormat) -> String {
    format!("{tool}-{image_name}-{shape_id}.{}", format.extension())
}

/// `{tool}-batch-export.zip`
pub fn archive_name(tool: &str) -> String {
    format!("{tool}-batch-export.zip")
}

/// Entry point for exports; cheap to clone, clones share the in-progress flag.
#[derive(Debug, Clone)]
pub struct Exporter {
    tool_name: String,
    busy: Arc<AtomicBool>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(TOOL_NAME)
    }
}

impl Exporter {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the in-progress flag.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InProgress` if another ticket is alive.
    pub fn begin(&self) -> Result<ExportTicket, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::InProgress)?;
        Ok(ExportTicket {
            tool_name: self.tool_name.clone(),
            busy: Arc::clone(&self.busy),
        })
    }

    /// Export the selected item.
    ///
    /// Returns `Ok(None)` when the collection is empty.
    pub fn export_current(
        &self,
        ctx: &RenderContext,
        collection: &ImageCollection,
        shape: &ClipShape,
        config: &ExportConfig,
    ) -> Result<Option<ExportedFile>, ExportError> {
        let Some(item) = collection.current() else {
            return Ok(None);
        };
        let ticket = self.begin()?;
        let file = ticket.export_one(ctx, &item.snapshot(), shape, config)?;
        info!(file = %file.file_name, bytes = file.bytes.len(), "export finished");
        Ok(Some(file))
    }

    /// Export every item into one archive on the blocking pool.
    ///
    /// Returns `Ok(None)` when the collection is empty.
    #[cfg(feature = "tokio")]
    pub async fn export_collection(
        &self,
        ctx: &RenderContext,
        collection: &ImageCollection,
        shape: &ClipShape,
        config: &ExportConfig,
    ) -> Result<Option<BatchExport>, ExportError> {
        if collection.is_empty() {
            return Ok(None);
        }
        let ticket = self.begin()?;
        let items = collection.snapshot();
        ticket.export_all(ctx, items, shape, config).await.map(Some)
    }

    /// Sequential variant of [`Exporter::export_collection`].
    pub fn export_collection_blocking(
        &self,
        ctx: &RenderContext,
        collection: &ImageCollection,
        shape: &ClipShape,
        config: &ExportConfig,
    ) -> Result<Option<BatchExport>, ExportError> {
        if collection.is_empty() {
            return Ok(None);
        }
        let ticket = self.begin()?;
        ticket
            .export_all_blocking(ctx, collection.snapshot(), shape, config)
            .map(Some)
    }
}

/// Proof that this caller owns the in-progress flag. Dropping it releases
/// the flag.
#[derive(Debug)]
pub struct ExportTicket {
    tool_name: String,
    busy: Arc<AtomicBool>,
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl ExportTicket {
    /// Decode (cached) and render one item.
    pub fn export_one(
        &self,
        ctx: &RenderContext,
        item: &BatchItem,
        shape: &ClipShape,
        config: &ExportConfig,
    ) -> Result<ExportedFile, ExportError> {
        render_item(&self.tool_name, ctx, item, shape, config)
    }

    /// Render all items concurrently and package the successes.
    ///
    /// Every item is spawned on the blocking pool before any is awaited;
    /// results are joined in input order.
    #[cfg(feature = "tokio")]
    pub async fn export_all(
        self,
        ctx: &RenderContext,
        items: Vec<BatchItem>,
        shape: &ClipShape,
        config: &ExportConfig,
    ) -> Result<BatchExport, ExportError> {
        let handles: Vec<_> = items
            .into_iter()
            .map(|item| {
                let name = item.name.clone();
                let tool = self.tool_name.clone();
                let ctx = ctx.clone();
                let shape = shape.clone();
                let config = *config;
                let handle = tokio::task::spawn_blocking(move || {
                    render_item(&tool, &ctx, &item, &shape, &config)
                });
                (name, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let outcome = handle
                .await
                .map_err(|e| ExportError::Task(e.to_string()))
                .and_then(|result| result);
            outcomes.push((name, outcome));
        }

        self.package(outcomes)
    }

    /// Render items one after another and package the successes.
    pub fn export_all_blocking(
        self,
        ctx: &RenderContext,
        items: Vec<BatchItem>,
        shape: &ClipShape,
        config: &ExportConfig,
    ) -> Result<BatchExport, ExportError> {
        let outcomes = items
            .iter()
            .map(|item| {
                (
                    item.name.clone(),
                    render_item(&self.tool_name, ctx, item, shape, config),
                )
            })
            .collect();
        self.package(outcomes)
    }

    fn package(
        &self,
        outcomes: Vec<(String, Result<ExportedFile, ExportError>)>,
    ) -> Result<BatchExport, ExportError> {
        let mut builder = ArchiveBuilder::new();
        let mut failures = Vec::new();

        for (image_name, outcome) in outcomes {
            match outcome {
                Ok(file) => {
                    builder.add(&file.file_name, &file.bytes)?;
                }
                Err(error) => {
                    warn!(image = %image_name, %error, "skipping image in batch export");
                    failures.push(ExportFailure { image_name, error });
                }
            }
        }

        let (archive, entries) = builder.finish()?;
        info!(
            entries = entries.len(),
            failures = failures.len(),
            bytes = archive.len(),
            "batch export finished"
        );
        Ok(BatchExport {
            archive_name: archive_name(&self.tool_name),
            archive,
            entries,
            failures,
        })
    }
}

fn render_item(
    tool: &str,
    ctx: &RenderContext,
    item: &BatchItem,
    shape: &ClipShape,
    config: &ExportConfig,
) -> Result<ExportedFile, ExportError> {
    let decoded = ctx
        .cache
        .get_or_decode(item.id, &item.source)
        .map_err(RenderError::from)?;

    let bytes = match config.format {
        ExportFormat::Png => render_png(&decoded, &item.transform, shape, config, ctx)?,
        ExportFormat::Svg => render_svg(
            &item.source,
            decoded.width,
            decoded.height,
            &item.transform,
            shape,
            config,
            ctx,
        )
        .into_bytes(),
    };

    Ok(ExportedFile {
        file_name: export_file_name(tool, &item.name, &shape.id, config.format),
        mime_type: config.format.mime_type(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ImageId;
    use crate::decode::{DecodeError, ImageSource};
    use crate::render::OutputSize;
    use crate::transform::Transform;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn png_source(w: u32, h: u32) -> ImageSource {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, image::Rgba([9, 99, 199, 255])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        ImageSource::from_bytes(bytes)
    }

    fn item(id: u64, name: &str, source: ImageSource) -> BatchItem {
        BatchItem {
            id: ImageId(id),
            name: name.to_string(),
            source,
            transform: Transform::IDENTITY.with_scale(1.2),
        }
    }

    fn circle() -> ClipShape {
        ClipShape::trusted("circle", "Circle", "M 50 0 A 50 50 0 1 1 50 100 A 50 50 0 1 1 50 0 Z")
    }

    fn small_png() -> ExportConfig {
        ExportConfig {
            output_size: OutputSize::Px256,
            ..ExportConfig::default()
        }
    }

    fn read_entry(archive: &[u8], name: &str) -> Vec<u8> {
        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut bytes = Vec::new();
        zip.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_names() {
        assert_eq!(
            export_file_name("anyshape", "beach", "heart", ExportFormat::Png),
            "anyshape-beach-heart.png"
        );
        assert_eq!(archive_name("anyshape"), "anyshape-batch-export.zip");
    }

    #[test]
    fn test_second_ticket_rejected_until_drop() {
        let exporter = Exporter::default();
        let ticket = exporter.begin().unwrap();
        assert!(exporter.is_busy());
        assert!(matches!(exporter.begin(), Err(ExportError::InProgress)));

        // Clones share the flag
        assert!(matches!(exporter.clone().begin(), Err(ExportError::InProgress)));

        drop(ticket);
        assert!(!exporter.is_busy());
        assert!(exporter.begin().is_ok());
    }

    #[test]
    fn test_export_current_while_busy_is_rejected() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let mut collection = ImageCollection::new();
        collection.add("photo.png", png_source(8, 8));

        let _ticket = exporter.begin().unwrap();
        let result = exporter.export_current(&ctx, &collection, &circle(), &small_png());
        assert!(matches!(result, Err(ExportError::InProgress)));
        assert!(ctx.cache.is_empty());
    }

    #[test]
    fn test_export_current_empty_is_none() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let collection = ImageCollection::new();
        let result = exporter.export_current(&ctx, &collection, &circle(), &small_png());
        assert!(result.unwrap().is_none());
        assert!(!exporter.is_busy());
    }

    #[test]
    fn test_export_current_png() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let mut collection = ImageCollection::new();
        collection.add("photo.png", png_source(30, 20));

        let file = exporter
            .export_current(&ctx, &collection, &circle(), &small_png())
            .unwrap()
            .unwrap();
        assert_eq!(file.file_name, "anyshape-photo-circle.png");
        assert_eq!(file.mime_type, "image/png");
        let decoded = image::load_from_memory(&file.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (256, 256));
        assert!(!exporter.is_busy());
    }

    #[test]
    fn test_export_one_svg() {
        let exporter = Exporter::new("shapes");
        let ctx = RenderContext::new();
        let config = ExportConfig {
            format: ExportFormat::Svg,
            ..ExportConfig::default()
        };
        let ticket = exporter.begin().unwrap();
        let file = ticket
            .export_one(&ctx, &item(1, "pic", png_source(4, 4)), &circle(), &config)
            .unwrap();

        assert_eq!(file.file_name, "shapes-pic-circle.svg");
        assert_eq!(file.mime_type, "image/svg+xml");
        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("href=\"data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_batch_three_images() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let items = vec![
            item(1, "a", png_source(10, 10)),
            item(2, "b", png_source(40, 10)),
            item(3, "c", png_source(10, 40)),
        ];

        let batch = exporter
            .begin()
            .unwrap()
            .export_all(&ctx, items, &circle(), &small_png())
            .await
            .unwrap();

        assert_eq!(batch.archive_name, "anyshape-batch-export.zip");
        assert!(batch.failures.is_empty());
        assert_eq!(
            batch.entries,
            vec![
                "anyshape-a-circle.png",
                "anyshape-b-circle.png",
                "anyshape-c-circle.png"
            ]
        );
        for name in &batch.entries {
            let png = read_entry(&batch.archive, name);
            let decoded = image::load_from_memory(&png).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (256, 256));
        }
        assert!(!exporter.is_busy());
    }

    #[tokio::test]
    async fn test_batch_collects_failures() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let items = vec![
            item(1, "good", png_source(6, 6)),
            item(2, "broken", ImageSource::from_bytes(vec![1, 2, 3, 4])),
            item(3, "fine", png_source(6, 6)),
        ];

        let batch = exporter
            .begin()
            .unwrap()
            .export_all(&ctx, items, &circle(), &small_png())
            .await
            .unwrap();

        assert_eq!(batch.entries, vec!["anyshape-good-circle.png", "anyshape-fine-circle.png"]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].image_name, "broken");
        assert!(matches!(
            batch.failures[0].error,
            ExportError::Render(RenderError::Decode(DecodeError::InvalidFormat))
        ));
    }

    #[tokio::test]
    async fn test_batch_dedupes_names() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let items = vec![
            item(1, "same", png_source(5, 5)),
            item(2, "same", png_source(5, 5)),
            item(3, "same", png_source(5, 5)),
        ];

        let batch = exporter
            .begin()
            .unwrap()
            .export_all(&ctx, items, &circle(), &small_png())
            .await
            .unwrap();
        assert_eq!(
            batch.entries,
            vec![
                "anyshape-same-circle.png",
                "anyshape-same-circle-2.png",
                "anyshape-same-circle-3.png"
            ]
        );
    }

    #[tokio::test]
    async fn test_export_collection() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let mut collection = ImageCollection::new();
        assert!(exporter
            .export_collection(&ctx, &collection, &circle(), &small_png())
            .await
            .unwrap()
            .is_none());

        collection.add("one.png", png_source(5, 5));
        collection.add("two.png", png_source(5, 5));
        let batch = exporter
            .export_collection(&ctx, &collection, &circle(), &small_png())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.entries, vec!["anyshape-one-circle.png", "anyshape-two-circle.png"]);
        assert_eq!(ctx.cache.len(), 2);
    }

    #[test]
    fn test_blocking_batch_matches_entries() {
        let exporter = Exporter::default();
        let ctx = RenderContext::new();
        let mut collection = ImageCollection::new();
        collection.add("x.png", png_source(5, 5));
        collection.add("y.png", png_source(5, 5));
        let config = ExportConfig {
            format: ExportFormat::Svg,
            ..small_png()
        };

        let batch = exporter
            .export_collection_blocking(&ctx, &collection, &circle(), &config)
            .unwrap()
            .unwrap();
        assert_eq!(batch.entries, vec!["anyshape-x-circle.svg", "anyshape-y-circle.svg"]);
        let svg = String::from_utf8(read_entry(&batch.archive, "anyshape-y-circle.svg")).unwrap();
        assert!(svg.contains("width=\"256\""));
        assert!(!exporter.is_busy());
    }
}
