//! Coordinate mapping between preview-space interaction and output pixels.
//!
//! Two directions:
//! - **Interactive**: pointer positions in preview space become translations
//!   by straight delta addition; wheel ticks become fixed zoom factors.
//! - **Export**: a [`Transform`] plus an output size becomes a [`Placement`],
//!   the concrete center/size/rotation/scale used by both renderers.
//!
//! # Resolution Independence
//!
//! Translation is stored in preview units and multiplied by
//! `output_size / reference_size` at render time, and the base image width
//! is always the full output width. So [`Placement::normalized`] is the same
//! for every output size, including the live preview's rendered size.

use crate::transform::Transform;

/// Side length of the preview square that translations are measured in.
pub const PREVIEW_REFERENCE_SIZE: f64 = 400.0;

/// Scale multiplier for one "zoom in" wheel tick.
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Scale multiplier for one "zoom out" wheel tick.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// A point in preview-space units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Zoom factor for a wheel event: positive `delta_y` (scrolling down) zooms out.
#[inline]
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    if delta_y > 0.0 {
        ZOOM_OUT_FACTOR
    } else {
        ZOOM_IN_FACTOR
    }
}

/// The on-screen preview square.
///
/// Client pointer coordinates are in rendered pixels; the model works in
/// reference units. At the reference size the conversion is the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSurface {
    /// Rendered side length in client pixels
    pub rendered_size: f64,
    /// Side length of preview space
    pub reference_size: f64,
}

impl Default for PreviewSurface {
    fn default() -> Self {
        Self::new(PREVIEW_REFERENCE_SIZE)
    }
}

impl PreviewSurface {
    /// A surface rendered at `rendered_size` client pixels.
    ///
    /// Non-positive sizes fall back to the reference size.
    pub fn new(rendered_size: f64) -> Self {
        let rendered_size = if rendered_size.is_finite() && rendered_size > 0.0 {
            rendered_size
        } else {
            PREVIEW_REFERENCE_SIZE
        };
        Self {
            rendered_size,
            reference_size: PREVIEW_REFERENCE_SIZE,
        }
    }

    /// Convert a client-pixel point into preview-space units.
    pub fn to_preview(&self, client_x: f64, client_y: f64) -> Point {
        let k = self.reference_size / self.rendered_size;
        Point::new(client_x * k, client_y * k)
    }

    /// Integer pixel size to render the live preview at.
    pub fn pixel_size(&self) -> u32 {
        (self.rendered_size.floor() as u32).max(1)
    }
}

/// An in-flight drag gesture.
///
/// Stores the pointer-down position relative to the translation at that
/// moment, so every later pointer position maps to a translation by
/// plain subtraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    anchor: Point,
    start: Point,
}

impl DragSession {
    /// Begin a drag at `pointer` over an image currently placed by `transform`.
    pub fn begin(pointer: Point, transform: &Transform) -> Self {
        Self {
            anchor: Point::new(
                pointer.x - transform.translate_x,
                pointer.y - transform.translate_y,
            ),
            start: pointer,
        }
    }

    /// Translation for the pointer at `pointer`.
    pub fn translation_at(&self, pointer: Point) -> (f64, f64) {
        (pointer.x - self.anchor.x, pointer.y - self.anchor.y)
    }

    /// Apply the drag to `transform`, keeping every non-translation field.
    pub fn apply(&self, transform: Transform, pointer: Point) -> Transform {
        let (x, y) = self.translation_at(pointer);
        transform.with_translation(x, y)
    }

    /// Position where the drag began.
    pub fn start(&self) -> Point {
        self.start
    }
}

/// Concrete drawing parameters for one image at one output size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Output side length in pixels
    pub output_size: f64,
    /// Image center in output pixels
    pub center_x: f64,
    pub center_y: f64,
    /// Unscaled draw width (always the full output width)
    pub base_width: f64,
    /// Unscaled draw height (aspect-preserving)
    pub base_height: f64,
    /// Rotation in degrees
    pub rotation: f64,
    /// Signed per-axis scale (negative when mirrored)
    pub scale_x: f64,
    pub scale_y: f64,
}

/// A [`Placement`] with every length divided by the output size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPlacement {
    pub center_x: f64,
    pub center_y: f64,
    pub base_width: f64,
    pub base_height: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Placement {
    /// Map `transform` onto a square output of `output_size` pixels.
    ///
    /// # Arguments
    ///
    /// * `transform` - Placement in preview units
    /// * `output_size` - Side of the output square (export size or rendered preview size)
    /// * `natural_width`, `natural_height` - Decoded image dimensions
    /// * `reference_size` - Side of preview space, normally [`PREVIEW_REFERENCE_SIZE`]
    pub fn compute(
        transform: &Transform,
        output_size: f64,
        natural_width: u32,
        natural_height: u32,
        reference_size: f64,
    ) -> Self {
        let scale_factor = output_size / reference_size;
        let aspect = if natural_width == 0 {
            1.0
        } else {
            natural_height as f64 / natural_width as f64
        };
        let (scale_x, scale_y) = transform.signed_scale();

        Self {
            output_size,
            center_x: output_size / 2.0 + transform.translate_x * scale_factor,
            center_y: output_size / 2.0 + transform.translate_y * scale_factor,
            base_width: output_size,
            base_height: output_size * aspect,
            rotation: transform.rotation,
            scale_x,
            scale_y,
        }
    }

    /// Resolution-free form of this placement.
    pub fn normalized(&self) -> NormalizedPlacement {
        let s = self.output_size;
        NormalizedPlacement {
            center_x: self.center_x / s,
            center_y: self.center_y / s,
            base_width: self.base_width / s,
            base_height: self.base_height / s,
            rotation: self.rotation,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
