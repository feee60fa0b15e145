//! Clip regions: a [`ClipShape`] resolved against one output size.
//!
//! Shape paths live in a 0-100 square. For an `S x S` output the path is
//! scaled by `path_scale = S / 100`. The two renderers consume it
//! differently:
//!
//! - The raster backend keeps the path in local units and draws under a
//!   `scale(path_scale)` transform, so border strokes are divided by
//!   `path_scale` ([`ClipRegion::border_local_width`]).
//! - The vector backend writes the path verbatim with a
//!   `transform="scale(path_scale)"` attribute and the same local stroke
//!   width, which renders at the same visual thickness.
//!
//! Clipping always uses the non-zero fill rule.

use kurbo::{BezPath, PathEl};
use tiny_skia::PathBuilder;

use crate::shape::{ClipShape, ShapeError, SHAPE_UNITS};

/// A parsed clip path bound to an output size.
#[derive(Debug, Clone)]
pub struct ClipRegion {
    local: BezPath,
    output_size: f64,
    path_scale: f64,
}

impl ClipRegion {
    /// Parse `shape` once for an `output_size x output_size` canvas.
    pub fn new(shape: &ClipShape, output_size: f64) -> Result<Self, ShapeError> {
        Ok(Self {
            local: shape.to_bez_path()?,
            output_size,
            path_scale: output_size / SHAPE_UNITS,
        })
    }

    /// Multiplier from shape units to output pixels.
    pub fn path_scale(&self) -> f64 {
        self.path_scale
    }

    /// Stroke width in local units that draws `width_px` output pixels
    /// under a `scale(path_scale)` transform.
    pub fn border_local_width(&self, width_px: f64) -> f64 {
        Self::local_stroke_width(width_px, self.output_size)
    }

    /// `width_px / path_scale`, computed as `width_px * 100 / output_size`.
    pub fn local_stroke_width(width_px: f64, output_size: f64) -> f64 {
        width_px * SHAPE_UNITS / output_size
    }

    /// The local path converted for the raster backend.
    ///
    /// Returns `None` when the path has no drawable segments.
    pub fn skia_local_path(&self) -> Option<tiny_skia::Path> {
        to_skia_path(&self.local)
    }
}

/// Convert a `kurbo` path into a `tiny-skia` path.
///
/// SVG arcs were already lowered to cubics by the parser.
pub fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> ClipShape {
        ClipShape::trusted("square", "Square", "M 0 0 L 100 0 L 100 100 L 0 100 Z")
    }

    #[test]
    fn test_path_scale_and_border_widths() {
        let region = ClipRegion::new(&square(), 512.0).unwrap();
        assert_eq!(region.path_scale(), 5.12);
        assert_eq!(region.border_local_width(4.0), 0.78125);

        // Local width under the scaled context is the requested pixel width
        let drawn = region.border_local_width(4.0) * region.path_scale();
        assert!((drawn - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_skia_conversion_keeps_bounds() {
        let circle = ClipShape::trusted(
            "circle",
            "Circle",
            "M 50 0 A 50 50 0 1 1 50 100 A 50 50 0 1 1 50 0 Z",
        );
        let region = ClipRegion::new(&circle, 100.0).unwrap();
        let path = region.skia_local_path().unwrap();
        let b = path.bounds();
        assert!((b.left() - 0.0).abs() < 0.5);
        assert!((b.right() - 100.0).abs() < 0.5);
        assert!((b.top() - 0.0).abs() < 0.5);
        assert!((b.bottom() - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_invalid_path_rejected() {
        let bad = ClipShape::trusted("bad", "Bad", "not a path");
        assert!(ClipRegion::new(&bad, 256.0).is_err());
    }
}
