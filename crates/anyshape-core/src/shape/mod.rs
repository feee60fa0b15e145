//! Clip shapes defined as SVG path data in a 0-100 unit square.
//!
//! The engine treats path data as opaque: it is handed to the raster
//! backend (parsed with `kurbo`) and written verbatim into SVG output.
//! User-authored paths go through [`validate_path`] once, at authoring
//! time; renderers assume they only ever see validated shapes.
//!
//! ## Generators
//!
//! [`generate`] builds regular polygons, stars and freehand outlines for
//! custom shape editors.

pub mod generate;

pub use generate::{
    freehand_path, polygon_path, polygon_vertices, star_path, star_vertices,
    DEFAULT_POLYGON_ROTATION, DEFAULT_STAR_INNER_RATIO, OUTER_RADIUS,
};

use kurbo::{BezPath, ParamCurveArclen};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the square that shape paths are authored in.
pub const SHAPE_UNITS: f64 = 100.0;

/// Arc length accuracy used when validating paths.
const ARCLEN_ACCURACY: f64 = 1e-3;

/// Errors raised when accepting user-authored shapes.
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    /// The path text is empty or whitespace.
    #[error("Invalid clip shape: path is empty")]
    Empty,

    /// The path text could not be parsed as SVG path data.
    #[error("Invalid clip shape: {0}")]
    Parse(String),

    /// The path parsed but has no measurable length.
    #[error("Invalid clip shape: path has zero length")]
    ZeroLength,

    /// A freehand outline needs at least three points.
    #[error("Invalid clip shape: need at least 3 points, got {0}")]
    TooFewPoints(usize),
}

/// A named vector clip shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipShape {
    /// Stable identifier, used in export file names
    pub id: String,
    /// Display name
    pub name: String,
    /// SVG path data in 0-100 space
    pub path: String,
}

impl ClipShape {
    /// Create a shape from user-supplied path data, validating it first.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self, ShapeError> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self::trusted(id, name, path))
    }

    /// Create a shape from path data that is known to be valid (presets).
    pub fn trusted(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Parse the path into a `kurbo` path in 0-100 units.
    pub fn to_bez_path(&self) -> Result<BezPath, ShapeError> {
        parse_path(&self.path)
    }
}

/// Parse SVG path data.
pub fn parse_path(path: &str) -> Result<BezPath, ShapeError> {
    if path.trim().is_empty() {
        return Err(ShapeError::Empty);
    }
    BezPath::from_svg(path).map_err(|e| ShapeError::Parse(e.to_string()))
}

/// Total arc length of a path, in path units.
pub fn path_length(path: &BezPath) -> f64 {
    path.segments().map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum()
}

/// Check that `path` parses and has a non-zero, finite length.
///
/// Returns the computed length on success.
pub fn validate_path(path: &str) -> Result<f64, ShapeError> {
    let bez = parse_path(path)?;
    let length = path_length(&bez);
    if !length.is_finite() || length <= 0.0 {
        return Err(ShapeError::ZeroLength);
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "M 0 0 L 100 0 L 100 100 L 0 100 Z";
    const CIRCLE: &str = "M 50 0 A 50 50 0 1 1 50 100 A 50 50 0 1 1 50 0 Z";

    #[test]
    fn test_validate_square_length() {
        let len = validate_path(SQUARE).unwrap();
        assert!((len - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_circle_with_arcs() {
        let len = validate_path(CIRCLE).unwrap();
        let expected = std::f64::consts::PI * 100.0;
        assert!((len - expected).abs() < 0.5, "got {len}");
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(validate_path(""), Err(ShapeError::Empty));
        assert_eq!(validate_path("   "), Err(ShapeError::Empty));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(matches!(validate_path("hello world"), Err(ShapeError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        assert_eq!(validate_path("M 10 10 Z"), Err(ShapeError::ZeroLength));
        assert_eq!(validate_path("M 10 10 L 10 10"), Err(ShapeError::ZeroLength));
    }

    #[test]
    fn test_clip_shape_new_validates() {
        assert!(ClipShape::new("custom-1", "Box", SQUARE).is_ok());
        assert!(ClipShape::new("custom-2", "Bad", "M 1 1").is_err());
    }

    #[test]
    fn test_trusted_skips_validation() {
        let shape = ClipShape::trusted("circle", "Circle", CIRCLE);
        assert_eq!(shape.id, "circle");
        assert!(shape.to_bez_path().is_ok());
    }
}
