//! Parametric shape generators.
//!
//! All generators work in the 0-100 shape square, centered at (50, 50)
//! with an outer radius of [`OUTER_RADIUS`]. Coordinates are written with
//! two decimals.

use std::f64::consts::PI;
use std::fmt::Write as _;

use super::ShapeError;

/// Radius of polygon and star outer vertices.
pub const OUTER_RADIUS: f64 = 45.0;

/// Default polygon start angle in degrees (first vertex at the top).
pub const DEFAULT_POLYGON_ROTATION: f64 = -90.0;

/// Default star inner radius as a fraction of the outer radius.
pub const DEFAULT_STAR_INNER_RATIO: f64 = 0.4;

const CENTER: f64 = 50.0;
const MIN_SIDES: u32 = 3;
const MAX_SIDES: u32 = 12;
const MIN_INNER_RATIO: f64 = 0.1;
const MAX_INNER_RATIO: f64 = 0.9;

/// Vertices of a regular polygon.
///
/// `sides` is clamped to 3..=12; `rotation_degrees` is the angle of the
/// first vertex, measured clockwise from +x.
pub fn polygon_vertices(sides: u32, rotation_degrees: f64) -> Vec<(f64, f64)> {
    let sides = sides.clamp(MIN_SIDES, MAX_SIDES);
    let step = 2.0 * PI / sides as f64;
    let start = rotation_degrees.to_radians();

    (0..sides)
        .map(|i| {
            let angle = start + i as f64 * step;
            (
                CENTER + OUTER_RADIUS * angle.cos(),
                CENTER + OUTER_RADIUS * angle.sin(),
            )
        })
        .collect()
}

/// Vertices of a star, alternating outer and inner radius, starting at the top.
///
/// `points` is clamped to 3..=12 and `inner_ratio` to 0.1..=0.9.
pub fn star_vertices(points: u32, inner_ratio: f64) -> Vec<(f64, f64)> {
    let points = points.clamp(MIN_SIDES, MAX_SIDES);
    let inner_ratio = if inner_ratio.is_finite() {
        inner_ratio.clamp(MIN_INNER_RATIO, MAX_INNER_RATIO)
    } else {
        DEFAULT_STAR_INNER_RATIO
    };
    let inner = OUTER_RADIUS * inner_ratio;
    let step = PI / points as f64;
    let start = -PI / 2.0;

    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { OUTER_RADIUS } else { inner };
            let angle = start + i as f64 * step;
            (CENTER + radius * angle.cos(), CENTER + radius * angle.sin())
        })
        .collect()
}

/// Path data for a regular polygon.
pub fn polygon_path(sides: u32, rotation_degrees: f64) -> String {
    closed_path(&polygon_vertices(sides, rotation_degrees))
}

/// Path data for a star.
pub fn star_path(points: u32, inner_ratio: f64) -> String {
    closed_path(&star_vertices(points, inner_ratio))
}

/// Path data for a freehand outline captured as points in 0-100 space.
pub fn freehand_path(points: &[(f64, f64)]) -> Result<String, ShapeError> {
    if points.len() < 3 {
        return Err(ShapeError::TooFewPoints(points.len()));
    }
    Ok(closed_path(points))
}

fn closed_path(points: &[(f64, f64)]) -> String {
    let mut out = String::with_capacity(points.len() * 16);
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        // Writing to a String cannot fail
        let _ = write!(out, "{cmd} {x:.2} {y:.2}");
    }
    out.push_str(" Z");
    out
}


// ============================================================================
// Property-Based Tests
// ============================================================================
