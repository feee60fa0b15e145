//! Shape generator and validation bindings.
//!
//! All paths are SVG path data in the 0-100 shape square.

use anyshape_core::shape;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// A freehand point as sent from JavaScript: `{ x, y }` in shape units.
#[derive(Debug, Clone, Copy, Deserialize)]
struct JsPoint {
    x: f64,
    y: f64,
}

/// Regular polygon with `sides` (clamped to 3-12) and a rotation in degrees.
#[wasm_bindgen]
pub fn polygon_path(sides: u32, rotation_degrees: f64) -> String {
    shape::polygon_path(sides, rotation_degrees)
}

/// Star with `points` tips (clamped to 3-12) and an inner radius ratio
/// (clamped to 0.1-0.9).
#[wasm_bindgen]
pub fn star_path(points: u32, inner_ratio: f64) -> String {
    shape::star_path(points, inner_ratio)
}

/// Closed path through freehand points given as a flat `[x0, y0, x1, y1, ...]`
/// array in shape units.
///
/// # Errors
///
/// Returns an error for an odd number of coordinates or fewer than three
/// points.
#[wasm_bindgen]
pub fn freehand_path(coords: &[f64]) -> Result<String, JsValue> {
    let points = coordinate_pairs(coords).map_err(|e| JsValue::from_str(&e))?;
    shape::freehand_path(&points).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Closed path through an array of `{ x, y }` objects.
///
/// # Errors
///
/// Returns an error if the value is not an array of points or has fewer
/// than three of them.
#[wasm_bindgen]
pub fn freehand_path_from_points(points: JsValue) -> Result<String, JsValue> {
    let points: Vec<JsPoint> = serde_wasm_bindgen::from_value(points)
        .map_err(|e| JsValue::from_str(&format!("Invalid points: {}", e)))?;
    let points: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
    shape::freehand_path(&points).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn coordinate_pairs(coords: &[f64]) -> Result<Vec<(f64, f64)>, String> {
    if coords.len() % 2 != 0 {
        return Err(format!(
            "Expected x/y pairs, got {} coordinates",
            coords.len()
        ));
    }
    Ok(coords.chunks_exact(2).map(|c| (c[0], c[1])).collect())
}

/// Validate user path data and return its length in shape units.
///
/// # Errors
///
/// Returns an error if the path is empty, unparseable or has zero length.
#[wasm_bindgen]
pub fn validate_path(path: &str) -> Result<f64, JsValue> {
    shape::validate_path(path).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_freehand_from_flat_coords() {
        let path = freehand_path(&[10.0, 10.0, 90.0, 10.0, 50.0, 80.0]).unwrap();
        assert_eq!(path, "M 10.00 10.00 L 90.00 10.00 L 50.00 80.00 Z");
    }

    #[wasm_bindgen_test]
    fn test_freehand_too_few_points() {
        assert!(freehand_path(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_freehand_rejects_odd_coordinate_count() {
        assert!(freehand_path(&[10.0, 10.0, 90.0, 10.0, 50.0, 80.0, 20.0]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_freehand_from_objects() {
        let points = js_sys::Array::new();
        for (x, y) in [(10.0, 10.0), (90.0, 10.0), (50.0, 80.0)] {
            let point = js_sys::Object::new();
            js_sys::Reflect::set(&point, &"x".into(), &x.into()).unwrap();
            js_sys::Reflect::set(&point, &"y".into(), &y.into()).unwrap();
            points.push(&point);
        }
        let path = freehand_path_from_points(points.into()).unwrap();
        assert_eq!(path, "M 10.00 10.00 L 90.00 10.00 L 50.00 80.00 Z");
    }

    #[wasm_bindgen_test]
    fn test_freehand_from_non_array() {
        assert!(freehand_path_from_points(JsValue::from_f64(42.0)).is_err());
    }

    #[wasm_bindgen_test]
    fn test_validate_rejects_garbage() {
        assert!(validate_path("not a path").is_err());
        assert!(validate_path("M 0 0 L 100 0 L 100 100 Z").unwrap() > 0.0);
    }
}
