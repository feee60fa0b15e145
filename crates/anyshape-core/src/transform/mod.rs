//! Per-image placement transform and its undo/redo history.
//!
//! A [`Transform`] describes how one image sits inside the clip shape:
//! uniform scale, translation in preview-space units, rotation in degrees
//! and mirroring on either axis. Values are immutable; every gesture
//! produces a new `Transform`.
//!
//! # Coordinate System
//!
//! - Translation is measured in preview-space units, where the preview is a
//!   square of [`PREVIEW_REFERENCE_SIZE`](crate::PREVIEW_REFERENCE_SIZE) units.
//! - Rotation is in degrees, positive = clockwise on screen (y axis down).
//! - Scale 1.0 draws the image at the full width of the output square.
//!
//! # Clamping
//!
//! Nothing here fails. Out-of-range inputs are clamped:
//! - scale to [`MIN_SCALE`, `MAX_SCALE`]
//! - rotation to [`MIN_ROTATION`, `MAX_ROTATION`]

mod history;

pub use history::TransformHistory;

use serde::{Deserialize, Serialize};

/// Smallest scale reachable by any gesture or setter.
pub const MIN_SCALE: f64 = 0.1;
/// Largest scale reachable by any gesture or setter.
pub const MAX_SCALE: f64 = 5.0;
/// Upper bound of the scale slider. UIs may offer a narrower range than the model.
pub const SLIDER_MAX_SCALE: f64 = 3.0;
/// Rotation lower bound in degrees.
pub const MIN_ROTATION: f64 = -180.0;
/// Rotation upper bound in degrees.
pub const MAX_ROTATION: f64 = 180.0;

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Mirror left/right.
    Horizontal,
    /// Mirror top/bottom.
    Vertical,
}

/// Placement of one image inside the clip shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Uniform scale (always > 0)
    pub scale: f64,
    /// Horizontal offset from the center, in preview-space units
    pub translate_x: f64,
    /// Vertical offset from the center, in preview-space units
    pub translate_y: f64,
    /// Rotation in degrees (-180 to 180)
    pub rotation: f64,
    /// Mirror left/right
    pub flip_horizontal: bool,
    /// Mirror top/bottom
    pub flip_vertical: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The untouched placement: full width, centered, upright, not mirrored.
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        rotation: 0.0,
        flip_horizontal: false,
        flip_vertical: false,
    };

    /// Check if this is the identity placement
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Move by a delta in preview-space units.
    pub fn panned(self, dx: f64, dy: f64) -> Self {
        self.with_translation(self.translate_x + dx, self.translate_y + dy)
    }

    /// Set the translation directly.
    pub fn with_translation(self, x: f64, y: f64) -> Self {
        Self {
            translate_x: finite_or(x, self.translate_x),
            translate_y: finite_or(y, self.translate_y),
            ..self
        }
    }

    /// Multiply the scale by `factor`, clamped to [`MIN_SCALE`, `MAX_SCALE`].
    pub fn zoomed(self, factor: f64) -> Self {
        self.with_scale(self.scale * factor)
    }

    /// Set an absolute scale, clamped to [`MIN_SCALE`, `MAX_SCALE`].
    pub fn with_scale(self, scale: f64) -> Self {
        Self {
            scale: clamp_scale(scale),
            ..self
        }
    }

    /// Set an absolute rotation in degrees, clamped to [-180, 180].
    pub fn with_rotation(self, degrees: f64) -> Self {
        let rotation = if degrees.is_finite() {
            degrees.clamp(MIN_ROTATION, MAX_ROTATION)
        } else {
            self.rotation
        };
        Self { rotation, ..self }
    }

    /// Toggle mirroring on one axis.
    pub fn flipped(self, axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self {
                flip_horizontal: !self.flip_horizontal,
                ..self
            },
            Axis::Vertical => Self {
                flip_vertical: !self.flip_vertical,
                ..self
            },
        }
    }

    /// Signed per-axis draw scale: `scale`, negated on mirrored axes.
    pub fn signed_scale(&self) -> (f64, f64) {
        let sx = if self.flip_horizontal { -self.scale } else { self.scale };
        let sy = if self.flip_vertical { -self.scale } else { self.scale };
        (sx, sy)
    }
}

/// Clamp a scale value into the model's valid range.
///
/// NaN and non-positive values collapse to [`MIN_SCALE`].
#[inline]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() || scale <= 0.0 {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[inline]
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
