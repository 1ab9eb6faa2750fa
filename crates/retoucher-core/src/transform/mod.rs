//! Geometric transforms.
//!
//! Only quarter-turn rotation is supported; it is the one transform that
//! changes the buffer's dimensions.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Origin is the top-left corner, y grows downwards

mod rotation;

use thiserror::Error;

pub use rotation::{compute_rotated_bounds, rotate, rotate_quarter, QuarterTurn};

/// Errors raised by geometric transforms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The angle is not a multiple of 90 degrees.
    #[error("Unsupported rotation angle: {0} (must be a multiple of 90)")]
    UnsupportedAngle(i32),
}
