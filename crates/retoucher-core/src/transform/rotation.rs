//! Quarter-turn rotation about the image center.
//!
//! The rotation uses inverse mapping: for each pixel of the output canvas,
//! we find the source pixel whose center lands on it and copy it (nearest
//! neighbour). The canvas is sized to the rotated image, so 90° and 270°
//! swap width and height.
//!
//! Positive angles turn clockwise on screen (y axis pointing down). For a
//! clockwise angle θ, with offsets measured from the canvas centers:
//! ```text
//! src_dx =  dst_dx * cos(θ) + dst_dy * sin(θ)
//! src_dy = -dst_dx * sin(θ) + dst_dy * cos(θ)
//! ```
//! Offsets are kept doubled (`2 * x + 1 - width`) so pixel centers stay on
//! integer coordinates and every quarter turn is exact.

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::buffer::CHANNELS;
use crate::PixelBuffer;

/// A rotation by a whole number of quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuarterTurn {
    /// No rotation.
    #[default]
    None,
    /// 90° clockwise.
    Clockwise,
    /// 180°.
    Half,
    /// 90° counter-clockwise (270° clockwise).
    CounterClockwise,
}

impl QuarterTurn {
    /// Normalize an angle in degrees (any multiple of 90, positive = clockwise).
    ///
    /// # Errors
    ///
    /// Returns `TransformError::UnsupportedAngle` for angles that are not a
    /// multiple of 90°.
    pub fn from_degrees(degrees: i32) -> Result<Self, TransformError> {
        if degrees % 90 != 0 {
            return Err(TransformError::UnsupportedAngle(degrees));
        }
        Ok(match (degrees / 90).rem_euclid(4) {
            0 => QuarterTurn::None,
            1 => QuarterTurn::Clockwise,
            2 => QuarterTurn::Half,
            _ => QuarterTurn::CounterClockwise,
        })
    }

    /// Clockwise angle in degrees, in `0..360`.
    pub fn degrees(self) -> i32 {
        match self {
            QuarterTurn::None => 0,
            QuarterTurn::Clockwise => 90,
            QuarterTurn::Half => 180,
            QuarterTurn::CounterClockwise => 270,
        }
    }

    /// Returns true if this rotation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, QuarterTurn::Clockwise | QuarterTurn::CounterClockwise)
    }

    /// Exact (cos θ, sin θ) for the clockwise angle.
    fn cos_sin(self) -> (i64, i64) {
        match self {
            QuarterTurn::None => (1, 0),
            QuarterTurn::Clockwise => (0, 1),
            QuarterTurn::Half => (-1, 0),
            QuarterTurn::CounterClockwise => (0, -1),
        }
    }
}

/// Dimensions of the canvas holding the rotated image.
pub fn compute_rotated_bounds(width: u32, height: u32, turn: QuarterTurn) -> (u32, u32) {
    if turn.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Rotate an image by `degrees` (a multiple of 90, positive = clockwise).
///
/// # Errors
///
/// Returns `TransformError::UnsupportedAngle` for any other angle.
pub fn rotate(image: &PixelBuffer, degrees: i32) -> Result<PixelBuffer, TransformError> {
    let turn = QuarterTurn::from_degrees(degrees)?;
    Ok(rotate_quarter(image, turn))
}

/// Rotate an image by a quarter turn into a new buffer.
pub fn rotate_quarter(image: &PixelBuffer, turn: QuarterTurn) -> PixelBuffer {
    // Fast path: no rotation needed
    if turn == QuarterTurn::None {
        return image.clone();
    }

    let (src_w, src_h) = (image.width() as i64, image.height() as i64);
    let (dst_w, dst_h) = compute_rotated_bounds(image.width(), image.height(), turn);
    let (cos, sin) = turn.cos_sin();

    let mut output = PixelBuffer::new(dst_w, dst_h);
    let src = image.samples();
    let out = output.samples_mut();

    for dst_y in 0..dst_h as i64 {
        for dst_x in 0..dst_w as i64 {
            // Doubled offsets from the destination center
            let dx = 2 * dst_x + 1 - dst_w as i64;
            let dy = 2 * dst_y + 1 - dst_h as i64;

            // Inverse rotation back into the source, then undo the doubling
            let sx = (dx * cos + dy * sin + src_w - 1) / 2;
            let sy = (-dx * sin + dy * cos + src_h - 1) / 2;

            if sx < 0 || sx >= src_w || sy < 0 || sy >= src_h {
                continue;
            }

            let src_idx = (sy * src_w + sx) as usize * CHANNELS;
            let dst_idx = (dst_y * dst_w as i64 + dst_x) as usize * CHANNELS;
            out[dst_idx..dst_idx + CHANNELS].copy_from_slice(&src[src_idx..src_idx + CHANNELS]);
        }
    }

    output
}


// ============================================================================
// Property-Based Tests
// ============================================================================
