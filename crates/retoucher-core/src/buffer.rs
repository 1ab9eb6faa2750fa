//! RGBA raster buffer shared by every editing operation.

use thiserror::Error;

/// Number of samples stored per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// A single RGBA pixel.
pub type Rgba = [u8; 4];

/// Errors raised by pixel buffer construction and access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// A pixel coordinate fell outside the buffer.
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The sample vector length doesn't match the dimensions.
    #[error("Invalid sample data: expected {expected} bytes (width * height * 4), got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Width or height overflows the addressable sample count.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// A width x height grid of RGBA samples.
///
/// Samples are stored row-major from the top-left corner, 4 bytes per pixel
/// in R, G, B, A order. The sample count always equals `width * height * 4`.
///
/// Transforms never mutate their input; they either build a new buffer or
/// clone before editing in place. `Clone` is the "copy from" operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = sample_len(width, height);
        Self {
            width,
            height,
            samples: vec![0; len],
        }
    }

    /// Create a buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut buffer = Self::new(width, height);
        for chunk in buffer.samples.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&color);
        }
        buffer
    }

    /// Wrap existing RGBA samples, validating their length.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, BufferError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(BufferError::InvalidDimensions { width, height })?;

        if samples.len() != expected {
            return Err(BufferError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Create a PixelBuffer from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            samples: img.into_raw(),
        }
    }

    /// Convert to an `image::RgbaImage` for codec and resampling work.
    ///
    /// Clones the sample data.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.samples.clone())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA samples, row-major.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.samples
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the size of the sample buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if `other` has the same width and height.
    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Read the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Result<Rgba, BufferError> {
        let idx = self.index_of(x, y)?;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.samples[idx..idx + CHANNELS]);
        Ok(px)
    }

    /// Overwrite the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) -> Result<(), BufferError> {
        let idx = self.index_of(x, y)?;
        self.samples[idx..idx + CHANNELS].copy_from_slice(&color);
        Ok(())
    }

    /// Sample offset of pixel (x, y), bounds checked.
    #[inline]
    pub(crate) fn index_of(&self, x: u32, y: u32) -> Result<usize, BufferError> {
        if x >= self.width || y >= self.height {
            return Err(BufferError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize * self.width as usize + x as usize) * CHANNELS)
    }
}

#[inline]
fn sample_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

/// Round a computed channel value to the nearest integer (ties to even) and
/// saturate it into 0..=255.
#[inline]
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round_ties_even().clamp(0.0, 255.0) as u8
}
