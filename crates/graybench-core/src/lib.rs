//! graybench core - Raster buffers and grayscale transforms
//!
//! This crate provides the data structures and the pixel transform used by
//! the graybench harness:
//!
//! - [`Raster`] - Decoded, channel-interleaved 8-bit image buffer
//! - [`Channels`] - Samples per pixel (gray, gray+alpha, RGB, RGBA)
//! - [`ImageFormat`] - Image file formats known to the I/O layer
//! - [`sequential_grayscale`] / [`parallel_grayscale`] - The luma transform
//!   on one thread and fanned out over the rayon pool
//!
//! # Example
//!
//! ```
//! use graybench_core::{Channels, LumaRounding, Raster};
//!
//! let rgb = Raster::from_vec(1, 1, Channels::Rgb, vec![100, 150, 50]).unwrap();
//! let gray = rgb.to_gray_sequential(LumaRounding::Truncate).unwrap();
//! assert_eq!(gray.data(), &[123]);
//! ```

pub mod error;
pub mod raster;

pub use error::{Error, Result};
pub use raster::convert::{GrayStrategy, parallel_grayscale, sequential_grayscale};
pub use raster::{Channels, ImageFormat, Raster};

/// Luma weights and the per-pixel formula.
///
/// The weights are the ITU-R BT.601 coefficients truncated to four digits.
/// They sum to 0.9999, so a white pixel produces 254.97 before narrowing.
pub mod color {
    /// Red channel index within a pixel
    pub const RED: usize = 0;
    /// Green channel index within a pixel
    pub const GREEN: usize = 1;
    /// Blue channel index within a pixel
    pub const BLUE: usize = 2;
    /// Alpha channel index within an RGBA pixel
    pub const ALPHA: usize = 3;

    /// Weight applied to the red sample
    pub const RED_WEIGHT: f64 = 0.2989;
    /// Weight applied to the green sample
    pub const GREEN_WEIGHT: f64 = 0.5870;
    /// Weight applied to the blue sample
    pub const BLUE_WEIGHT: f64 = 0.1140;

    /// How the floating-point luma is narrowed to 8 bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum LumaRounding {
        /// Drop the fractional part (`as u8` cast)
        #[default]
        Truncate,
        /// Round to the nearest integer, halves away from zero
        Nearest,
    }

    /// Weighted sum of the three color samples, before narrowing.
    #[inline]
    pub fn luma_f64(r: u8, g: u8, b: u8) -> f64 {
        RED_WEIGHT * f64::from(r) + GREEN_WEIGHT * f64::from(g) + BLUE_WEIGHT * f64::from(b)
    }

    /// Compute the 8-bit luma of one pixel.
    ///
    /// The weighted sum never exceeds 254.97, so the narrowing cast needs no
    /// clamp in either rounding mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use graybench_core::color::{LumaRounding, luma};
    ///
    /// assert_eq!(luma(100, 150, 50, LumaRounding::Truncate), 123);
    /// assert_eq!(luma(255, 255, 255, LumaRounding::Truncate), 254);
    /// assert_eq!(luma(255, 255, 255, LumaRounding::Nearest), 255);
    /// ```
    #[inline]
    pub fn luma(r: u8, g: u8, b: u8, rounding: LumaRounding) -> u8 {
        let y = luma_f64(r, g, b);
        match rounding {
            LumaRounding::Truncate => y as u8,
            LumaRounding::Nearest => y.round() as u8,
        }
    }

    /// Compute the luma of a pixel given as an interleaved sample slice.
    ///
    /// Only the first three samples are read; alpha is ignored.
    #[inline]
    pub fn luma_of(samples: &[u8], rounding: LumaRounding) -> u8 {
        luma(samples[RED], samples[GREEN], samples[BLUE], rounding)
    }
}

pub use color::LumaRounding;
