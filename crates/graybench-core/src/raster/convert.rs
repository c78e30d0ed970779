//! RGB(A) to grayscale conversion
//!
//! Two entry points share one formula ([`crate::color::luma`]):
//!
//! - [`sequential_grayscale`] walks the pixels in order on the calling thread
//! - [`parallel_grayscale`] zips the output slots with the input pixels and
//!   hands the pairs to rayon's global pool; every output byte is written by
//!   exactly one worker and the call returns after the join
//!
//! For identical input and rounding mode the two outputs are byte-identical.

use super::{Channels, Raster};
use crate::color::{self, LumaRounding};
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Which conversion path to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrayStrategy {
    /// Single-threaded loop
    Sequential,
    /// Fork/join over the rayon pool
    Parallel,
}

impl GrayStrategy {
    /// Human-readable name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            GrayStrategy::Sequential => "Sequential",
            GrayStrategy::Parallel => "Parallel",
        }
    }
}

/// Check the transform preconditions and return the channel stride.
fn validate(src: &[u8], dst: &[u8], channels: u32) -> Result<usize> {
    if channels < 3 {
        return Err(Error::UnsupportedChannels(channels));
    }
    let c = channels as usize;
    if src.len() % c != 0 {
        return Err(Error::BufferSizeMismatch {
            expected: src.len() - src.len() % c,
            actual: src.len(),
        });
    }
    if dst.len() != src.len() / c {
        return Err(Error::BufferSizeMismatch {
            expected: src.len() / c,
            actual: dst.len(),
        });
    }
    Ok(c)
}

/// Convert interleaved RGB(A) samples to luma on the calling thread.
///
/// `dst[i]` receives the luma of the pixel starting at `src[i * channels]`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedChannels`] if `channels < 3`, and
/// [`Error::BufferSizeMismatch`] if `src` is not a whole number of pixels or
/// `dst` does not hold one byte per pixel.
pub fn sequential_grayscale(
    src: &[u8],
    dst: &mut [u8],
    channels: u32,
    rounding: LumaRounding,
) -> Result<()> {
    let c = validate(src, dst, channels)?;
    for (out, px) in dst.iter_mut().zip(src.chunks_exact(c)) {
        *out = color::luma_of(px, rounding);
    }
    Ok(())
}

/// Convert interleaved RGB(A) samples to luma across the rayon pool.
///
/// Same contract and output as [`sequential_grayscale`].
///
/// # Errors
///
/// See [`sequential_grayscale`].
pub fn parallel_grayscale(
    src: &[u8],
    dst: &mut [u8],
    channels: u32,
    rounding: LumaRounding,
) -> Result<()> {
    let c = validate(src, dst, channels)?;
    dst.par_iter_mut()
        .zip(src.par_chunks_exact(c))
        .for_each(|(out, px)| {
            *out = color::luma_of(px, rounding);
        });
    Ok(())
}

impl Raster {
    /// Convert an RGB or RGBA raster to a new single-channel raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedChannels`] for gray or gray+alpha input.
    pub fn convert_to_gray(&self, strategy: GrayStrategy, rounding: LumaRounding) -> Result<Raster> {
        let mut gray = self.create_template(Channels::Gray);
        self.convert_to_gray_into(&mut gray, strategy, rounding)?;
        Ok(gray)
    }

    /// Convert into a caller-allocated single-channel raster.
    ///
    /// The harness allocates both outputs before timing so that the measured
    /// interval covers the transform only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleSizes`] if `gray` differs in size,
    /// [`Error::InvalidParameter`] if `gray` is not single-channel, and
    /// [`Error::UnsupportedChannels`] for gray or gray+alpha input.
    pub fn convert_to_gray_into(
        &self,
        gray: &mut Raster,
        strategy: GrayStrategy,
        rounding: LumaRounding,
    ) -> Result<()> {
        if !self.channels().has_color() {
            return Err(Error::UnsupportedChannels(self.channels().count()));
        }
        if !self.sizes_equal(gray) {
            return Err(Error::IncompatibleSizes(
                self.width(),
                self.height(),
                gray.width(),
                gray.height(),
            ));
        }
        if gray.channels() != Channels::Gray {
            return Err(Error::InvalidParameter(format!(
                "output must be single-channel, got {} channels",
                gray.channels().count()
            )));
        }
        let channels = self.channels().count();
        match strategy {
            GrayStrategy::Sequential => {
                sequential_grayscale(self.data(), gray.data_mut(), channels, rounding)
            }
            GrayStrategy::Parallel => {
                parallel_grayscale(self.data(), gray.data_mut(), channels, rounding)
            }
        }
    }

    /// Convert to grayscale on the calling thread.
    pub fn to_gray_sequential(&self, rounding: LumaRounding) -> Result<Raster> {
        self.convert_to_gray(GrayStrategy::Sequential, rounding)
    }

    /// Convert to grayscale across the rayon pool.
    pub fn to_gray_parallel(&self, rounding: LumaRounding) -> Result<Raster> {
        self.convert_to_gray(GrayStrategy::Parallel, rounding)
    }
}
