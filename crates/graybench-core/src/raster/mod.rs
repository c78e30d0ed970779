//! Raster - The decoded image container
//!
//! A `Raster` owns a row-major, channel-interleaved buffer of 8-bit samples.
//! The decoder produces one with the channel count found in the file, and the
//! grayscale transforms produce single-channel ones of the same size.
//!
//! # Sample layout
//!
//! - Rows are tightly packed, no padding between them
//! - Pixel `(x, y)` starts at `(y * width + x) * channels`
//! - RGB(A) samples are stored in R, G, B, A order

pub mod convert;

use crate::error::{Error, Result};

/// Samples per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Channels {
    /// Single luminance sample
    Gray = 1,
    /// Luminance plus alpha
    GrayAlpha = 2,
    /// Red, green, blue
    Rgb = 3,
    /// Red, green, blue, alpha
    Rgba = 4,
}

impl Channels {
    /// Create `Channels` from a raw sample count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannels`] if `count` is not 1, 2, 3 or 4.
    pub fn from_count(count: u32) -> Result<Self> {
        match count {
            1 => Ok(Channels::Gray),
            2 => Ok(Channels::GrayAlpha),
            3 => Ok(Channels::Rgb),
            4 => Ok(Channels::Rgba),
            _ => Err(Error::InvalidChannels(count)),
        }
    }

    /// Number of samples per pixel.
    pub fn count(self) -> u32 {
        self as u32
    }

    /// Whether the pixel carries red, green and blue samples.
    pub fn has_color(self) -> bool {
        matches!(self, Channels::Rgb | Channels::Rgba)
    }
}

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Unknown format
    #[default]
    Unknown,
    /// Windows bitmap
    Bmp,
    /// JFIF JPEG
    Jpeg,
    /// Portable Network Graphics
    Png,
    /// Binary portable graymap / pixmap
    Pnm,
    /// Truevision TGA
    Tga,
}

impl ImageFormat {
    /// Get the canonical file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Pnm => "pnm",
            Self::Tga => "tga",
        }
    }

    /// Look up a format by file extension, ignoring ASCII case.
    ///
    /// Returns [`ImageFormat::Unknown`] for anything unrecognized.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "bmp" => Self::Bmp,
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "pnm" | "pgm" | "ppm" => Self::Pnm,
            "tga" => Self::Tga,
            _ => Self::Unknown,
        }
    }
}

/// Raster - Owned 8-bit image buffer
///
/// # Examples
///
/// ```
/// use graybench_core::{Channels, Raster};
///
/// let raster = Raster::new(640, 480, Channels::Rgb).unwrap();
/// assert_eq!(raster.width(), 640);
/// assert_eq!(raster.data().len(), 640 * 480 * 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl Raster {
    /// Create a zero-filled raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self> {
        let len = Self::buffer_len(width, height, channels)?;
        Ok(Raster {
            width,
            height,
            channels,
            data: vec![0u8; len],
        })
    }

    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0, and
    /// [`Error::BufferSizeMismatch`] if `data` does not hold exactly
    /// `width * height * channels` samples.
    pub fn from_vec(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Result<Self> {
        let expected = Self::buffer_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Raster {
            width,
            height,
            channels,
            data,
        })
    }

    /// Create a raster of the same size with a different channel layout.
    pub fn create_template(&self, channels: Channels) -> Self {
        Raster {
            width: self.width,
            height: self.height,
            channels,
            data: vec![0u8; self.pixel_count() * channels.count() as usize],
        }
    }

    fn buffer_len(width: u32, height: u32, channels: Channels) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels.count() as usize))
            .ok_or(Error::InvalidDimension { width, height })
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the channel layout.
    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes per row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channels.count() as usize
    }

    /// Get the raw samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the raw samples mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the raster and return its sample buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Samples of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Samples of one row, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Samples of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels.count() as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        Some(&self.data[start..start + c])
    }

    /// Overwrite the samples of the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the coordinates are out of
    /// bounds, and [`Error::BufferSizeMismatch`] if `samples` does not hold
    /// one sample per channel.
    pub fn set_pixel(&mut self, x: u32, y: u32, samples: &[u8]) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::InvalidParameter(format!(
                "pixel ({}, {}) outside {}x{}",
                x, y, self.width, self.height
            )));
        }
        let c = self.channels.count() as usize;
        if samples.len() != c {
            return Err(Error::BufferSizeMismatch {
                expected: c,
                actual: samples.len(),
            });
        }
        let start = (y as usize * self.width as usize + x as usize) * c;
        self.data[start..start + c].copy_from_slice(samples);
        Ok(())
    }

    /// Check whether two rasters have the same width and height.
    pub fn sizes_equal(&self, other: &Raster) -> bool {
        self.width == other.width && self.height == other.height
    }
}
