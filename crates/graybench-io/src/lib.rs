//! graybench-io - Image I/O for the grayscale benchmark
//!
//! Decodes any supported input format into a [`Raster`] with the channel
//! count found in the file, and encodes rasters back out.
//!
//! | format | read | write | feature |
//! |---|---|---|---|
//! | PNG | all color types, 1-16 bit | 1-4 channels, 8 bit | `png-format` |
//! | JPEG | gray, RGB | gray, RGB | `jpeg` |
//! | BMP | 1/4/8-bit palette, 24, 32 bit | gray, RGB, RGBA | `bmp` |
//! | PNM | P5, P6 | P5, P6 | `pnm` |
//! | TGA | raw and RLE, color-mapped, 8-32 bit | 1-4 channels | `tga` |

pub mod error;
pub mod format;

#[cfg(feature = "bmp")]
pub mod bmp;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;
#[cfg(feature = "tga")]
pub mod tga;

pub use error::{IoError, IoResult};
pub use format::{OutputTarget, detect_format, detect_format_from_bytes, select_output};
pub use graybench_core::{ImageFormat, Raster};

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tracing::debug;

/// Encoder settings that are not implied by the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// JPEG quality, 1..=100
    pub jpeg_quality: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { jpeg_quality: 100 }
    }
}

/// Read an image from a file path, detecting the format.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be read,
/// [`IoError::UnsupportedFormat`] if the format is unknown or its feature is
/// disabled, [`IoError::Truncated`] if the header describes more pixel data
/// than the file holds, and a decode error if the data is corrupt.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Raster> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(IoError::Io)?;
    let format = detect_format(path, &data)?;
    debug!(path = %path.display(), ?format, bytes = data.len(), "decoding image");
    read_image_format(&data, format)
}

/// Read an image from memory, detecting the format from magic bytes.
pub fn read_image_mem(data: &[u8]) -> IoResult<Raster> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(data, format)
}

/// Decode `data` with the decoder for `format`.
pub fn read_image_format(data: &[u8], format: ImageFormat) -> IoResult<Raster> {
    let cursor = Cursor::new(data);
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::read_bmp(cursor),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(cursor),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(cursor),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(cursor),
        #[cfg(feature = "tga")]
        ImageFormat::Tga => tga::read_tga(cursor),
        _ => Err(IoError::UnsupportedFormat(format!(
            "no decoder for {:?}",
            format
        ))),
    }
}

/// Write an image to a file path with default options.
pub fn write_image<P: AsRef<Path>>(raster: &Raster, path: P, format: ImageFormat) -> IoResult<()> {
    write_image_with(raster, path, format, &WriteOptions::default())
}

/// Write an image to a file path.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be created or written, and
/// [`IoError::UnsupportedFormat`] if the format cannot encode this raster.
pub fn write_image_with<P: AsRef<Path>>(
    raster: &Raster,
    path: P,
    format: ImageFormat,
    options: &WriteOptions,
) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(IoError::Io)?;
    let mut writer = BufWriter::new(file);
    write_image_to(raster, &mut writer, format, options)?;
    writer.flush().map_err(IoError::Io)?;
    debug!(path = %path.display(), ?format, "wrote image");
    Ok(())
}

/// Encode an image into memory.
pub fn write_image_mem(raster: &Raster, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_image_to(raster, &mut buffer, format, &WriteOptions::default())?;
    Ok(buffer)
}

#[cfg_attr(not(feature = "jpeg"), allow(unused_variables))]
fn write_image_to<W: Write>(
    raster: &Raster,
    writer: W,
    format: ImageFormat,
    options: &WriteOptions,
) -> IoResult<()> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::write_bmp(raster, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(raster, writer, options.jpeg_quality),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(raster, writer),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(raster, writer),
        #[cfg(feature = "tga")]
        ImageFormat::Tga => tga::write_tga(raster, writer),
        _ => Err(IoError::UnsupportedFormat(format!(
            "no encoder for {:?}",
            format
        ))),
    }
}
