//! JPEG image format support
//!
//! Reads JPEG images with the `jpeg-decoder` crate and writes them with
//! `jpeg-encoder`. Baseline and progressive 8-bit grayscale and RGB are
//! supported; CMYK and 16-bit lossless images are rejected.

use crate::{IoError, IoResult};
use graybench_core::{Channels, ImageFormat, Raster};
use jpeg_decoder::{Decoder, PixelFormat};
use jpeg_encoder::{ColorType, Encoder};
use std::io::{Read, Write};

/// Read a JPEG image from a reader.
///
/// # Returns
/// A single-channel raster for grayscale files, three channels for color.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Raster> {
    let mut decoder = Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::decode(ImageFormat::Jpeg, e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::decode(ImageFormat::Jpeg, "header missing"))?;

    let channels = match info.pixel_format {
        PixelFormat::L8 => Channels::Gray,
        PixelFormat::RGB24 => Channels::Rgb,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported JPEG pixel format: {:?}",
                other
            )));
        }
    };

    let raster = Raster::from_vec(
        u32::from(info.width),
        u32::from(info.height),
        channels,
        pixels,
    )?;
    Ok(raster)
}

/// Write a gray or RGB raster as a baseline JPEG.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] for rasters with alpha, and
/// [`IoError::EncodeError`] for dimensions above 65535 or an invalid quality.
pub fn write_jpeg<W: Write>(raster: &Raster, writer: W, quality: u8) -> IoResult<()> {
    if !(1..=100).contains(&quality) {
        return Err(IoError::encode(
            ImageFormat::Jpeg,
            format!("quality must be in 1..=100, got {}", quality),
        ));
    }

    let color_type = match raster.channels() {
        Channels::Gray => ColorType::Luma,
        Channels::Rgb => ColorType::Rgb,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "cannot write {} channels as JPEG",
                other.count()
            )));
        }
    };

    let width = u16::try_from(raster.width()).map_err(|_| {
        IoError::encode(ImageFormat::Jpeg, format!("width {} exceeds 65535", raster.width()))
    })?;
    let height = u16::try_from(raster.height()).map_err(|_| {
        IoError::encode(ImageFormat::Jpeg, format!("height {} exceeds 65535", raster.height()))
    })?;

    let encoder = Encoder::new(writer, quality);
    encoder
        .encode(raster.data(), width, height, color_type)
        .map_err(|e| IoError::encode(ImageFormat::Jpeg, e.to_string()))?;

    Ok(())
}
