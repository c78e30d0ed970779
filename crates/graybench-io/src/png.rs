//! PNG image format support
//!
//! Decoding expands palettes and sub-byte gray to 8 bits, turns a tRNS chunk
//! into an alpha channel and strips 16-bit samples to their high byte, so
//! every PNG arrives as 8-bit gray, gray+alpha, RGB or RGBA.

use crate::{IoError, IoResult};
use graybench_core::{Channels, ImageFormat, Raster};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Raster> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::decode(ImageFormat::Png, e.to_string()))?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };

    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNG output depth: {:?}",
            bit_depth
        )));
    }

    let channels = match color_type {
        ColorType::Grayscale => Channels::Gray,
        ColorType::GrayscaleAlpha => Channels::GrayAlpha,
        ColorType::Rgb => Channels::Rgb,
        ColorType::Rgba => Channels::Rgba,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "indexed PNG was not expanded".to_string(),
            ));
        }
    };

    // Read image data
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::decode(ImageFormat::Png, "output buffer size overflows"))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::decode(ImageFormat::Png, format!("frame: {}", e)))?;

    let mut raster = Raster::new(width, height, channels)?;

    // Rows in the decoder output may be padded past the tight stride
    let bytes_per_row = output_info.line_size;
    let stride = raster.row_stride();
    if bytes_per_row < stride {
        return Err(IoError::invalid(
            ImageFormat::Png,
            format!("row of {} bytes is shorter than {}", bytes_per_row, stride),
        ));
    }
    let data = &buf[..output_info.buffer_size()];
    for y in 0..height {
        let row_start = y as usize * bytes_per_row;
        raster
            .row_mut(y)
            .copy_from_slice(&data[row_start..row_start + stride]);
    }

    Ok(raster)
}

/// Write a PNG image
///
/// Gray, gray+alpha, RGB and RGBA rasters are all written as 8-bit PNGs of
/// the matching color type.
pub fn write_png<W: Write>(raster: &Raster, writer: W) -> IoResult<()> {
    let color_type = match raster.channels() {
        Channels::Gray => ColorType::Grayscale,
        Channels::GrayAlpha => ColorType::GrayscaleAlpha,
        Channels::Rgb => ColorType::Rgb,
        Channels::Rgba => ColorType::Rgba,
    };

    let mut encoder = Encoder::new(writer, raster.width(), raster.height());
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::encode(ImageFormat::Png, format!("header: {}", e)))?;

    writer
        .write_image_data(raster.data())
        .map_err(|e| IoError::encode(ImageFormat::Png, format!("image data: {}", e)))?;

    writer
        .finish()
        .map_err(|e| IoError::encode(ImageFormat::Png, format!("finish: {}", e)))?;

    Ok(())
}
