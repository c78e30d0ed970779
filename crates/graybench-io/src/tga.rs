//! TGA (Truevision) image format support
//!
//! Decoding and encoding go through the `image` crate's TGA codec, which
//! handles run-length packets, color maps and both origins. Written files
//! get the TGA 2.0 footer so they are recognized without the extension.

use crate::{IoError, IoResult};
use graybench_core::{Channels, ImageFormat, Raster};
use image::codecs::tga::{TgaDecoder, TgaEncoder};
use image::{ColorType, ExtendedColorType, ImageDecoder, ImageEncoder};
use std::io::{Cursor, Read, Write};

/// TGA header size
const TGA_HEADER_SIZE: usize = 18;

/// TGA 2.0 footer: extension and developer area offsets, then the signature
const TGA_FOOTER: &[u8] = b"\0\0\0\0\0\0\0\0TRUEVISION-XFILE.\0";

/// Image type bit shared by the run-length encoded variants (9, 10, 11)
const RLE_BIT: u8 = 0x08;

/// Pixels covered by one run-length packet at most
const MAX_RUN: u64 = 128;

/// Reject headers that describe more pixels than the file could hold.
///
/// The smallest possible encoding is used for the bound: raw images need
/// every pixel, run-length images one packet per 128 pixels.
fn check_pixel_data(data: &[u8]) -> IoResult<()> {
    let available = data.len() as u64;
    IoError::check_available(ImageFormat::Tga, TGA_HEADER_SIZE as u64, available)?;

    let le16 = |at: usize| u64::from(u16::from_le_bytes([data[at], data[at + 1]]));
    let id_length = u64::from(data[0]);
    let colormap_bytes = if data[1] == 1 {
        le16(5) * u64::from(data[7]).div_ceil(8)
    } else {
        0
    };
    let pixels = le16(12) * le16(14);
    let pixel_bytes = u64::from(data[16]).div_ceil(8).max(1);

    let body = if data[2] & RLE_BIT != 0 {
        pixels.div_ceil(MAX_RUN) * (1 + pixel_bytes)
    } else {
        pixels * pixel_bytes
    };
    let needed = TGA_HEADER_SIZE as u64 + id_length + colormap_bytes + body;
    IoError::check_available(ImageFormat::Tga, needed, available)
}

fn decode_error(err: image::ImageError) -> IoError {
    IoError::decode(ImageFormat::Tga, err.to_string())
}

/// Read a TGA image
pub fn read_tga<R: Read>(mut reader: R) -> IoResult<Raster> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    check_pixel_data(&data)?;

    let decoder = TgaDecoder::new(Cursor::new(data.as_slice())).map_err(decode_error)?;
    let (width, height) = decoder.dimensions();
    let channels = match decoder.color_type() {
        ColorType::L8 => Channels::Gray,
        ColorType::La8 => Channels::GrayAlpha,
        ColorType::Rgb8 => Channels::Rgb,
        ColorType::Rgba8 => Channels::Rgba,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TGA color type: {:?}",
                other
            )));
        }
    };

    let mut raster = Raster::new(width, height, channels)?;
    if decoder.total_bytes() != raster.data().len() as u64 {
        return Err(IoError::decode(
            ImageFormat::Tga,
            format!(
                "decoder reports {} bytes for a {}x{} raster",
                decoder.total_bytes(),
                width,
                height
            ),
        ));
    }
    decoder
        .read_image(raster.data_mut())
        .map_err(decode_error)?;
    Ok(raster)
}

/// Write a TGA image
pub fn write_tga<W: Write>(raster: &Raster, mut writer: W) -> IoResult<()> {
    let color = match raster.channels() {
        Channels::Gray => ExtendedColorType::L8,
        Channels::GrayAlpha => ExtendedColorType::La8,
        Channels::Rgb => ExtendedColorType::Rgb8,
        Channels::Rgba => ExtendedColorType::Rgba8,
    };

    let mut encoded = Vec::new();
    TgaEncoder::new(&mut encoded)
        .write_image(raster.data(), raster.width(), raster.height(), color)
        .map_err(|e| IoError::encode(ImageFormat::Tga, e.to_string()))?;
    if !encoded.ends_with(TGA_FOOTER) {
        encoded.extend_from_slice(TGA_FOOTER);
    }

    writer.write_all(&encoded)?;
    Ok(())
}
