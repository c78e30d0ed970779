//! BMP image format support
//!
//! Reads and writes Windows Bitmap (BMP) files. Palettized input is expanded
//! to RGB on read, so a decoded BMP always has 3 or 4 channels.

use crate::{IoError, IoResult};
use graybench_core::{Channels, ImageFormat, Raster};
use std::io::{Read, Write};

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_i32(b: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Read a BMP image
///
/// The whole file is buffered so the pixel array can be bounds-checked
/// against the header before any raster is allocated.
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<Raster> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let header_end = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    IoError::check_available(ImageFormat::Bmp, header_end as u64, data.len() as u64)?;

    // Verify magic number
    if &data[0..2] != b"BM" {
        return Err(IoError::invalid(ImageFormat::Bmp, "missing BM signature"));
    }

    let pixel_offset = le_u32(&data, 10) as usize;
    let info_header = &data[BMP_FILE_HEADER_SIZE..header_end];

    let header_size = le_u32(info_header, 0);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::invalid(
            ImageFormat::Bmp,
            format!("unsupported header size: {}", header_size),
        ));
    }

    let width = le_i32(info_header, 4);
    let height = le_i32(info_header, 8);

    let planes = le_u16(info_header, 12);
    if planes != 1 {
        return Err(IoError::invalid(
            ImageFormat::Bmp,
            format!("unsupported number of planes: {}", planes),
        ));
    }

    let bits_per_pixel = le_u16(info_header, 14);
    let compression = le_u32(info_header, 16);
    let colors_used = le_u32(info_header, 32) as usize;

    // Uncompressed, or bitfields with the standard channel layout
    if compression != 0 && compression != 3 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP compression: {}",
            compression
        )));
    }

    if width <= 0 || height == 0 {
        return Err(IoError::invalid(
            ImageFormat::Bmp,
            format!("invalid dimensions: {}x{}", width, height),
        ));
    }
    let width = width.unsigned_abs();
    let top_down = height < 0;
    let height = height.unsigned_abs();

    let channels = match bits_per_pixel {
        1 | 4 | 8 | 24 => Channels::Rgb,
        32 => Channels::Rgba,
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported BMP bit depth: {}",
                bits_per_pixel
            )));
        }
    };

    // Palette entries are stored as B, G, R, reserved
    let palette_start = BMP_FILE_HEADER_SIZE + header_size as usize;
    let palette: Vec<[u8; 3]> = if bits_per_pixel <= 8 {
        let max_colors = 1usize << bits_per_pixel;
        let num_colors = if colors_used == 0 {
            max_colors
        } else {
            colors_used.min(max_colors)
        };
        let palette_end = palette_start + num_colors * 4;
        let raw = data.get(palette_start..palette_end).ok_or(IoError::Truncated {
            format: ImageFormat::Bmp,
            needed: palette_end as u64,
            available: data.len() as u64,
        })?;
        raw.chunks_exact(4).map(|e| [e[2], e[1], e[0]]).collect()
    } else {
        Vec::new()
    };

    // Pixel data starts at the offset, or right after the palette if the
    // offset points back into the headers
    let pixel_start = pixel_offset.max(palette_start + palette.len() * 4);

    // Calculate row stride (BMP rows are 4-byte aligned)
    let row_stride = (width as usize * bits_per_pixel as usize).div_ceil(32) * 4;
    let needed = pixel_start as u64 + row_stride as u64 * u64::from(height);
    IoError::check_available(ImageFormat::Bmp, needed, data.len() as u64)?;
    let pixels = &data[pixel_start..];

    let mut raster = Raster::new(width, height, channels)?;

    let lookup = |index: u8| -> IoResult<[u8; 3]> {
        palette.get(index as usize).copied().ok_or_else(|| {
            IoError::invalid(
                ImageFormat::Bmp,
                format!("palette index {} out of range", index),
            )
        })
    };

    for (row, row_buffer) in pixels
        .chunks_exact(row_stride)
        .take(height as usize)
        .enumerate()
    {
        let row = row as u32;
        let y = if top_down { row } else { height - 1 - row };
        let out = raster.row_mut(y);

        match bits_per_pixel {
            1 | 4 | 8 => {
                let per_byte = 8 / bits_per_pixel as usize;
                let mask = ((1u16 << bits_per_pixel) - 1) as u8;
                for (x, dst) in out.chunks_exact_mut(3).enumerate() {
                    let byte = row_buffer[x / per_byte];
                    let shift = 8 - bits_per_pixel as usize * (x % per_byte + 1);
                    let index = (byte >> shift) & mask;
                    dst.copy_from_slice(&lookup(index)?);
                }
            }
            24 => {
                for (dst, src) in out.chunks_exact_mut(3).zip(row_buffer.chunks_exact(3)) {
                    dst.copy_from_slice(&[src[2], src[1], src[0]]);
                }
            }
            32 => {
                for (dst, src) in out.chunks_exact_mut(4).zip(row_buffer.chunks_exact(4)) {
                    dst.copy_from_slice(&[src[2], src[1], src[0], src[3]]);
                }
            }
            _ => unreachable!(),
        }
    }

    // Writers that leave the fourth byte unused store zero there
    if channels == Channels::Rgba && raster.data().chunks_exact(4).all(|p| p[3] == 0) {
        for pixel in raster.data_mut().chunks_exact_mut(4) {
            pixel[3] = 255;
        }
    }

    Ok(raster)
}

/// Write a BMP image
///
/// Gray rasters are written as 8-bit with a gray palette, RGB as 24-bit and
/// RGBA as 32-bit. Gray+alpha has no BMP layout and is rejected.
pub fn write_bmp<W: Write>(raster: &Raster, mut writer: W) -> IoResult<()> {
    let width = raster.width();
    let height = raster.height();
    let channels = raster.channels();

    let bits_per_pixel: u16 = match channels {
        Channels::Gray => 8,
        Channels::Rgb => 24,
        Channels::Rgba => 32,
        Channels::GrayAlpha => {
            return Err(IoError::UnsupportedFormat(
                "cannot write gray+alpha as BMP".to_string(),
            ));
        }
    };
    let has_palette = channels == Channels::Gray;

    // Calculate sizes
    let row_stride = (width as usize * bits_per_pixel as usize).div_ceil(32) * 4;
    let pixel_data_size = row_stride * height as usize;
    let palette_size = if has_palette { 256 * 4 } else { 0 };

    let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize + palette_size;
    let file_size = u32::try_from(pixel_offset + pixel_data_size)
        .map_err(|_| IoError::encode(ImageFormat::Bmp, "image too large"))?;

    // File header
    let mut header = Vec::with_capacity(pixel_offset);
    header.extend_from_slice(b"BM");
    header.extend_from_slice(&file_size.to_le_bytes());
    header.extend_from_slice(&[0u8; 4]); // Reserved
    header.extend_from_slice(&(pixel_offset as u32).to_le_bytes());

    // Info header
    header.extend_from_slice(&BMP_INFO_HEADER_SIZE.to_le_bytes());
    header.extend_from_slice(&(width as i32).to_le_bytes());
    header.extend_from_slice(&(height as i32).to_le_bytes()); // Bottom-up
    header.extend_from_slice(&1u16.to_le_bytes()); // Planes
    header.extend_from_slice(&bits_per_pixel.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes()); // Compression
    header.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    header.extend_from_slice(&0i32.to_le_bytes()); // X pixels per meter
    header.extend_from_slice(&0i32.to_le_bytes()); // Y pixels per meter
    header.extend_from_slice(&0u32.to_le_bytes()); // Colors used
    header.extend_from_slice(&0u32.to_le_bytes()); // Important colors

    if has_palette {
        for i in 0..=255u8 {
            header.extend_from_slice(&[i, i, i, 0]);
        }
    }
    writer.write_all(&header).map_err(IoError::Io)?;

    // Pixel data, bottom-up, BGR(A) order
    let mut row_buffer = vec![0u8; row_stride];
    for row in 0..height {
        let src = raster.row(height - 1 - row);
        match channels {
            Channels::Gray => row_buffer[..src.len()].copy_from_slice(src),
            Channels::Rgb => {
                for (dst, px) in row_buffer.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
                    dst.copy_from_slice(&[px[2], px[1], px[0]]);
                }
            }
            Channels::Rgba => {
                for (dst, px) in row_buffer.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                    dst.copy_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            }
            Channels::GrayAlpha => unreachable!(),
        }
        writer.write_all(&row_buffer).map_err(IoError::Io)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bmp_roundtrip_gray_expands_to_rgb() {
        let mut raster = Raster::new(10, 10, Channels::Gray).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                raster.set_pixel(x, y, &[((x + y) * 10) as u8]).unwrap();
            }
        }

        let mut buffer = Vec::new();
        write_bmp(&raster, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 14 + 40 + 1024 + 12 * 10);

        let raster2 = read_bmp(Cursor::new(buffer)).unwrap();
        assert_eq!(raster2.width(), 10);
        assert_eq!(raster2.height(), 10);
        assert_eq!(raster2.channels(), Channels::Rgb);

        for y in 0..10 {
            for x in 0..10 {
                let v = raster.pixel(x, y).unwrap()[0];
                assert_eq!(raster2.pixel(x, y), Some(&[v, v, v][..]));
            }
        }
    }

    #[test]
    fn test_bmp_roundtrip_rgb() {
        let mut raster = Raster::new(5, 5, Channels::Rgb).unwrap();
        raster.set_pixel(0, 0, &[255, 0, 0]).unwrap();
        raster.set_pixel(1, 1, &[0, 255, 0]).unwrap();
        raster.set_pixel(2, 2, &[0, 0, 255]).unwrap();

        let mut buffer = Vec::new();
        write_bmp(&raster, &mut buffer).unwrap();

        let raster2 = read_bmp(Cursor::new(buffer)).unwrap();
        assert_eq!(raster2, raster);
    }

    #[test]
    fn test_bmp_roundtrip_rgba() {
        let raster = Raster::from_vec(2, 1, Channels::Rgba, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let mut buffer = Vec::new();
        write_bmp(&raster, &mut buffer).unwrap();
        assert_eq!(read_bmp(Cursor::new(buffer)).unwrap(), raster);
    }

    #[test]
    fn test_bmp_zero_alpha_becomes_opaque() {
        let raster = Raster::from_vec(2, 1, Channels::Rgba, vec![1, 2, 3, 0, 5, 6, 7, 0]).unwrap();
        let mut buffer = Vec::new();
        write_bmp(&raster, &mut buffer).unwrap();
        let back = read_bmp(Cursor::new(buffer)).unwrap();
        assert_eq!(back.data(), &[1, 2, 3, 255, 5, 6, 7, 255]);
    }

    #[test]
    fn test_bmp_1bit_palette() {
        // 3x2, 1 bpp, palette black/white, top row 1 0 1, bottom row 0 1 0
        let mut data = Vec::new();
        data.extend_from_slice(b"BM");
        data.extend_from_slice(&(14u32 + 40 + 8 + 8).to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&(14u32 + 40 + 8).to_le_bytes());
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&3i32.to_le_bytes());
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&[0u8; 24]);
        data.extend_from_slice(&[0, 0, 0, 0, 255, 255, 255, 0]);
        // Bottom-up rows
        data.extend_from_slice(&[0b0100_0000, 0, 0, 0]);
        data.extend_from_slice(&[0b1010_0000, 0, 0, 0]);

        let raster = read_bmp(Cursor::new(data)).unwrap();
        assert_eq!(raster.channels(), Channels::Rgb);
        assert_eq!(raster.row(0), &[255, 255, 255, 0, 0, 0, 255, 255, 255]);
        assert_eq!(raster.row(1), &[0, 0, 0, 255, 255, 255, 0, 0, 0]);
    }

    #[test]
    fn test_bmp_rejects_gray_alpha_and_garbage() {
        let ga = Raster::new(2, 2, Channels::GrayAlpha).unwrap();
        assert!(matches!(
            write_bmp(&ga, Vec::new()),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(read_bmp(Cursor::new(b"BMxx".to_vec())).is_err());
        assert!(read_bmp(Cursor::new(vec![0u8; 64])).is_err());
    }

    #[test]
    fn test_bmp_header_larger_than_file() {
        let mut data = Vec::new();
        data.extend_from_slice(b"BM");
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&54u32.to_le_bytes());
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&60000i32.to_le_bytes());
        data.extend_from_slice(&(-60000i32).to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&32u16.to_le_bytes());
        data.extend_from_slice(&[0u8; 24]);
        data.extend_from_slice(&[1, 2, 3, 4]);

        match read_bmp(Cursor::new(data)) {
            Err(IoError::Truncated {
                format: ImageFormat::Bmp,
                needed,
                available: 58,
            }) => assert_eq!(needed, 54 + 240_000 * 60_000),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
