//! PNM (portable anymap) support
//!
//! Binary P5 (graymap) and P6 (pixmap) with maxval up to 255. Header tokens
//! may be separated by any whitespace and interleaved with `#` comments.

use crate::{IoError, IoResult};
use graybench_core::{Channels, ImageFormat, Raster};
use std::io::{BufRead, Read, Write};

/// Read one byte, or `None` at end of input.
fn next_byte<R: BufRead>(reader: &mut R) -> IoResult<Option<u8>> {
    let buf = reader.fill_buf()?;
    let Some(&byte) = buf.first() else {
        return Ok(None);
    };
    reader.consume(1);
    Ok(Some(byte))
}

/// Read the next header token, skipping whitespace and comments.
///
/// Consumes exactly one whitespace byte after the token, which for the last
/// header field is the separator before the raster.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    loop {
        let byte = next_byte(reader)?
            .ok_or_else(|| IoError::invalid(ImageFormat::Pnm, "header truncated"))?;
        match byte {
            b'#' if token.is_empty() => {
                let mut comment = Vec::new();
                reader.read_until(b'\n', &mut comment)?;
            }
            b if b.is_ascii_whitespace() => {
                if !token.is_empty() {
                    return Ok(token);
                }
            }
            b => token.push(b as char),
        }
    }
}

fn read_number<R: BufRead>(reader: &mut R, field: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::invalid(ImageFormat::Pnm, format!("bad {}: {:?}", field, token)))
}

/// Read a binary PNM image
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<Raster> {
    let magic = read_token(&mut reader)?;
    let channels = match magic.as_str() {
        "P5" => Channels::Gray,
        "P6" => Channels::Rgb,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNM type: {}",
                other
            )));
        }
    };

    let width = read_number(&mut reader, "width")?;
    let height = read_number(&mut reader, "height")?;
    let maxval = read_number(&mut reader, "maxval")?;
    if maxval == 0 || maxval > 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNM maxval: {}",
            maxval
        )));
    }

    // Read no further than the input goes before trusting the header size
    let needed = u64::from(width) * u64::from(height) * u64::from(channels.count());
    let mut data = Vec::new();
    reader.by_ref().take(needed).read_to_end(&mut data)?;
    IoError::check_available(ImageFormat::Pnm, needed, data.len() as u64)?;
    let mut raster = Raster::from_vec(width, height, channels, data)?;

    // Rescale to the full 8-bit range
    if maxval != 255 {
        for v in raster.data_mut() {
            *v = ((u32::from(*v).min(maxval) * 255 + maxval / 2) / maxval) as u8;
        }
    }

    Ok(raster)
}

/// Write a gray raster as P5 or an RGB raster as P6
pub fn write_pnm<W: Write>(raster: &Raster, mut writer: W) -> IoResult<()> {
    let magic = match raster.channels() {
        Channels::Gray => "P5",
        Channels::Rgb => "P6",
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "cannot write {} channels as PNM",
                other.count()
            )));
        }
    };

    write!(writer, "{}\n{} {}\n255\n", magic, raster.width(), raster.height())?;
    writer.write_all(raster.data())?;
    Ok(())
}
