//! Image format detection and output codec selection
//!
//! Input formats are detected from magic numbers in the file header. TGA
//! carries no magic number, so it is recognized by its optional footer or,
//! failing that, by the file extension.
//!
//! Output formats are chosen from the input file name: a whitelisted
//! extension selects its own codec, anything else falls back to PNG.

use crate::{IoError, IoResult};
use graybench_core::ImageFormat;
use std::path::Path;

/// Magic numbers for image format detection
mod magic {
    /// BMP: "BM"
    pub const BMP: &[u8] = b"BM";

    /// PNG: 89 50 4E 47 0D 0A 1A 0A
    pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// JPEG: FF D8 FF
    pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

    /// Binary PNM formats
    pub const PGM_BINARY: &[u8] = b"P5";
    pub const PPM_BINARY: &[u8] = b"P6";

    /// TGA 2.0 footer signature (last 18 bytes of the file)
    pub const TGA_FOOTER: &[u8] = b"TRUEVISION-XFILE.\0";
}

/// Extensions that select their own output codec.
pub const OUTPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga"];

/// Detect the format of file contents read from `path`.
///
/// Data that matches no magic number or TGA footer is taken as TGA when the
/// path has a `tga` extension.
pub fn detect_format<P: AsRef<Path>>(path: P, data: &[u8]) -> IoResult<ImageFormat> {
    match detect_format_from_bytes(data) {
        Ok(format) => Ok(format),
        Err(err) => {
            if extension_of(path.as_ref()).as_deref() == Some("tga") {
                Ok(ImageFormat::Tga)
            } else {
                Err(err)
            }
        }
    }
}

/// Detect image format from bytes
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<ImageFormat> {
    if data.len() < 2 {
        return Err(IoError::invalid(
            ImageFormat::Unknown,
            "not enough data to detect format",
        ));
    }

    // Check BMP
    if data.starts_with(magic::BMP) {
        return Ok(ImageFormat::Bmp);
    }

    // Check PNG (needs 8 bytes)
    if data.len() >= 8 && data.starts_with(magic::PNG) {
        return Ok(ImageFormat::Png);
    }

    // Check JPEG
    if data.len() >= 3 && data.starts_with(magic::JPEG) {
        return Ok(ImageFormat::Jpeg);
    }

    // Check binary PNM
    let first_two = &data[..2];
    if first_two == magic::PGM_BINARY || first_two == magic::PPM_BINARY {
        return Ok(ImageFormat::Pnm);
    }

    // Check TGA 2.0 footer
    if data.len() >= 18 + magic::TGA_FOOTER.len() && data.ends_with(magic::TGA_FOOTER) {
        return Ok(ImageFormat::Tga);
    }

    Err(IoError::UnsupportedFormat(
        "unknown image format".to_string(),
    ))
}

/// Lowercased extension of a path, if it has one.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Output codec and file extension chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Encoder to use
    pub format: ImageFormat,
    /// Extension for the output file names, without the dot
    pub extension: String,
}

impl OutputTarget {
    /// PNG fallback target.
    pub fn png() -> Self {
        OutputTarget {
            format: ImageFormat::Png,
            extension: "png".to_string(),
        }
    }

    /// Output file name for a given stem, e.g. `grayscale_seq.png`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension)
    }
}

/// Choose the output codec from the input file name.
///
/// With `extended` set, a whitelisted extension (`png`, `jpg`, `jpeg`, `bmp`,
/// `tga`, compared without case) is kept in lowercase and selects its codec;
/// everything else, including a missing extension, yields PNG. Without
/// `extended`, output is always JPEG with extension `jpg`.
///
/// # Examples
///
/// ```
/// use graybench_io::{ImageFormat, select_output};
///
/// let target = select_output("photo.JPEG", true);
/// assert_eq!(target.format, ImageFormat::Jpeg);
/// assert_eq!(target.extension, "jpeg");
///
/// let target = select_output("scan.tiff", true);
/// assert_eq!(target.extension, "png");
/// ```
pub fn select_output<P: AsRef<Path>>(input: P, extended: bool) -> OutputTarget {
    if !extended {
        return OutputTarget {
            format: ImageFormat::Jpeg,
            extension: ImageFormat::Jpeg.extension().to_string(),
        };
    }
    match extension_of(input.as_ref()) {
        Some(ext) if OUTPUT_EXTENSIONS.contains(&ext.as_str()) => OutputTarget {
            format: ImageFormat::from_extension(&ext),
            extension: ext,
        },
        _ => OutputTarget::png(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bmp() {
        let data = b"BM\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        assert_eq!(detect_format_from_bytes(data).unwrap(), ImageFormat::Bmp);
    }

    #[test]
    fn test_detect_png() {
        let data = [
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(detect_format_from_bytes(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_jpeg() {
        let data = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
        ];
        assert_eq!(detect_format_from_bytes(&data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_pnm() {
        assert_eq!(
            detect_format_from_bytes(b"P5\n100 100\n255\n").unwrap(),
            ImageFormat::Pnm
        );
        assert_eq!(
            detect_format_from_bytes(b"P6\n100 100\n255\n").unwrap(),
            ImageFormat::Pnm
        );
    }

    #[test]
    fn test_detect_tga_footer() {
        let mut data = vec![0u8; 18];
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(b"TRUEVISION-XFILE.\0");
        assert_eq!(detect_format_from_bytes(&data).unwrap(), ImageFormat::Tga);
    }

    #[test]
    fn test_detect_unknown() {
        let data = b"UNKNOWN_FORMAT";
        assert!(detect_format_from_bytes(data).is_err());
        assert!(detect_format_from_bytes(b"x").is_err());
    }

    #[test]
    fn test_detect_tga_by_extension() {
        let headerless = [0u8, 0, 3, 0, 0];
        assert_eq!(detect_format("in.TGA", &headerless).unwrap(), ImageFormat::Tga);
        assert!(detect_format("in.dat", &headerless).is_err());
        assert_eq!(detect_format("in.tga", b"BM....").unwrap(), ImageFormat::Bmp);
    }

    #[test]
    fn test_select_output_whitelist() {
        for (name, format, ext) in [
            ("a.png", ImageFormat::Png, "png"),
            ("a.jpg", ImageFormat::Jpeg, "jpg"),
            ("a.jpeg", ImageFormat::Jpeg, "jpeg"),
            ("a.BMP", ImageFormat::Bmp, "bmp"),
            ("dir.v2/a.tga", ImageFormat::Tga, "tga"),
        ] {
            let target = select_output(name, true);
            assert_eq!(target.format, format, "{}", name);
            assert_eq!(target.extension, ext, "{}", name);
        }
    }

    #[test]
    fn test_select_output_fallback() {
        for name in ["a.gif", "a.tiff", "a.pnm", "noext", "dir.png/noext", ""] {
            assert_eq!(select_output(name, true), OutputTarget::png(), "{}", name);
        }
    }

    #[test]
    fn test_select_output_basic() {
        let target = select_output("a.png", false);
        assert_eq!(target.format, ImageFormat::Jpeg);
        assert_eq!(target.file_name("grayscale_seq"), "grayscale_seq.jpg");
    }
}
