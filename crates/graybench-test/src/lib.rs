//! graybench-test - Regression test framework for graybench
//!
//! [`RegParams`] collects numbered checks for one `*_reg` test and reports
//! every failure at the end instead of stopping at the first. Inputs come
//! from [`fixtures`], which builds images in code so no image files are
//! checked in.
//!
//! # Usage
//!
//! ```ignore
//! use graybench_test::{RegParams, fixtures};
//!
//! let mut rp = RegParams::new("grayscale");
//! let rgb = fixtures::gradient_rgb(64, 48);
//! rp.compare_raster(&rgb.to_gray_sequential(rounding)?, &rgb.to_gray_parallel(rounding)?);
//! assert!(rp.cleanup());
//! ```

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::RegParams;

/// Synthetic input images
///
/// All fixtures are deterministic functions of their size, so tests never
/// depend on checked-in image files.
pub mod fixtures {
    use crate::{TestError, TestResult};
    use graybench_core::{Channels, ImageFormat, Raster};
    use std::path::{Path, PathBuf};

    fn build(
        name: &str,
        width: u32,
        height: u32,
        channels: Channels,
        f: impl Fn(u32, u32, &mut [u8]),
    ) -> Raster {
        let mut raster = match Raster::new(width, height, channels) {
            Ok(r) => r,
            Err(e) => panic!("fixture {} {}x{}: {}", name, width, height, e),
        };
        let c = channels.count() as usize;
        for y in 0..height {
            for (x, px) in raster.row_mut(y).chunks_exact_mut(c).enumerate() {
                f(x as u32, y, px);
            }
        }
        raster
    }

    /// RGB gradient: red follows x, green follows y, blue the diagonal.
    pub fn gradient_rgb(width: u32, height: u32) -> Raster {
        build("gradient_rgb", width, height, Channels::Rgb, |x, y, px| {
            px[0] = (x * 255 / (width - 1).max(1)) as u8;
            px[1] = (y * 255 / (height - 1).max(1)) as u8;
            px[2] = ((x + y) % 256) as u8;
        })
    }

    /// RGBA gradient with a varying alpha channel.
    pub fn gradient_rgba(width: u32, height: u32) -> Raster {
        build("gradient_rgba", width, height, Channels::Rgba, |x, y, px| {
            px[0] = (x % 256) as u8;
            px[1] = ((x * 3 + y) % 256) as u8;
            px[2] = (y % 256) as u8;
            px[3] = ((x ^ y) % 256) as u8;
        })
    }

    /// Pseudo-random samples from a fixed linear congruential sequence.
    pub fn noise(width: u32, height: u32, channels: Channels, seed: u32) -> Raster {
        let mut raster = build("noise", width, height, channels, |_, _, _| {});
        let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
        for v in raster.data_mut() {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            *v = (state >> 24) as u8;
        }
        raster
    }

    /// A raster filled with one pixel value.
    pub fn solid(width: u32, height: u32, samples: &[u8]) -> Raster {
        let channels = match Channels::from_count(samples.len() as u32) {
            Ok(c) => c,
            Err(e) => panic!("fixture solid: {}", e),
        };
        build("solid", width, height, channels, |_, _, px| {
            px.copy_from_slice(samples)
        })
    }

    /// Files whose headers claim far more pixels than follow them.
    ///
    /// Returns `(file name, bytes)` pairs: a binary PPM, a run-length TGA
    /// with the 2.0 footer and a 24-bit BMP. Each is well under a kilobyte
    /// but describes an image of several gigabytes.
    pub fn oversized_headers() -> Vec<(&'static str, Vec<u8>)> {
        let mut tga = vec![0u8; 18];
        tga[2] = 10;
        tga[12..16].copy_from_slice(&[0xFF; 4]);
        tga[16] = 32;
        tga[17] = 0x20;
        tga.extend_from_slice(&[0u8; 8]);
        tga.extend_from_slice(b"TRUEVISION-XFILE.\0");

        let mut bmp = b"BM".to_vec();
        bmp.extend_from_slice(&[0u8; 8]);
        bmp.extend_from_slice(&54u32.to_le_bytes());
        bmp.extend_from_slice(&40u32.to_le_bytes());
        bmp.extend_from_slice(&1_000_000i32.to_le_bytes());
        bmp.extend_from_slice(&1_000_000i32.to_le_bytes());
        bmp.extend_from_slice(&1u16.to_le_bytes());
        bmp.extend_from_slice(&24u16.to_le_bytes());
        bmp.extend_from_slice(&[0u8; 24]);

        vec![
            ("huge.ppm", b"P6\n2000000000 100\n255\n\0\0\0".to_vec()),
            ("huge.tga", tga),
            ("huge.bmp", bmp),
        ]
    }

    /// Encode `raster` into `dir/name` with the given format.
    pub fn write_fixture(
        dir: impl AsRef<Path>,
        name: &str,
        raster: &Raster,
        format: ImageFormat,
    ) -> TestResult<PathBuf> {
        let path = dir.as_ref().join(name);
        graybench_io::write_image(raster, &path, format).map_err(|e| TestError::Fixture {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use graybench_core::Channels;

    #[test]
    fn test_gradient_corners() {
        let rgb = fixtures::gradient_rgb(16, 8);
        assert_eq!(rgb.pixel(0, 0), Some(&[0u8, 0, 0][..]));
        assert_eq!(rgb.pixel(15, 7), Some(&[255u8, 255, 22][..]));
    }

    #[test]
    fn test_noise_is_deterministic() {
        let a = fixtures::noise(9, 7, Channels::Rgb, 3);
        let b = fixtures::noise(9, 7, Channels::Rgb, 3);
        let c = fixtures::noise(9, 7, Channels::Rgb, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_solid() {
        let raster = fixtures::solid(3, 2, &[1, 2, 3, 4]);
        assert_eq!(raster.channels(), Channels::Rgba);
        assert!(raster.data().chunks_exact(4).all(|p| p == [1, 2, 3, 4]));
    }
}
