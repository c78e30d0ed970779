//! Image format I/O regression test
//!
//! Writes synthetic rasters in every supported format, reads them back
//! through the format-detecting loader and checks the decoded pixels.
//!
//! Run with:
//! ```
//! cargo test -p graybench-io --test ioformats_reg
//! ```

use graybench_core::{Channels, LumaRounding, Raster};
use graybench_io::{
    ImageFormat, IoError, WriteOptions, detect_format, read_image, read_image_mem, select_output,
    write_image, write_image_mem, write_image_with,
};
use graybench_test::{RegParams, fixtures};

/// Largest per-sample difference between two equally sized rasters.
fn max_diff(a: &Raster, b: &Raster) -> u8 {
    a.data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

#[test]
fn ioformats_reg() {
    let mut rp = RegParams::new("ioformats");
    let dir = tempfile::tempdir().unwrap();

    let rgb = fixtures::gradient_rgb(37, 23);
    let rgba = fixtures::gradient_rgba(19, 11);
    let gray = rgb.to_gray_sequential(LumaRounding::Truncate).unwrap();

    // Lossless formats reproduce every sample
    let lossless = [
        (ImageFormat::Png, "rgb.png", &rgb),
        (ImageFormat::Png, "rgba.png", &rgba),
        (ImageFormat::Png, "gray.png", &gray),
        (ImageFormat::Bmp, "rgb.bmp", &rgb),
        (ImageFormat::Bmp, "rgba.bmp", &rgba),
        (ImageFormat::Tga, "rgb.tga", &rgb),
        (ImageFormat::Tga, "rgba.tga", &rgba),
        (ImageFormat::Tga, "gray.tga", &gray),
        (ImageFormat::Pnm, "rgb.ppm", &rgb),
        (ImageFormat::Pnm, "gray.pgm", &gray),
    ];
    for (format, name, raster) in lossless {
        eprintln!("Test {:?}: {}", format, name);
        let path = fixtures::write_fixture(dir.path(), name, raster, format).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        rp.compare_values(1.0, (detect_format(&path, &bytes).unwrap() == format) as u8 as f64, 0.0);
        let back = read_image(&path).unwrap();
        rp.compare_raster(raster, &back);
    }

    // Gray BMP comes back as RGB with equal samples
    let path = fixtures::write_fixture(dir.path(), "gray.bmp", &gray, ImageFormat::Bmp).unwrap();
    let back = read_image(&path).unwrap();
    rp.compare_values(3.0, back.channels().count() as f64, 0.0);
    let regray = back.to_gray_sequential(LumaRounding::Nearest).unwrap();
    rp.compare_values(0.0, max_diff(&gray, &regray) as f64, 1.0);

    // JPEG is lossy but keeps size and layout
    for (name, raster) in [("rgb.jpg", &rgb), ("gray.jpg", &gray)] {
        let path = fixtures::write_fixture(dir.path(), name, raster, ImageFormat::Jpeg).unwrap();
        let back = read_image(&path).unwrap();
        rp.compare_values(1.0, back.sizes_equal(raster) as u8 as f64, 0.0);
        rp.compare_values(
            raster.channels().count() as f64,
            back.channels().count() as f64,
            0.0,
        );
        rp.compare_values(0.0, max_diff(raster, &back) as f64, 24.0);
    }

    assert!(rp.cleanup(), "ioformats regression test failed");
}

#[test]
fn ioformats_jpeg_quality() {
    let mut rp = RegParams::new("ioformats_quality");
    let raster = fixtures::noise(64, 64, Channels::Rgb, 11);

    let encode = |quality: u8| {
        let mut path = std::env::temp_dir();
        path.push(format!("graybench_quality_{}_{}.jpg", std::process::id(), quality));
        write_image_with(
            &raster,
            &path,
            ImageFormat::Jpeg,
            &WriteOptions {
                jpeg_quality: quality,
            },
        )
        .unwrap();
        let size = std::fs::metadata(&path).unwrap().len();
        let _ = std::fs::remove_file(&path);
        size
    };

    let high = encode(100);
    let low = encode(10);
    rp.compare_values(1.0, (high > low) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "ioformats quality regression test failed");
}

#[test]
fn ioformats_memory_and_errors() {
    let mut rp = RegParams::new("ioformats_mem");

    let raster = fixtures::gradient_rgb(8, 8);
    for format in [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Tga, ImageFormat::Pnm] {
        let bytes = write_image_mem(&raster, format).unwrap();
        let back = read_image_mem(&bytes).unwrap();
        rp.compare_raster(&raster, &back);
    }

    // Corrupt and missing input never panics
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"\x89PNG\r\n\x1a\nnot really").unwrap();
    rp.compare_values(1.0, read_image(&bogus).is_err() as u8 as f64, 0.0);
    rp.compare_values(
        1.0,
        read_image(dir.path().join("missing.jpg")).is_err() as u8 as f64,
        0.0,
    );
    let empty = dir.path().join("empty.tga");
    std::fs::write(&empty, b"").unwrap();
    rp.compare_values(1.0, read_image(&empty).is_err() as u8 as f64, 0.0);

    // Unwritable destination surfaces as an error
    let target = dir.path().join("no_such_dir").join("out.png");
    rp.compare_values(
        1.0,
        write_image(&raster, &target, ImageFormat::Png).is_err() as u8 as f64,
        0.0,
    );

    assert!(rp.cleanup(), "ioformats memory regression test failed");
}

#[test]
fn ioformats_output_selection_roundtrip() {
    let mut rp = RegParams::new("ioformats_select");
    let dir = tempfile::tempdir().unwrap();
    let gray = fixtures::gradient_rgb(16, 16)
        .to_gray_parallel(LumaRounding::Truncate)
        .unwrap();

    for input in ["photo.png", "photo.JPG", "photo.jpeg", "photo.bmp", "photo.tga", "photo.gif"] {
        let target = select_output(input, true);
        let path = dir.path().join(target.file_name("grayscale_par"));
        write_image(&gray, &path, target.format).unwrap();
        let back = read_image(&path).unwrap();
        rp.compare_values(1.0, back.sizes_equal(&gray) as u8 as f64, 0.0);
    }

    let target = select_output("photo.png", false);
    rp.compare_strings(b"grayscale_seq.jpg", target.file_name("grayscale_seq").as_bytes());

    assert!(rp.cleanup(), "ioformats select regression test failed");
}

#[test]
fn ioformats_oversized_headers() {
    let mut rp = RegParams::new("ioformats_oversized");
    let dir = tempfile::tempdir().unwrap();

    for (name, bytes) in fixtures::oversized_headers() {
        eprintln!("Oversized header: {}", name);
        let from_mem = read_image_mem(&bytes);
        rp.compare_values(
            1.0,
            matches!(from_mem, Err(IoError::Truncated { .. })) as u8 as f64,
            0.0,
        );

        let path = dir.path().join(name);
        std::fs::write(&path, &bytes).unwrap();
        let from_file = read_image(&path);
        rp.compare_values(
            1.0,
            matches!(from_file, Err(IoError::Truncated { .. })) as u8 as f64,
            0.0,
        );
    }

    assert!(rp.cleanup(), "ioformats oversized header regression test failed");
}
