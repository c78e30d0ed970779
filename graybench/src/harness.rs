//! The benchmark run
//!
//! One run loads an image, converts it to grayscale twice (sequential, then
//! parallel) while sampling memory and wall-clock time around each pass,
//! writes both results and prints the human-readable report followed by the
//! data block.

use crate::config::BenchConfig;
use crate::memory::{MemorySampler, NullMemorySampler, ProcessMemorySampler};
use crate::report::{BenchReport, PassMetrics};
use graybench_core::{Channels, GrayStrategy, LumaRounding, Raster};
use graybench_io::{IoError, WriteOptions, select_output};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Output file stem of the sequential result.
pub const SEQUENTIAL_STEM: &str = "grayscale_seq";

/// Output file stem of the parallel result.
pub const PARALLEL_STEM: &str = "grayscale_par";

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The input image could not be decoded
    #[error("failed to load image '{}': {source}", .path.display())]
    Load { path: PathBuf, source: IoError },

    /// The file name could not be read from the input stream
    #[error("failed to read file name: {0}")]
    Input(#[source] io::Error),

    /// The conversion rejected the decoded image
    #[error("conversion failed: {0}")]
    Convert(#[from] graybench_core::Error),

    /// An output image could not be written
    #[error("failed to write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: IoError },

    /// The report could not be written
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

impl BenchError {
    /// Process exit status for this error: 255 for a decode failure, 1 for
    /// everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            BenchError::Load { .. } => 255,
            _ => 1,
        }
    }
}

/// Pick the memory sampler a configuration asks for.
pub fn sampler_for(config: &BenchConfig) -> Box<dyn MemorySampler> {
    if config.sample_memory {
        Box::new(ProcessMemorySampler::new())
    } else {
        Box::new(NullMemorySampler)
    }
}

/// Resolve the input path, prompting on `input` when configured to.
fn input_path(
    config: &BenchConfig,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<PathBuf, BenchError> {
    if !config.reads_prompt() {
        return Ok(config.fixed_input().to_path_buf());
    }
    write!(out, "Enter image filename: ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).map_err(BenchError::Input)?;
    Ok(PathBuf::from(line.trim()))
}

/// Run one conversion pass into a preallocated output, sampling memory
/// around it and timing only the transform.
fn timed_pass(
    image: &Raster,
    gray: &mut Raster,
    strategy: GrayStrategy,
    rounding: LumaRounding,
    sampler: &mut dyn MemorySampler,
    out: &mut dyn Write,
) -> Result<PassMetrics, BenchError> {
    let label = strategy.name();
    let memory_before_kb = sampler.resident_kb();
    writeln!(
        out,
        "Memory before {}: {} KB",
        label.to_lowercase(),
        memory_before_kb
    )?;

    let start = Instant::now();
    image.convert_to_gray_into(gray, strategy, rounding)?;
    let seconds = start.elapsed().as_secs_f64();

    let memory_after_kb = sampler.resident_kb();
    writeln!(
        out,
        "Memory after {}: {} KB",
        label.to_lowercase(),
        memory_after_kb
    )?;
    writeln!(out, "{} execution time: {} seconds", label, seconds)?;

    let metrics = PassMetrics {
        memory_before_kb,
        memory_after_kb,
        seconds,
    };
    debug!(
        strategy = label,
        seconds,
        memory_delta_kb = metrics.memory_delta_kb(),
        "pass complete"
    );
    Ok(metrics)
}

/// Run the benchmark.
///
/// Human-readable lines and the data block go to `out`; the file name is
/// read from `input` when the configuration prompts for it.
///
/// # Errors
///
/// Returns [`BenchError::Load`] after printing `Error: Failed to load image!`
/// when the input cannot be decoded; no output file is written in that case.
/// Conversion, output-image and report write failures are returned as the
/// other variants.
pub fn run(
    config: &BenchConfig,
    sampler: &mut dyn MemorySampler,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<BenchReport, BenchError> {
    let initial_memory_kb = sampler.resident_kb();
    writeln!(out, "Initial memory usage: {} KB", initial_memory_kb)?;

    let path = input_path(config, input, out)?;
    info!(path = %path.display(), "loading image");
    let image = match graybench_io::read_image(&path) {
        Ok(image) => image,
        Err(source) => {
            writeln!(out, "Error: Failed to load image!")?;
            out.flush()?;
            return Err(BenchError::Load { path, source });
        }
    };

    let (width, height) = (image.width(), image.height());
    let channels = image.channels().count();
    writeln!(
        out,
        "Image Loaded: {}x{}, Channels: {}",
        width, height, channels
    )?;

    let mut gray_seq = image.create_template(Channels::Gray);
    let mut gray_par = image.create_template(Channels::Gray);

    let sequential = timed_pass(
        &image,
        &mut gray_seq,
        GrayStrategy::Sequential,
        config.rounding,
        sampler,
        out,
    )?;
    let parallel = timed_pass(
        &image,
        &mut gray_par,
        GrayStrategy::Parallel,
        config.rounding,
        sampler,
        out,
    )?;
    drop(image);

    let mut report = BenchReport {
        initial_memory_kb,
        width,
        height,
        channels,
        sequential,
        parallel,
        final_memory_kb: 0,
    };

    match report.speedup() {
        Some(speedup) => writeln!(out, "Speedup: {:.2}x", speedup)?,
        None => writeln!(out, "Speedup: n/a")?,
    }
    let identical = gray_seq == gray_par;
    if !identical {
        warn!("sequential and parallel outputs differ");
    }
    writeln!(
        out,
        "Outputs identical: {}",
        if identical { "yes" } else { "no" }
    )?;

    let target = select_output(&path, config.extended_formats);
    let options = WriteOptions {
        jpeg_quality: config.jpeg_quality,
    };
    let seq_name = target.file_name(SEQUENTIAL_STEM);
    let par_name = target.file_name(PARALLEL_STEM);
    for (gray, name) in [(&gray_seq, &seq_name), (&gray_par, &par_name)] {
        let path = config.output_dir.join(name);
        graybench_io::write_image_with(gray, &path, target.format, &options)
            .map_err(|source| BenchError::Write { path, source })?;
    }
    info!(format = ?target.format, dir = %config.output_dir.display(), "outputs written");
    writeln!(out, "Images saved as {} and {}", seq_name, par_name)?;

    drop(gray_seq);
    drop(gray_par);

    report.final_memory_kb = sampler.resident_kb();
    writeln!(out, "Final memory usage: {} KB", report.final_memory_kb)?;
    report.write_data_block(out, config.markers)?;
    out.flush()?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graybench_core::ImageFormat;
    use std::io::Cursor;

    /// Returns 100, 200, 300, ... so each sample point is distinguishable.
    struct CountingSampler(u64);

    impl MemorySampler for CountingSampler {
        fn resident_kb(&mut self) -> u64 {
            self.0 += 100;
            self.0
        }
    }

    fn write_input(dir: &std::path::Path, name: &str, raster: &Raster, format: ImageFormat) -> PathBuf {
        let path = dir.join(name);
        graybench_io::write_image(raster, &path, format).unwrap();
        path
    }

    #[test]
    fn test_run_prompts_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let raster = Raster::from_vec(2, 1, Channels::Rgb, vec![255, 255, 255, 100, 150, 50]).unwrap();
        let path = write_input(dir.path(), "in.png", &raster, ImageFormat::Png);

        let config = BenchConfig::default().with_output_dir(dir.path());
        let mut input = Cursor::new(format!("{}\n", path.display()));
        let mut out = Vec::new();
        let report = run(&config, &mut CountingSampler(0), &mut input, &mut out).unwrap();

        assert_eq!((report.width, report.height, report.channels), (2, 1, 3));
        assert_eq!(report.initial_memory_kb, 100);
        assert_eq!(report.sequential.memory_before_kb, 200);
        assert_eq!(report.sequential.memory_after_kb, 300);
        assert_eq!(report.parallel.memory_before_kb, 400);
        assert_eq!(report.parallel.memory_after_kb, 500);
        assert_eq!(report.final_memory_kb, 600);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Initial memory usage: 100 KB\nEnter image filename: "));
        assert!(text.contains("Image Loaded: 2x1, Channels: 3\n"));
        assert!(text.contains("Memory before sequential: 200 KB\n"));
        assert!(text.contains("Sequential execution time: "));
        assert!(text.contains("Parallel execution time: "));
        assert!(text.contains("Outputs identical: yes\n"));
        assert!(text.contains("Images saved as grayscale_seq.png and grayscale_par.png\n"));
        assert!(text.contains("Final memory usage: 600 KB\nDATA_START\n"));
        assert!(text.ends_with("DATA_END\n"));

        let seq = graybench_io::read_image(dir.path().join("grayscale_seq.png")).unwrap();
        assert_eq!(seq.channels(), Channels::Gray);
        assert_eq!(seq.data(), &[254, 123]);
    }

    #[test]
    fn test_run_load_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = BenchConfig::default()
            .with_image(dir.path().join("missing.jpg"))
            .with_output_dir(dir.path());
        let mut out = Vec::new();
        let err = run(&config, &mut NullMemorySampler, &mut io::empty(), &mut out).unwrap_err();

        assert!(matches!(err, BenchError::Load { .. }));
        assert_eq!(err.exit_code(), 255);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Initial memory usage: 0 KB\nError: Failed to load image!\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_gray_input_is_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let raster = Raster::new(3, 3, Channels::Gray).unwrap();
        let path = write_input(dir.path(), "gray.png", &raster, ImageFormat::Png);
        let config = BenchConfig::default().with_image(&path).with_output_dir(dir.path());

        let err = run(&config, &mut NullMemorySampler, &mut io::empty(), &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Convert(graybench_core::Error::UnsupportedChannels(1))
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_run_basic_writes_jpeg_with_banner() {
        let dir = tempfile::tempdir().unwrap();
        let raster = Raster::new(8, 8, Channels::Rgba).unwrap();
        let path = write_input(dir.path(), "in.tga", &raster, ImageFormat::Tga);

        let config = BenchConfig::basic().with_image(&path).with_output_dir(dir.path());
        let mut out = Vec::new();
        run(&config, &mut NullMemorySampler, &mut io::empty(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Images saved as grayscale_seq.jpg and grayscale_par.jpg\n"));
        assert!(text.contains("\n-------Data Start-------\n0\n8\n8\n4\n0\n0\n"));
        assert!(dir.path().join("grayscale_par.jpg").exists());
        assert_eq!(crate::report::parse_data_block(&text).unwrap().channels, 4);
    }

    #[test]
    fn test_run_unwritable_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let raster = Raster::new(4, 4, Channels::Rgb).unwrap();
        let path = write_input(dir.path(), "in.bmp", &raster, ImageFormat::Bmp);
        let config = BenchConfig::default()
            .with_image(&path)
            .with_output_dir(dir.path().join("absent"));

        let err = run(&config, &mut NullMemorySampler, &mut io::empty(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BenchError::Write { .. }));
    }
}
