//! Run configuration

use crate::report::DataMarkers;
use graybench_core::LumaRounding;
use std::path::{Path, PathBuf};

/// Input used when neither a prompt nor an explicit path applies.
pub const DEFAULT_IMAGE: &str = "test.jpg";

/// Options for one benchmark run.
///
/// `Default` gives the interactive run: prompt for the file name, sample
/// memory, pick the output codec from the input extension and print the
/// compact data markers. [`BenchConfig::basic`] gives the minimal run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Read the input file name from the input stream
    pub prompt_for_filename: bool,
    /// Explicit input path; takes precedence over the prompt
    pub image: Option<PathBuf>,
    /// Input path when there is no prompt and no explicit path
    pub default_image: PathBuf,
    /// Sample process memory; when off every reading is 0
    pub sample_memory: bool,
    /// Choose the output codec from the input extension instead of always JPEG
    pub extended_formats: bool,
    /// Marker lines around the data block
    pub markers: DataMarkers,
    /// Luma narrowing mode
    pub rounding: LumaRounding,
    /// JPEG quality, 1..=100
    pub jpeg_quality: u8,
    /// Directory receiving the two output images
    pub output_dir: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            prompt_for_filename: true,
            image: None,
            default_image: PathBuf::from(DEFAULT_IMAGE),
            sample_memory: true,
            extended_formats: true,
            markers: DataMarkers::Compact,
            rounding: LumaRounding::Truncate,
            jpeg_quality: 100,
            output_dir: PathBuf::from("."),
        }
    }
}

impl BenchConfig {
    /// Fixed input `test.jpg`, no memory sampling, JPEG output, banner
    /// markers.
    pub fn basic() -> Self {
        Self {
            prompt_for_filename: false,
            sample_memory: false,
            extended_formats: false,
            markers: DataMarkers::Banner,
            ..Self::default()
        }
    }

    /// Set an explicit input path.
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Input path when no prompt is involved.
    pub fn fixed_input(&self) -> &Path {
        self.image.as_deref().unwrap_or(&self.default_image)
    }

    /// Whether the harness should read the file name from its input stream.
    pub fn reads_prompt(&self) -> bool {
        self.prompt_for_filename && self.image.is_none()
    }
}
