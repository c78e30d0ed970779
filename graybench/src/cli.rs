//! Command-line arguments

use crate::config::BenchConfig;
use crate::report::DataMarkers;
use clap::{Parser, ValueEnum};
use graybench_core::LumaRounding;
use std::path::PathBuf;

/// Data block marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkerArg {
    /// DATA_START / DATA_END
    Compact,
    /// -------Data Start------- / -------Data End-------
    Banner,
}

/// Luma narrowing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoundingArg {
    /// Drop the fraction
    Truncate,
    /// Round to nearest
    Nearest,
}

#[derive(Parser, Debug)]
#[command(
    name = "graybench",
    version,
    about = "Benchmark sequential against parallel RGB-to-grayscale conversion"
)]
pub struct Args {
    /// Input image; when omitted the file name is read from stdin
    pub image: Option<PathBuf>,
    /// Do not prompt; use the default image when no path is given
    #[arg(long, default_value_t = false)]
    pub no_prompt: bool,
    /// Report every memory reading as 0
    #[arg(long, default_value_t = false)]
    pub no_memory: bool,
    /// Always write JPEG output
    #[arg(long, default_value_t = false)]
    pub basic_formats: bool,
    /// Delimiters around the data block [default: compact, banner with --basic]
    #[arg(long, value_enum)]
    pub markers: Option<MarkerArg>,
    /// How fractional luma is narrowed to 8 bits
    #[arg(long, value_enum, default_value_t = RoundingArg::Truncate)]
    pub rounding: RoundingArg,
    /// Quality of JPEG output, 1-100
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: u8,
    /// Directory that receives grayscale_seq.* and grayscale_par.*
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Start from the minimal preset: test.jpg, no memory, JPEG output, banner markers
    #[arg(long, default_value_t = false)]
    pub basic: bool,
}

impl Args {
    /// Build the run configuration. Explicit flags override the preset.
    pub fn into_config(self) -> BenchConfig {
        let mut config = if self.basic {
            BenchConfig::basic()
        } else {
            BenchConfig::default()
        };

        config.image = self.image;
        if self.no_prompt {
            config.prompt_for_filename = false;
        }
        if self.no_memory {
            config.sample_memory = false;
        }
        if self.basic_formats {
            config.extended_formats = false;
        }
        if let Some(markers) = self.markers {
            config.markers = match markers {
                MarkerArg::Compact => DataMarkers::Compact,
                MarkerArg::Banner => DataMarkers::Banner,
            };
        }
        config.rounding = match self.rounding {
            RoundingArg::Truncate => LumaRounding::Truncate,
            RoundingArg::Nearest => LumaRounding::Nearest,
        };
        config.jpeg_quality = self.jpeg_quality;
        config.output_dir = self.output_dir;
        config
    }
}
