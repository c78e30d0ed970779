//! graybench - Sequential vs. parallel grayscale conversion benchmark
//!
//! Loads one image, converts it to grayscale on the calling thread and
//! across the rayon pool, writes both results and reports time and resident
//! memory around each pass.
//!
//! # Example
//!
//! ```
//! use graybench::{Channels, LumaRounding, Raster};
//!
//! let rgb = Raster::from_vec(1, 1, Channels::Rgb, vec![100, 150, 50]).unwrap();
//! let gray = rgb.to_gray_parallel(LumaRounding::Truncate).unwrap();
//! assert_eq!(gray.data(), &[123]);
//! ```

pub mod cli;
pub mod config;
pub mod harness;
pub mod memory;
pub mod report;

// Re-export core types (primary data structures used everywhere)
pub use graybench_core::*;

// Re-export image I/O as a module to avoid name conflicts
pub use graybench_io as io;

pub use config::BenchConfig;
pub use harness::{BenchError, run};
pub use memory::{MemorySampler, NullMemorySampler, ProcessMemorySampler};
pub use report::{BenchReport, DataMarkers, PassMetrics, ReportError, parse_data_block};
