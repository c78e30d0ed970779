//! Benchmark metrics and the machine-readable data block
//!
//! A run ends by printing eleven values, one per line, between a pair of
//! marker lines. Downstream analysis scripts locate the markers and read the
//! values by position, so both the order and the count are fixed:
//!
//! | # | value |
//! |---|---|
//! | 1 | initial memory (KB) |
//! | 2 | width |
//! | 3 | height |
//! | 4 | channels |
//! | 5 | memory before sequential pass (KB) |
//! | 6 | memory after sequential pass (KB) |
//! | 7 | sequential time (seconds) |
//! | 8 | memory before parallel pass (KB) |
//! | 9 | memory after parallel pass (KB) |
//! | 10 | parallel time (seconds) |
//! | 11 | final memory (KB) |

use std::fmt::Write as _;
use std::io::{self, Write};
use thiserror::Error;

/// Number of values in the data block.
pub const DATA_FIELD_COUNT: usize = 11;

const FIELD_NAMES: [&str; DATA_FIELD_COUNT] = [
    "initial memory",
    "width",
    "height",
    "channels",
    "memory before sequential",
    "memory after sequential",
    "sequential seconds",
    "memory before parallel",
    "memory after parallel",
    "parallel seconds",
    "final memory",
];

/// Errors from reading a data block back.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A marker line was not found
    #[error("data marker not found: {0}")]
    MissingMarker(&'static str),

    /// The block held the wrong number of non-empty lines
    #[error("expected {expected} data values, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// A value did not parse as the expected number type
    #[error("invalid {name} value at line {index}: {value:?}")]
    InvalidField {
        index: usize,
        name: &'static str,
        value: String,
    },
}

/// Marker lines around the data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataMarkers {
    /// `DATA_START` / `DATA_END`
    #[default]
    Compact,
    /// `-------Data Start-------` / `-------Data End-------`
    Banner,
}

impl DataMarkers {
    /// Line opening the block.
    pub fn start(self) -> &'static str {
        match self {
            DataMarkers::Compact => "DATA_START",
            DataMarkers::Banner => "-------Data Start-------",
        }
    }

    /// Line closing the block.
    pub fn end(self) -> &'static str {
        match self {
            DataMarkers::Compact => "DATA_END",
            DataMarkers::Banner => "-------Data End-------",
        }
    }
}

/// Memory and timing of one conversion pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PassMetrics {
    /// Resident memory sampled just before the pass, in KB
    pub memory_before_kb: u64,
    /// Resident memory sampled just after the pass, in KB
    pub memory_after_kb: u64,
    /// Wall-clock duration of the transform
    pub seconds: f64,
}

impl PassMetrics {
    /// Memory growth over the pass, in KB (negative if memory was released).
    pub fn memory_delta_kb(&self) -> i64 {
        self.memory_after_kb as i64 - self.memory_before_kb as i64
    }
}

/// Everything a run measured.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BenchReport {
    /// Resident memory at startup, in KB
    pub initial_memory_kb: u64,
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Channels in the decoded image
    pub channels: u32,
    /// Sequential pass
    pub sequential: PassMetrics,
    /// Parallel pass
    pub parallel: PassMetrics,
    /// Resident memory after the outputs were released, in KB
    pub final_memory_kb: u64,
}

impl BenchReport {
    /// Sequential time over parallel time, or `None` if the parallel pass
    /// took no measurable time.
    pub fn speedup(&self) -> Option<f64> {
        if self.parallel.seconds > 0.0 {
            Some(self.sequential.seconds / self.parallel.seconds)
        } else {
            None
        }
    }

    /// The eleven data values in block order.
    pub fn data_lines(&self) -> [String; DATA_FIELD_COUNT] {
        [
            self.initial_memory_kb.to_string(),
            self.width.to_string(),
            self.height.to_string(),
            self.channels.to_string(),
            self.sequential.memory_before_kb.to_string(),
            self.sequential.memory_after_kb.to_string(),
            self.sequential.seconds.to_string(),
            self.parallel.memory_before_kb.to_string(),
            self.parallel.memory_after_kb.to_string(),
            self.parallel.seconds.to_string(),
            self.final_memory_kb.to_string(),
        ]
    }

    /// Render the data block, markers included, with a trailing newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use graybench::report::{BenchReport, DataMarkers};
    ///
    /// let report = BenchReport { width: 4, height: 2, channels: 3, ..Default::default() };
    /// let block = report.render_data_block(DataMarkers::Compact);
    /// assert!(block.starts_with("DATA_START\n0\n4\n2\n3\n"));
    /// assert!(block.ends_with("DATA_END\n"));
    /// ```
    pub fn render_data_block(&self, markers: DataMarkers) -> String {
        let mut block = String::new();
        let _ = writeln!(block, "{}", markers.start());
        for line in self.data_lines() {
            let _ = writeln!(block, "{}", line);
        }
        let _ = writeln!(block, "{}", markers.end());
        block
    }

    /// Write the data block to `out`.
    pub fn write_data_block<W: Write + ?Sized>(&self, out: &mut W, markers: DataMarkers) -> io::Result<()> {
        out.write_all(self.render_data_block(markers).as_bytes())
    }
}

/// Locate a data block in program output and parse it.
///
/// Either marker style is accepted; the end marker must match the start
/// marker. Blank lines inside the block are skipped, and exactly
/// [`DATA_FIELD_COUNT`] values must remain. Memory values may be written as
/// floats (they are truncated to whole KB).
pub fn parse_data_block(text: &str) -> Result<BenchReport, ReportError> {
    let mut lines = text.lines().map(str::trim);

    let markers = lines
        .by_ref()
        .find_map(|line| {
            [DataMarkers::Compact, DataMarkers::Banner]
                .into_iter()
                .find(|m| line == m.start())
        })
        .ok_or(ReportError::MissingMarker("start"))?;

    let mut values = Vec::with_capacity(DATA_FIELD_COUNT);
    let mut closed = false;
    for line in lines {
        if line == markers.end() {
            closed = true;
            break;
        }
        if !line.is_empty() {
            values.push(line);
        }
    }
    if !closed {
        return Err(ReportError::MissingMarker(markers.end()));
    }
    if values.len() != DATA_FIELD_COUNT {
        return Err(ReportError::FieldCount {
            expected: DATA_FIELD_COUNT,
            actual: values.len(),
        });
    }

    let float = |index: usize| -> Result<f64, ReportError> {
        values[index]
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ReportError::InvalidField {
                index: index + 1,
                name: FIELD_NAMES[index],
                value: values[index].to_string(),
            })
    };
    let kb = |index: usize| -> Result<u64, ReportError> {
        let v = float(index)?;
        if v < 0.0 {
            return Err(ReportError::InvalidField {
                index: index + 1,
                name: FIELD_NAMES[index],
                value: values[index].to_string(),
            });
        }
        Ok(v as u64)
    };
    let int = |index: usize| -> Result<u32, ReportError> {
        values[index]
            .parse::<u32>()
            .map_err(|_| ReportError::InvalidField {
                index: index + 1,
                name: FIELD_NAMES[index],
                value: values[index].to_string(),
            })
    };

    Ok(BenchReport {
        initial_memory_kb: kb(0)?,
        width: int(1)?,
        height: int(2)?,
        channels: int(3)?,
        sequential: PassMetrics {
            memory_before_kb: kb(4)?,
            memory_after_kb: kb(5)?,
            seconds: float(6)?,
        },
        parallel: PassMetrics {
            memory_before_kb: kb(7)?,
            memory_after_kb: kb(8)?,
            seconds: float(9)?,
        },
        final_memory_kb: kb(10)?,
    })
}
