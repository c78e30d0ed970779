//! Process memory sampling
//!
//! The harness takes a [`MemorySampler`] rather than querying the OS itself,
//! so runs can be measured for real or with a fixed zero reading.

use sysinfo::{Pid, System};
use tracing::debug;

/// Source of resident-set-size readings.
pub trait MemorySampler {
    /// Current resident memory of this process in kilobytes, or 0 if it
    /// cannot be determined.
    fn resident_kb(&mut self) -> u64;
}

/// Samples the current process through `sysinfo`.
pub struct ProcessMemorySampler {
    system: System,
    pid: Option<Pid>,
}

impl ProcessMemorySampler {
    /// Create a sampler for the calling process.
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                debug!("current pid unavailable: {}", e);
                None
            }
        };
        Self {
            system: System::new(),
            pid,
        }
    }
}

impl Default for ProcessMemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler for ProcessMemorySampler {
    fn resident_kb(&mut self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        self.system.refresh_process(pid);
        // sysinfo reports bytes
        self.system
            .process(pid)
            .map(|p| p.memory() / 1024)
            .unwrap_or(0)
    }
}

/// Always reports zero; used when memory sampling is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMemorySampler;

impl MemorySampler for NullMemorySampler {
    fn resident_kb(&mut self) -> u64 {
        0
    }
}

impl<S: MemorySampler + ?Sized> MemorySampler for &mut S {
    fn resident_kb(&mut self) -> u64 {
        (**self).resident_kb()
    }
}

impl<S: MemorySampler + ?Sized> MemorySampler for Box<S> {
    fn resident_kb(&mut self) -> u64 {
        (**self).resident_kb()
    }
}
