use crate::{
    error::{CoreError, Result},
    model::{CpuIdle, CpuIdleDelta, CpuListing},
    platform::HostProvider,
};
use tracing::warn;

impl CpuIdle {
    /// Plain difference; uptime and idle seconds never wrap
    pub fn delta(&self, previous: &CpuIdle) -> CpuIdleDelta {
        CpuIdleDelta {
            uptime: self.uptime - previous.uptime,
            idle: self.idle - previous.idle,
        }
    }
}

impl CpuIdleDelta {
    /// Busy fraction over the interval, given the number of CPUs.
    ///
    /// Idle time accumulates once per CPU while uptime does not.
    pub fn utilization(&self, cpu_count: usize) -> Option<f64> {
        if self.uptime <= 0.0 || cpu_count == 0 {
            return None;
        }
        let capacity = self.uptime * cpu_count as f64;
        Some((1.0 - self.idle / capacity).clamp(0.0, 1.0))
    }
}

/// CPU count established at baseline.
///
/// A failed detection does not abort the baseline; the reason is kept in
/// place of the count and returned on every access until the next baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuCount {
    Known(usize),
    Failed(String),
}

impl CpuCount {
    pub fn get(&self) -> Result<usize> {
        match self {
            Self::Known(count) => Ok(*count),
            Self::Failed(reason) => Err(CoreError::unavailable(reason.clone())),
        }
    }
}

/// Detect the CPU count and counter width.
///
/// When the listing cannot be obtained at all the host is treated as 32-bit.
pub fn detect<P: HostProvider + ?Sized>(provider: &P) -> (CpuCount, bool) {
    match provider.cpu_listing() {
        Ok(CpuListing { count: 0, is_64_bit }) => {
            warn!("no CPUs found");
            (CpuCount::Failed("No CPUs found".to_string()), is_64_bit)
        }
        Ok(CpuListing { count, is_64_bit }) => (CpuCount::Known(count), is_64_bit),
        Err(e) => {
            warn!(error = %e, "CPU detection failed");
            let reason = match e {
                CoreError::Unavailable(reason) => reason,
                other => other.to_string(),
            };
            (CpuCount::Failed(reason), false)
        }
    }
}
