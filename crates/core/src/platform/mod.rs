pub mod linux;

#[cfg(test)]
pub(crate) mod mock;

use crate::error::Result;
use crate::model::{CpuIdle, CpuListing, DiskCounters, FilesystemEntry, MemoryInfo, NetCounters};
use std::collections::{BTreeMap, HashMap, HashSet};

pub use linux::LinuxProvider;

/// Host data sources consumed by the sampler.
///
/// Implementations only read and parse; they hold no baseline state.
/// Failures are reported as `CoreError::Unavailable` or I/O errors and are
/// translated at the sampler's call boundary.
pub trait HostProvider {
    /// Available and total memory
    fn memory_info(&self) -> Result<MemoryInfo>;

    /// Cumulative uptime and idle seconds
    fn uptime(&self) -> Result<CpuIdle>;

    /// Mounted filesystems, unvalidated
    fn filesystems(&self) -> Result<Vec<FilesystemEntry>>;

    /// Counters of every non-virtual network interface
    fn net_devices(&self) -> Result<BTreeMap<String, NetCounters>>;

    /// Interfaces currently up. Best effort: failure yields an empty set.
    fn net_devices_up(&self) -> HashSet<String>;

    /// Logical sector size per block device, restricted to `devices` unless
    /// it is empty. A missing listing utility yields an empty mapping.
    fn sector_sizes(&self, devices: &[&str]) -> Result<HashMap<String, u64>>;

    /// Current counters of one block device
    fn disk_stat(&self, device: &str) -> Result<DiskCounters>;

    /// Number of CPUs and whether the host runs in 64-bit mode
    fn cpu_listing(&self) -> Result<CpuListing>;

    /// Get platform name
    fn platform_name(&self) -> &'static str;
}
