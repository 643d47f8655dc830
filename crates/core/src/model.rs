use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Host counter width, fixed at baseline time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterWidth {
    Bits32,
    Bits64,
}

impl CounterWidth {
    pub fn from_64_bit(is_64_bit: bool) -> Self {
        if is_64_bit {
            Self::Bits64
        } else {
            Self::Bits32
        }
    }

    /// 2^32 or 2^64
    pub fn modulus(self) -> u128 {
        match self {
            Self::Bits32 => 1u128 << 32,
            Self::Bits64 => 1u128 << 64,
        }
    }
}

/// Memory information, in kB as reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub available_kb: u64,
    pub total_kb: u64,
}

/// Cumulative seconds since boot and cumulative idle seconds across all CPUs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuIdle {
    pub uptime: f64,
    pub idle: f64,
}

/// Difference between two `CpuIdle` readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuIdleDelta {
    pub uptime: f64,
    pub idle: f64,
}

/// Output of the CPU listing utility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuListing {
    pub count: usize,
    pub is_64_bit: bool,
}

/// Raw block device counters as read from the kernel, before sector size is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskCounters {
    pub timestamp: SystemTime,
    pub reads: u64,
    pub read_sectors: u64,
    pub writes: u64,
    pub write_sectors: u64,
}

/// Raw reading for one block device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDiskData {
    pub device: String,
    pub timestamp: SystemTime,
    pub reads: u64,
    pub read_sectors: u64,
    pub writes: u64,
    pub write_sectors: u64,
    pub sector_size: Option<u64>,
}

/// Disk activity between two readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskDelta {
    pub device: String,
    /// Seconds between the two readings
    pub delta_time: f64,
    pub reads: u64,
    /// `None` when the sector size of the device is unknown
    pub bytes_read: Option<u64>,
    pub writes: u64,
    pub bytes_written: Option<u64>,
}

/// Raw network interface counters as read from the kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetCounters {
    pub timestamp: SystemTime,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Raw reading for one network interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNetData {
    pub device: String,
    pub timestamp: SystemTime,
    pub up: bool,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Network activity between two readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetDelta {
    pub device: String,
    pub delta_time: f64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// A reportable network record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetStat {
    /// Interface had a previous reading
    Delta(NetDelta),
    /// Interface seen for the first time while up
    FirstSeen(RawNetData),
}

impl NetStat {
    pub fn device(&self) -> &str {
        match self {
            Self::Delta(delta) => &delta.device,
            Self::FirstSeen(raw) => &raw.device,
        }
    }
}

/// Filesystem row as listed by the inventory source, not yet validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemEntry {
    pub device_name: String,
    pub mount_point: String,
    pub size_in_bytes: u64,
    pub free_space_in_bytes: u64,
}

/// Validated mounted filesystem
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Filesystem {
    pub device_name: String,
    pub mount_point: String,
    pub size_in_bytes: u64,
    pub free_space_in_bytes: u64,
}

/// CPU section of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuSample {
    pub delta: CpuIdleDelta,
    /// Busy fraction in `[0, 1]`, when the CPU count is known
    pub utilization: Option<f64>,
}

/// One complete sampling round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSample {
    pub timestamp: SystemTime,
    pub memory: Option<MemoryInfo>,
    pub cpu_count: Option<usize>,
    pub cpu: Option<CpuSample>,
    pub networks: Vec<NetStat>,
    pub disks: Vec<DiskDelta>,
    pub filesystems: Vec<Filesystem>,
    /// Reasons for every metric that could not be produced this round
    pub unavailable: Vec<String>,
}
