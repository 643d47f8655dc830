use super::HostProvider;
use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::model::{CpuIdle, CpuListing, DiskCounters, FilesystemEntry, MemoryInfo, NetCounters};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;
use sysinfo::Disks;
use tracing::debug;

/// Longest interface name reported, excluding the trailing colon
const MAX_INTERFACE_NAME: usize = 9;

/// Reads kernel counters from `proc` and `sys` under a host root and runs
/// the block device and CPU listing utilities found there.
pub struct LinuxProvider {
    root: PathBuf,
    filesystem_types: Vec<String>,
}

impl LinuxProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filesystem_types: Config::default().filesystem_types,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.root.clone(),
            filesystem_types: config.filesystem_types.clone(),
        }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .map_err(|e| CoreError::unavailable(format!("{}: {}", path.display(), e)))
    }

    /// Stdout of `program`; the exit status is not inspected
    fn run(program: &Path, args: &[&str]) -> std::io::Result<String> {
        let output = Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl HostProvider for LinuxProvider {
    fn memory_info(&self) -> Result<MemoryInfo> {
        #[cfg(feature = "linux_procfs")]
        if self.root == Path::new("/") {
            use procfs::Current;

            let meminfo = procfs::Meminfo::current().map_err(procfs_unavailable)?;
            let available = meminfo
                .mem_available
                .ok_or_else(|| CoreError::unavailable("Available memory not found"))?;
            return Ok(MemoryInfo {
                available_kb: available / 1024,
                total_kb: meminfo.mem_total / 1024,
            });
        }

        parse_meminfo(&self.read("proc/meminfo")?)
    }

    fn uptime(&self) -> Result<CpuIdle> {
        parse_uptime(&self.read("proc/uptime")?)
    }

    fn filesystems(&self) -> Result<Vec<FilesystemEntry>> {
        let disks = Disks::new_with_refreshed_list();

        Ok(disks
            .list()
            .iter()
            .filter_map(|disk| {
                let file_system = disk.file_system().to_string_lossy();
                if !self.filesystem_types.iter().any(|t| *t == file_system) {
                    return None;
                }
                Some(FilesystemEntry {
                    device_name: disk.name().to_string_lossy().to_string(),
                    mount_point: disk.mount_point().to_string_lossy().to_string(),
                    size_in_bytes: disk.total_space(),
                    free_space_in_bytes: disk.available_space(),
                })
            })
            .collect())
    }

    fn net_devices(&self) -> Result<BTreeMap<String, NetCounters>> {
        let content = self.read("proc/net/dev")?;
        let timestamp = SystemTime::now();
        let virtual_net = self.path("sys/devices/virtual/net");

        Ok(parse_net_dev(&content)
            .into_iter()
            .filter(|(device, _, _)| !virtual_net.join(device).exists())
            .map(|(device, bytes_received, bytes_sent)| {
                (
                    device,
                    NetCounters {
                        timestamp,
                        bytes_received,
                        bytes_sent,
                    },
                )
            })
            .collect())
    }

    fn net_devices_up(&self) -> HashSet<String> {
        match self.read("proc/net/route") {
            Ok(content) => parse_route(&content),
            Err(e) => {
                debug!(error = %e, "no routing table, treating every interface as down");
                HashSet::new()
            }
        }
    }

    fn sector_sizes(&self, devices: &[&str]) -> Result<HashMap<String, u64>> {
        let lsblk = self.path("bin/lsblk");
        match Self::run(&lsblk, &["-sd", "-oNAME,LOG-SEC"]) {
            Ok(output) => Ok(parse_lsblk(&output, devices)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %lsblk.display(), "block device listing utility not installed");
                Ok(HashMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn disk_stat(&self, device: &str) -> Result<DiskCounters> {
        if !is_block_device_name(device) {
            return Err(CoreError::unavailable(format!("not a block device name: {}", device)));
        }
        let relative = format!("sys/class/block/{}/stat", device);
        let content = self.read(&relative)?;
        let timestamp = SystemTime::now();
        let (reads, read_sectors, writes, write_sectors) = parse_disk_stat(&content)
            .ok_or_else(|| CoreError::unavailable(format!("{}: is empty", relative)))?;

        Ok(DiskCounters {
            timestamp,
            reads,
            read_sectors,
            writes,
            write_sectors,
        })
    }

    fn cpu_listing(&self) -> Result<CpuListing> {
        let lscpu = self.path("usr/bin/lscpu");
        let unavailable =
            |e: std::io::Error| CoreError::unavailable(format!("{}: {}", lscpu.display(), e));

        let count = count_cpus(&Self::run(&lscpu, &["-p"]).map_err(unavailable)?);
        let is_64_bit = is_64_bit_mode(&Self::run(&lscpu, &[]).map_err(unavailable)?);

        Ok(CpuListing { count, is_64_bit })
    }

    fn platform_name(&self) -> &'static str {
        "linux"
    }
}

#[cfg(feature = "linux_procfs")]
fn procfs_unavailable(e: procfs::ProcError) -> CoreError {
    CoreError::unavailable(format!("proc/meminfo: {}", e))
}

/// A single path component under `sys/class/block`
fn is_block_device_name(device: &str) -> bool {
    !device.is_empty() && device != "." && device != ".." && !device.contains('/')
}

/// `MemTotal:` and `MemAvailable:` in kB
pub fn parse_meminfo(content: &str) -> Result<MemoryInfo> {
    let mut total = None;
    let mut available = None;

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(label), Some(value), Some("kB")) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let Ok(value) = value.parse::<u64>() else {
            continue;
        };
        match label {
            "MemTotal:" => total = Some(value),
            "MemAvailable:" => available = Some(value),
            _ => {}
        }
    }

    Ok(MemoryInfo {
        available_kb: available
            .ok_or_else(|| CoreError::unavailable("Available memory not found"))?,
        total_kb: total.ok_or_else(|| CoreError::unavailable("Total memory not found"))?,
    })
}

pub fn parse_uptime(content: &str) -> Result<CpuIdle> {
    let mut fields = content.split_whitespace().map(str::parse::<f64>);

    let uptime = fields
        .next()
        .and_then(|f| f.ok())
        .ok_or_else(|| CoreError::unavailable("Uptime not found"))?;
    let idle = fields
        .next()
        .and_then(|f| f.ok())
        .ok_or_else(|| CoreError::unavailable("Idle time not found"))?;

    Ok(CpuIdle { uptime, idle })
}

/// `(device, bytes received, bytes sent)` for every interface row
pub fn parse_net_dev(content: &str) -> Vec<(String, u64, u64)> {
    content
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let device = fields.first()?.strip_suffix(':')?;
            if device.is_empty() || device.len() > MAX_INTERFACE_NAME || fields.len() < 10 {
                return None;
            }
            let received = fields[1].parse().ok()?;
            let sent = fields[9].parse().ok()?;
            Some((device.to_string(), received, sent))
        })
        .collect()
}

/// Interfaces with at least one route
pub fn parse_route(content: &str) -> HashSet<String> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Sector size per device from `lsblk -oNAME,LOG-SEC`, restricted to `devices` unless empty
pub fn parse_lsblk(output: &str, devices: &[&str]) -> HashMap<String, u64> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let (device, size) = (fields.next()?, fields.next()?);
            if !devices.is_empty() && !devices.contains(&device) {
                return None;
            }
            Some((device.to_string(), size.parse().ok()?))
        })
        .collect()
}

/// Reads, read sectors, writes and write sectors from a block device `stat` line
pub fn parse_disk_stat(content: &str) -> Option<(u64, u64, u64, u64)> {
    let fields: Vec<u64> = content
        .lines()
        .next()?
        .split_whitespace()
        .take(7)
        .map(str::parse::<u64>)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if fields.len() < 7 {
        return None;
    }
    Some((fields[0], fields[2], fields[4], fields[6]))
}

/// Number of CPU rows in `lscpu -p` output
pub fn count_cpus(output: &str) -> usize {
    output
        .lines()
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
        .count()
}

/// Whether `lscpu` lists 64-bit among the CPU op-modes
pub fn is_64_bit_mode(output: &str) -> bool {
    output
        .lines()
        .find(|line| line.starts_with("CPU op-mode(s):"))
        .is_some_and(|line| line.contains("64-bit"))
}
