//! Scripted host used by unit tests.

use super::HostProvider;
use crate::error::{CoreError, Result};
use crate::model::{CpuIdle, CpuListing, DiskCounters, FilesystemEntry, MemoryInfo, NetCounters};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, SystemTime};

pub(crate) fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

#[derive(Default)]
pub(crate) struct MockProvider {
    pub memory: RefCell<Option<MemoryInfo>>,
    pub uptime: RefCell<Option<CpuIdle>>,
    pub filesystems: RefCell<Option<Vec<FilesystemEntry>>>,
    pub net: RefCell<Option<BTreeMap<String, NetCounters>>>,
    pub net_up: RefCell<HashSet<String>>,
    pub sector_sizes: RefCell<HashMap<String, u64>>,
    pub disks: RefCell<HashMap<String, DiskCounters>>,
    pub cpus: RefCell<Option<CpuListing>>,
    pub sector_size_queries: Cell<usize>,
}

impl MockProvider {
    pub fn new() -> Self {
        let provider = Self::default();
        provider.set_cpus(4, false);
        provider.set_uptime(100.0, 350.0);
        *provider.net.borrow_mut() = Some(BTreeMap::new());
        *provider.filesystems.borrow_mut() = Some(Vec::new());
        provider
    }

    pub fn set_cpus(&self, count: usize, is_64_bit: bool) {
        *self.cpus.borrow_mut() = Some(CpuListing { count, is_64_bit });
    }

    pub fn fail_cpus(&self) {
        *self.cpus.borrow_mut() = None;
    }

    pub fn set_uptime(&self, uptime: f64, idle: f64) {
        *self.uptime.borrow_mut() = Some(CpuIdle { uptime, idle });
    }

    pub fn set_sector_size(&self, device: &str, size: u64) {
        self.sector_sizes.borrow_mut().insert(device.to_string(), size);
    }

    pub fn set_disk(
        &self,
        device: &str,
        secs: u64,
        reads: u64,
        read_sectors: u64,
        writes: u64,
        write_sectors: u64,
    ) {
        self.disks.borrow_mut().insert(
            device.to_string(),
            DiskCounters {
                timestamp: at(secs),
                reads,
                read_sectors,
                writes,
                write_sectors,
            },
        );
    }

    pub fn remove_disk(&self, device: &str) {
        self.disks.borrow_mut().remove(device);
    }

    pub fn set_net(&self, device: &str, secs: u64, bytes_received: u64, bytes_sent: u64) {
        self.net
            .borrow_mut()
            .get_or_insert_with(BTreeMap::new)
            .insert(
                device.to_string(),
                NetCounters {
                    timestamp: at(secs),
                    bytes_received,
                    bytes_sent,
                },
            );
    }

    pub fn set_up(&self, device: &str, up: bool) {
        let mut devices = self.net_up.borrow_mut();
        if up {
            devices.insert(device.to_string());
        } else {
            devices.remove(device);
        }
    }
}

impl HostProvider for MockProvider {
    fn memory_info(&self) -> Result<MemoryInfo> {
        (*self.memory.borrow())
            .ok_or_else(|| CoreError::unavailable("Available memory not found"))
    }

    fn uptime(&self) -> Result<CpuIdle> {
        (*self.uptime.borrow())
            .ok_or_else(|| CoreError::unavailable("Uptime not found"))
    }

    fn filesystems(&self) -> Result<Vec<FilesystemEntry>> {
        self.filesystems
            .borrow()
            .clone()
            .ok_or_else(|| CoreError::unavailable("filesystem listing failed"))
    }

    fn net_devices(&self) -> Result<BTreeMap<String, NetCounters>> {
        self.net
            .borrow()
            .clone()
            .ok_or_else(|| CoreError::unavailable("network device statistics not found"))
    }

    fn net_devices_up(&self) -> HashSet<String> {
        self.net_up.borrow().clone()
    }

    fn sector_sizes(&self, devices: &[&str]) -> Result<HashMap<String, u64>> {
        self.sector_size_queries.set(self.sector_size_queries.get() + 1);
        Ok(self
            .sector_sizes
            .borrow()
            .iter()
            .filter(|(device, _)| devices.is_empty() || devices.contains(&device.as_str()))
            .map(|(device, size)| (device.clone(), *size))
            .collect())
    }

    fn disk_stat(&self, device: &str) -> Result<DiskCounters> {
        self.disks
            .borrow()
            .get(device)
            .cloned()
            .ok_or_else(|| CoreError::unavailable(format!("no stat record for {}", device)))
    }

    fn cpu_listing(&self) -> Result<CpuListing> {
        (*self.cpus.borrow())
            .ok_or_else(|| CoreError::unavailable("lscpu: No such file or directory"))
    }

    fn platform_name(&self) -> &'static str {
        "mock"
    }
}
