use super::seconds_between;
use crate::{
    counter::CounterWidthPolicy,
    error::{CoreError, Result},
    inventory::SectorSizeInventory,
    model::{DiskCounters, DiskDelta, RawDiskData},
    platform::HostProvider,
    store::BaselineStore,
};
use std::collections::HashMap;
use tracing::{debug, warn};

impl RawDiskData {
    pub fn new(
        device: impl Into<String>,
        counters: DiskCounters,
        sector_size: Option<u64>,
    ) -> Self {
        Self {
            device: device.into(),
            timestamp: counters.timestamp,
            reads: counters.reads,
            read_sectors: counters.read_sectors,
            writes: counters.writes,
            write_sectors: counters.write_sectors,
            sector_size,
        }
    }

    /// Activity since `previous`, which must be a reading of the same device.
    ///
    /// Sector counts become bytes only when this reading carries a sector size.
    pub fn delta(&self, previous: &RawDiskData, policy: &CounterWidthPolicy) -> Result<DiskDelta> {
        if self.device != previous.device {
            return Err(CoreError::precondition(format!(
                "{} != {}",
                self.device, previous.device
            )));
        }

        let to_bytes = |sectors: u64| self.sector_size.map(|size| sectors.saturating_mul(size));

        Ok(DiskDelta {
            device: self.device.clone(),
            delta_time: seconds_between(self.timestamp, previous.timestamp),
            reads: policy.sub_with_wrap(self.reads, previous.reads)?,
            bytes_read: to_bytes(policy.sub_with_wrap(self.read_sectors, previous.read_sectors)?),
            writes: policy.sub_with_wrap(self.writes, previous.writes)?,
            bytes_written: to_bytes(
                policy.sub_with_wrap(self.write_sectors, previous.write_sectors)?,
            ),
        })
    }
}

/// Accepts `sda` as well as `/dev/sda`
pub fn device_name(device: &str) -> &str {
    device.strip_prefix("/dev/").unwrap_or(device)
}

/// Per-device disk I/O deltas against the immediately preceding reading
pub struct DiskCollector {
    inventory: SectorSizeInventory,
    previous_stats: BaselineStore<RawDiskData>,
}

impl DiskCollector {
    pub fn new() -> Self {
        Self {
            inventory: SectorSizeInventory::new(),
            previous_stats: BaselineStore::new(),
        }
    }

    /// Forget every stored reading and take a fresh one for each visible device.
    ///
    /// Returns the number of devices baselined.
    pub fn baseline<P: HostProvider + ?Sized>(&mut self, provider: &P) -> usize {
        let sector_sizes = self.inventory.resolve_all(provider).unwrap_or_else(|e| {
            warn!(error = %e, "failed to list block device sector sizes");
            HashMap::new()
        });

        self.previous_stats.reset();
        for (device, sector_size) in sector_sizes {
            match provider.disk_stat(&device) {
                Ok(counters) => self
                    .previous_stats
                    .set(RawDiskData::new(device, counters, Some(sector_size))),
                Err(e) => warn!(device = %device, error = %e, "no baseline for disk"),
            }
        }

        self.previous_stats.len()
    }

    /// Delta for `device` since its previous reading.
    ///
    /// A device that cannot be read leaves its stored reading untouched. A
    /// device read for the first time is stored, and reported as having no
    /// previous data.
    pub fn sample<P: HostProvider + ?Sized>(
        &mut self,
        provider: &P,
        device: &str,
        policy: &CounterWidthPolicy,
    ) -> Result<DiskDelta> {
        let sector_size = match self.inventory.resolve(provider, device) {
            Ok(size) => Some(size),
            Err(e) => {
                debug!(device, error = %e, "sector size unknown, bytes unreported");
                None
            }
        };

        let counters = provider.disk_stat(device).map_err(|e| {
            debug!(device, error = %e, "disk stat read failed");
            CoreError::unavailable(format!("no data for {}", device))
        })?;

        let current = RawDiskData::new(device, counters, sector_size);
        let delta = match self.previous_stats.peek(device) {
            Some(previous) => current.delta(previous, policy)?,
            None => {
                self.previous_stats.set(current);
                return Err(CoreError::unavailable(format!("no previous data for {}", device)));
            }
        };

        self.previous_stats.set(current);
        Ok(delta)
    }

    /// Devices with a stored reading
    pub fn devices(&self) -> Vec<String> {
        self.previous_stats.devices()
    }

    pub fn previous(&self, device: &str) -> Option<&RawDiskData> {
        self.previous_stats.peek(device)
    }
}

impl Default for DiskCollector {
    fn default() -> Self {
        Self::new()
    }
}
