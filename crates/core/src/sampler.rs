//! Baseline/sample state machine over every metric domain.

use crate::{
    counter::CounterWidthPolicy,
    error::{CoreError, Result},
    metrics::{
        cpu::{self, CpuCount},
        disk::{self, DiskCollector},
        filesystem,
        network::NetworkCollector,
    },
    model::{CounterWidth, CpuIdle, DiskDelta, Filesystem, MemoryInfo, NetStat},
    platform::HostProvider,
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Uninitialized,
    /// The last baseline attempt failed before completing
    Failed(String),
    Baselined,
}

/// Converts raw host counters into per-interval deltas.
///
/// `baseline` must succeed before any sampling call. Every sample is diffed
/// against the immediately preceding reading of the same device, which it
/// then replaces. Calls are expected to be serialized by the caller.
pub struct DataCollector<P: HostProvider> {
    provider: P,
    state: State,
    counters: CounterWidthPolicy,
    cpu_count: CpuCount,
    network: NetworkCollector,
    disk: DiskCollector,
}

impl<P: HostProvider> DataCollector<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: State::Uninitialized,
            counters: CounterWidthPolicy::new(),
            cpu_count: CpuCount::Failed("baseline has not been called".to_string()),
            network: NetworkCollector::new(),
            disk: DiskCollector::new(),
        }
    }

    /// Reset every domain, fix the counter width and return the initial
    /// uptime/idle pair.
    ///
    /// May be called again at any time; later samples diff against the most
    /// recent baseline. A failed CPU count detection does not fail the
    /// baseline, it is reported by `get_number_of_cpus`.
    pub fn baseline(&mut self) -> Result<CpuIdle> {
        match self.try_baseline() {
            Ok(idle) => {
                self.state = State::Baselined;
                Ok(idle)
            }
            Err(e) => {
                self.state = State::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn try_baseline(&mut self) -> Result<CpuIdle> {
        let (cpu_count, is_64_bit) = cpu::detect(&self.provider);
        self.cpu_count = cpu_count;
        self.counters.set_width(is_64_bit);

        let interfaces = self.network.baseline(&self.provider)?;
        let disks = self.disk.baseline(&self.provider);
        let idle = self.provider.uptime()?;

        info!(
            platform = self.provider.platform_name(),
            interfaces,
            disks,
            width = ?self.counters.width(),
            "baseline established"
        );
        Ok(idle)
    }

    fn ensure_baselined(&self) -> Result<()> {
        match &self.state {
            State::Baselined => Ok(()),
            State::Uninitialized => Err(CoreError::not_baselined("baseline has not been called")),
            State::Failed(reason) => Err(CoreError::not_baselined(reason.clone())),
        }
    }

    pub fn is_baselined(&self) -> bool {
        self.state == State::Baselined
    }

    /// Counter width fixed by the last baseline
    pub fn counter_width(&self) -> Option<CounterWidth> {
        self.counters.width()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn get_available_memory_kb(&self) -> Result<MemoryInfo> {
        self.provider.memory_info()
    }

    /// Cumulative uptime and idle seconds
    pub fn get_cpu_idle(&self) -> Result<CpuIdle> {
        self.provider.uptime()
    }

    pub fn get_number_of_cpus(&self) -> Result<usize> {
        self.ensure_baselined()?;
        self.cpu_count.get()
    }

    pub fn get_filesystems(&self) -> Result<Vec<Filesystem>> {
        self.ensure_baselined()?;
        let entries = self.provider.filesystems().map_err(|e| {
            if e.is_unavailable() {
                e
            } else {
                CoreError::unavailable(e.to_string())
            }
        })?;
        Ok(filesystem::validate(entries))
    }

    /// Interfaces that are up, or that moved traffic since the previous call
    pub fn get_net_stats(&mut self) -> Result<Vec<NetStat>> {
        self.ensure_baselined()?;
        self.network.sample(&self.provider, &self.counters)
    }

    /// Disk activity of `device` (`sda` or `/dev/sda`) since the previous call
    pub fn get_disk_stats(&mut self, device: &str) -> Result<DiskDelta> {
        self.ensure_baselined()?;
        let device = disk::device_name(device);
        self.disk.sample(&self.provider, device, &self.counters)
    }

    /// Disks with a stored reading, including those first seen after baseline
    pub fn disk_devices(&self) -> Vec<String> {
        self.disk.devices()
    }

    pub fn net_devices(&self) -> Vec<String> {
        self.network.devices()
    }
}
