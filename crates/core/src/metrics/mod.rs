pub mod cpu;
pub mod disk;
pub mod filesystem;
pub mod network;

pub use disk::DiskCollector;
pub use network::NetworkCollector;

use crate::{
    error::{CoreError, Result},
    model::{CpuIdle, CpuSample, HostSample},
    platform::HostProvider,
    sampler::DataCollector,
};
use std::time::SystemTime;
use tracing::debug;

/// Seconds from `previous` to `current`, negative if the clock went backwards
pub(crate) fn seconds_between(current: SystemTime, previous: SystemTime) -> f64 {
    match current.duration_since(previous) {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Main metrics collector that turns one sampling round into a `HostSample`
pub struct MetricsCollector<P: HostProvider> {
    sampler: DataCollector<P>,
    disks: Vec<String>,
    last_idle: Option<CpuIdle>,
}

impl<P: HostProvider> MetricsCollector<P> {
    /// `disks` restricts disk sampling; empty samples every known device
    pub fn new(provider: P, disks: Vec<String>) -> Self {
        Self {
            sampler: DataCollector::new(provider),
            disks,
            last_idle: None,
        }
    }

    /// Take the baseline every later `collect` is diffed against
    pub fn init(&mut self) -> Result<()> {
        self.last_idle = Some(self.sampler.baseline()?);
        Ok(())
    }

    pub fn sampler(&self) -> &DataCollector<P> {
        &self.sampler
    }

    /// Sample every domain.
    ///
    /// Metrics that are unavailable this round are left out and their reasons
    /// listed; any other error aborts the round.
    pub fn collect(&mut self) -> Result<HostSample> {
        let timestamp = SystemTime::now();
        let mut unavailable = Vec::new();

        let memory = recover(self.sampler.get_available_memory_kb(), &mut unavailable)?;
        let cpu_count = recover(self.sampler.get_number_of_cpus(), &mut unavailable)?;

        let cpu = match recover(self.sampler.get_cpu_idle(), &mut unavailable)? {
            Some(idle) => {
                let sample = self.last_idle.map(|previous| {
                    let delta = idle.delta(&previous);
                    CpuSample {
                        delta,
                        utilization: cpu_count.and_then(|count| delta.utilization(count)),
                    }
                });
                self.last_idle = Some(idle);
                sample
            }
            None => None,
        };

        let networks =
            recover(self.sampler.get_net_stats(), &mut unavailable)?.unwrap_or_default();

        let devices = if self.disks.is_empty() {
            self.sampler.disk_devices()
        } else {
            self.disks.clone()
        };
        let mut disks = Vec::new();
        for device in &devices {
            if let Some(delta) = recover(self.sampler.get_disk_stats(device), &mut unavailable)? {
                disks.push(delta);
            }
        }

        let filesystems =
            recover(self.sampler.get_filesystems(), &mut unavailable)?.unwrap_or_default();

        Ok(HostSample {
            timestamp,
            memory,
            cpu_count,
            cpu,
            networks,
            disks,
            filesystems,
            unavailable,
        })
    }
}

fn recover<T>(result: Result<T>, unavailable: &mut Vec<String>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CoreError::Unavailable(reason)) => {
            debug!(%reason, "metric unavailable");
            unavailable.push(reason);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
