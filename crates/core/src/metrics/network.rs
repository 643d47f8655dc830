use super::seconds_between;
use crate::{
    counter::CounterWidthPolicy,
    error::{CoreError, Result},
    model::{NetCounters, NetDelta, NetStat, RawNetData},
    platform::HostProvider,
    store::BaselineStore,
};
use std::collections::BTreeMap;
use tracing::debug;

impl RawNetData {
    pub fn new(device: impl Into<String>, counters: NetCounters, up: bool) -> Self {
        Self {
            device: device.into(),
            timestamp: counters.timestamp,
            up,
            bytes_received: counters.bytes_received,
            bytes_sent: counters.bytes_sent,
        }
    }

    pub fn delta(&self, previous: &RawNetData, policy: &CounterWidthPolicy) -> Result<NetDelta> {
        if self.device != previous.device {
            return Err(CoreError::precondition(format!(
                "{} != {}",
                self.device, previous.device
            )));
        }

        Ok(NetDelta {
            device: self.device.clone(),
            delta_time: seconds_between(self.timestamp, previous.timestamp),
            bytes_received: policy.sub_with_wrap(self.bytes_received, previous.bytes_received)?,
            bytes_sent: policy.sub_with_wrap(self.bytes_sent, previous.bytes_sent)?,
        })
    }
}

impl NetDelta {
    pub fn is_active(&self) -> bool {
        self.bytes_received > 0 || self.bytes_sent > 0
    }
}

/// Whether an interface is reported this round.
///
/// Up interfaces always are. A down interface is reported only when it had a
/// previous reading and moved traffic since; down and idle interfaces are noise.
pub fn is_reportable(current: &RawNetData, delta: Option<&NetDelta>) -> bool {
    current.up || delta.is_some_and(NetDelta::is_active)
}

/// Network interface deltas with the up-or-active inclusion policy
pub struct NetworkCollector {
    previous_stats: BaselineStore<RawNetData>,
}

impl NetworkCollector {
    pub fn new() -> Self {
        Self {
            previous_stats: BaselineStore::new(),
        }
    }

    /// Current raw reading of every interface, tagged with its up state
    pub fn read<P: HostProvider + ?Sized>(provider: &P) -> Result<Vec<RawNetData>> {
        let devices = provider.net_devices()?;
        let up = provider.net_devices_up();
        Ok(Self::tag(devices, |device| up.contains(device)))
    }

    fn tag(
        devices: BTreeMap<String, NetCounters>,
        is_up: impl Fn(&str) -> bool,
    ) -> Vec<RawNetData> {
        devices
            .into_iter()
            .map(|(device, counters)| {
                let up = is_up(&device);
                RawNetData::new(device, counters, up)
            })
            .collect()
    }

    pub fn baseline<P: HostProvider + ?Sized>(&mut self, provider: &P) -> Result<usize> {
        let readings = Self::read(provider)?;
        self.previous_stats.reset();
        for reading in readings {
            self.previous_stats.set(reading);
        }
        Ok(self.previous_stats.len())
    }

    /// Reportable records for every interface currently visible.
    ///
    /// Stored readings are replaced only after the whole read succeeded.
    pub fn sample<P: HostProvider + ?Sized>(
        &mut self,
        provider: &P,
        policy: &CounterWidthPolicy,
    ) -> Result<Vec<NetStat>> {
        let readings = Self::read(provider)
            .map_err(|e| CoreError::unavailable(format!("network statistics: {}", e)))?;
        self.update(readings, policy)
    }

    /// Every delta is computed before any stored reading is replaced
    fn update(
        &mut self,
        readings: Vec<RawNetData>,
        policy: &CounterWidthPolicy,
    ) -> Result<Vec<NetStat>> {
        let deltas = readings
            .iter()
            .map(|current| {
                self.previous_stats
                    .peek(&current.device)
                    .map(|previous| current.delta(previous, policy))
                    .transpose()
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stats = Vec::new();
        for (current, delta) in readings.into_iter().zip(deltas) {
            match delta {
                None if current.up => stats.push(NetStat::FirstSeen(current.clone())),
                None => debug!(device = %current.device, "new interface is down, not reported"),
                Some(delta) => {
                    if is_reportable(&current, Some(&delta)) {
                        stats.push(NetStat::Delta(delta));
                    }
                }
            }
            self.previous_stats.set(current);
        }

        Ok(stats)
    }

    pub fn devices(&self) -> Vec<String> {
        self.previous_stats.devices()
    }

    pub fn previous(&self, device: &str) -> Option<&RawNetData> {
        self.previous_stats.peek(device)
    }
}

impl Default for NetworkCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CounterWidth;
    use crate::platform::mock::{at, MockProvider};

    fn policy() -> CounterWidthPolicy {
        CounterWidthPolicy::with_width(CounterWidth::Bits32)
    }

    fn raw(device: &str, up: bool, received: u64, sent: u64) -> RawNetData {
        RawNetData {
            device: device.to_string(),
            timestamp: at(0),
            up,
            bytes_received: received,
            bytes_sent: sent,
        }
    }

    #[test]
    fn test_delta_wraps_counters() {
        let mut current = raw("eth0", true, 5, 20);
        current.timestamp = at(60);
        let delta = current
            .delta(&raw("eth0", true, 4_294_967_290, 10), &policy())
            .unwrap();
        assert_eq!(delta.bytes_received, 11);
        assert_eq!(delta.bytes_sent, 10);
        assert_eq!(delta.delta_time, 60.0);
        assert!(delta.is_active());
    }

    #[test]
    fn test_delta_rejects_other_device() {
        let err = raw("eth0", true, 0, 0)
            .delta(&raw("eth1", true, 0, 0), &policy())
            .unwrap_err();
        assert!(matches!(err, CoreError::PreconditionViolation(_)));
    }

    #[test]
    fn test_inclusion_policy() {
        let idle = NetDelta {
            device: "eth0".to_string(),
            delta_time: 1.0,
            bytes_received: 0,
            bytes_sent: 0,
        };
        let busy = NetDelta {
            bytes_sent: 1,
            ..idle.clone()
        };

        assert!(!is_reportable(&raw("eth0", false, 0, 0), Some(&idle)));
        assert!(is_reportable(&raw("eth0", false, 0, 0), Some(&busy)));
        assert!(is_reportable(&raw("eth0", true, 0, 0), Some(&idle)));
        assert!(is_reportable(&raw("eth0", true, 0, 0), None));
        assert!(!is_reportable(&raw("eth0", false, 0, 0), None));
    }

    #[test]
    fn test_sample_applies_inclusion_policy() {
        let provider = MockProvider::new();
        provider.set_net("eth0", 0, 100, 100);
        provider.set_net("eth1", 0, 100, 100);
        provider.set_net("eth2", 0, 100, 100);
        provider.set_up("eth0", true);
        let mut network = NetworkCollector::new();
        assert_eq!(network.baseline(&provider).unwrap(), 3);

        // eth0 up and idle, eth1 down and busy, eth2 down and idle
        provider.set_net("eth0", 10, 100, 100);
        provider.set_net("eth1", 10, 150, 100);
        provider.set_net("eth2", 10, 100, 100);
        let stats = network.sample(&provider, &policy()).unwrap();

        let devices: Vec<&str> = stats.iter().map(NetStat::device).collect();
        assert_eq!(devices, vec!["eth0", "eth1"]);
        match &stats[1] {
            NetStat::Delta(delta) => assert_eq!(delta.bytes_received, 50),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sample_new_interfaces() {
        let provider = MockProvider::new();
        let mut network = NetworkCollector::new();
        network.baseline(&provider).unwrap();

        provider.set_net("wlan0", 5, 7, 8);
        provider.set_net("eth9", 5, 7, 8);
        provider.set_up("wlan0", true);
        let stats = network.sample(&provider, &policy()).unwrap();

        assert_eq!(stats.len(), 1);
        assert!(matches!(
            &stats[0],
            NetStat::FirstSeen(raw) if raw.device == "wlan0" && raw.bytes_received == 7
        ));

        // The dropped interface was still stored and now diffs normally
        provider.set_net("eth9", 10, 9, 8);
        let stats = network.sample(&provider, &policy()).unwrap();
        assert_eq!(stats.len(), 2);
        assert!(matches!(
            &stats[0],
            NetStat::Delta(delta) if delta.device == "eth9" && delta.bytes_received == 2
        ));
    }

    #[test]
    fn test_sample_read_failure_keeps_store() {
        let provider = MockProvider::new();
        provider.set_net("eth0", 0, 1, 1);
        let mut network = NetworkCollector::new();
        network.baseline(&provider).unwrap();

        *provider.net.borrow_mut() = None;
        let err = network.sample(&provider, &policy()).unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(network.devices(), vec!["eth0".to_string()]);
    }

    #[test]
    fn test_failed_delta_keeps_every_stored_reading() {
        let provider = MockProvider::new();
        provider.set_net("eth0", 0, 10, 10);
        provider.set_net("eth1", 0, 20, 20);
        let mut network = NetworkCollector::new();
        network.baseline(&provider).unwrap();

        provider.set_net("eth0", 10, 15, 10);
        provider.set_net("eth1", 10, 25, 20);
        provider.set_net("eth2", 10, 1, 1);
        let err = network.sample(&provider, &CounterWidthPolicy::new()).unwrap_err();
        assert!(matches!(err, CoreError::PreconditionViolation(_)));

        assert_eq!(network.previous("eth0").unwrap().bytes_received, 10);
        assert_eq!(network.previous("eth1").unwrap().bytes_received, 20);
        assert!(network.previous("eth2").is_none());

        let stats = network.sample(&provider, &policy()).unwrap();
        assert!(matches!(&stats[0], NetStat::Delta(delta) if delta.bytes_received == 5));
    }
}
