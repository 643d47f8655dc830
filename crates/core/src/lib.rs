pub mod config;
pub mod counter;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod model;
pub mod platform;
pub mod sampler;
pub mod store;

pub use config::Config;
pub use counter::CounterWidthPolicy;
pub use error::{CoreError, Result};
pub use inventory::SectorSizeInventory;
pub use metrics::MetricsCollector;
pub use model::*;
pub use platform::{HostProvider, LinuxProvider};
pub use sampler::DataCollector;
pub use store::BaselineStore;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockProvider;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.interval_ms, 60_000);
        assert_eq!(config.root, std::path::PathBuf::from("/"));
        assert!(config.disks.is_empty());
        assert!(!config.pretty);
    }

    #[test]
    fn test_counter_width_modulus() {
        assert_eq!(CounterWidth::from_64_bit(false).modulus(), 4_294_967_296);
        assert_eq!(CounterWidth::from_64_bit(true).modulus(), u128::from(u64::MAX) + 1);
    }

    #[test]
    fn test_metrics_collector_creation() {
        let mut collector = MetricsCollector::new(MockProvider::new(), Vec::new());
        assert!(collector.init().is_ok());
        assert!(collector.sampler().is_baselined());
    }

    #[test]
    fn test_end_to_end_disk_and_network() {
        let provider = MockProvider::new();
        provider.set_cpus(4, false);
        provider.set_sector_size("sda", 512);
        provider.set_disk("sda", 0, 100, 1000, 10, 100);
        provider.set_net("eth0", 0, 4_294_967_000, 10);
        provider.set_net("eth1", 0, 0, 0);
        let mut sampler = DataCollector::new(provider);
        sampler.baseline().unwrap();

        let p = sampler.provider();
        p.set_disk("sda", 10, 150, 1100, 10, 100);
        p.set_net("eth0", 10, 296, 10);
        p.set_net("eth1", 10, 0, 0);

        let disk = sampler.get_disk_stats("sda").unwrap();
        assert_eq!((disk.reads, disk.writes), (50, 0));
        assert_eq!(disk.bytes_read, Some(100 * 512));
        assert_eq!(disk.delta_time, 10.0);

        // eth0 is down but wrapped past 2^32 with traffic; eth1 is down and idle
        let net = sampler.get_net_stats().unwrap();
        assert_eq!(net.len(), 1);
        match &net[0] {
            NetStat::Delta(delta) => {
                assert_eq!(delta.device, "eth0");
                assert_eq!(delta.bytes_received, 592);
                assert_eq!(delta.bytes_sent, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_host_sample_serialization() {
        let sample = HostSample {
            timestamp: std::time::SystemTime::now(),
            memory: Some(MemoryInfo {
                available_kb: 1,
                total_kb: 2,
            }),
            cpu_count: Some(2),
            cpu: None,
            networks: vec![NetStat::Delta(NetDelta {
                device: "eth0".to_string(),
                delta_time: 1.0,
                bytes_received: 1,
                bytes_sent: 2,
            })],
            disks: vec![],
            filesystems: vec![],
            unavailable: vec!["no data for sdb".to_string()],
        };

        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains(r#""kind":"delta""#));

        let deserialized: std::result::Result<HostSample, _> = serde_json::from_str(&json);
        assert!(deserialized.is_ok());
    }
}
