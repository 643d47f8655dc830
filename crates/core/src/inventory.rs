//! Lazily resolved, process-lifetime cache of block device sector sizes.

use crate::{
    error::{CoreError, Result},
    platform::HostProvider,
};
use std::collections::HashMap;
use tracing::debug;

/// Sector size per block device.
///
/// Sizes are treated as immutable hardware metadata: once known they are
/// never queried again, not even across baselines. Misses are not cached.
#[derive(Debug, Clone, Default)]
pub struct SectorSizeInventory {
    sector_sizes: HashMap<String, u64>,
}

impl SectorSizeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sector size of `device`, querying the provider on a cache miss.
    ///
    /// Every size the provider returns is cached, not just the requested one.
    pub fn resolve<P: HostProvider + ?Sized>(&mut self, provider: &P, device: &str) -> Result<u64> {
        if let Some(size) = self.sector_sizes.get(device) {
            return Ok(*size);
        }

        for (resolved, size) in provider.sector_sizes(&[device])? {
            self.sector_sizes.entry(resolved).or_insert(size);
        }

        self.sector_sizes
            .get(device)
            .copied()
            .ok_or_else(|| CoreError::unavailable(format!("no sector size for {}", device)))
    }

    /// Resolve every currently visible device and warm the cache.
    ///
    /// Returns the provider's mapping; sizes already cached keep their value.
    ///
    /// A host without the listing utility resolves nothing; that is not an error.
    pub fn resolve_all<P: HostProvider + ?Sized>(
        &mut self,
        provider: &P,
    ) -> Result<HashMap<String, u64>> {
        let resolved = provider.sector_sizes(&[])?;
        if resolved.is_empty() {
            debug!("no block device sector sizes resolved");
        }
        for (device, size) in &resolved {
            self.sector_sizes.entry(device.clone()).or_insert(*size);
        }
        Ok(resolved)
    }

    pub fn get(&self, device: &str) -> Option<u64> {
        self.sector_sizes.get(device).copied()
    }
}
