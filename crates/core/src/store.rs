//! Last-seen raw readings per device, one store per metric domain.

use crate::model::{RawDiskData, RawNetData};
use std::collections::HashMap;

/// A raw reading that belongs to a single device
pub trait Reading: Clone {
    fn device(&self) -> &str;
}

impl Reading for RawDiskData {
    fn device(&self) -> &str {
        &self.device
    }
}

impl Reading for RawNetData {
    fn device(&self) -> &str {
        &self.device
    }
}

/// Most recent reading per device.
///
/// Entries are created on the first successful read of a device and replaced
/// on every later one. They are never deleted outside `reset`; an entry for a
/// vanished device is consulted again only if that device reappears.
#[derive(Debug, Clone)]
pub struct BaselineStore<R: Reading> {
    readings: HashMap<String, R>,
}

impl<R: Reading> Default for BaselineStore<R> {
    fn default() -> Self {
        Self {
            readings: HashMap::new(),
        }
    }
}

impl<R: Reading> BaselineStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.readings.clear();
    }

    pub fn set(&mut self, reading: R) {
        self.readings.insert(reading.device().to_string(), reading);
    }

    /// Store `reading` and return the one it replaced, if any
    pub fn get_and_replace(&mut self, reading: R) -> Option<R> {
        self.readings.insert(reading.device().to_string(), reading)
    }

    pub fn peek(&self, device: &str) -> Option<&R> {
        self.readings.get(device)
    }

    /// Devices with a stored reading, sorted
    pub fn devices(&self) -> Vec<String> {
        let mut devices: Vec<String> = self.readings.keys().cloned().collect();
        devices.sort();
        devices
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
