use crate::{
    error::{CoreError, Result},
    model::{Filesystem, FilesystemEntry},
};
use tracing::debug;

impl TryFrom<FilesystemEntry> for Filesystem {
    type Error = CoreError;

    fn try_from(entry: FilesystemEntry) -> Result<Self> {
        if !entry.device_name.starts_with("/dev/") {
            return Err(CoreError::malformed(entry.device_name));
        }
        if !entry.mount_point.starts_with('/') {
            return Err(CoreError::malformed(entry.mount_point));
        }
        if entry.size_in_bytes == 0 {
            return Err(CoreError::malformed(format!("{}: zero size", entry.mount_point)));
        }

        Ok(Self {
            device_name: entry.device_name,
            mount_point: entry.mount_point,
            size_in_bytes: entry.size_in_bytes,
            free_space_in_bytes: entry.free_space_in_bytes,
        })
    }
}

/// Keep the well-formed rows, sorted; malformed rows are skipped
pub fn validate(entries: Vec<FilesystemEntry>) -> Vec<Filesystem> {
    let mut filesystems: Vec<Filesystem> = entries
        .into_iter()
        .filter_map(|entry| match Filesystem::try_from(entry) {
            Ok(fs) => Some(fs),
            Err(e) => {
                debug!(error = %e, "skipping filesystem row");
                None
            }
        })
        .collect();
    filesystems.sort();
    filesystems
}
