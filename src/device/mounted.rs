use super::DeviceSource;
use crate::error::{Error, Result};
use crate::layout::{folder_segments, ACTIVE_ROOT};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A device whose media partition is mounted into the local filesystem
/// (for example through ifuse or gvfs).
#[derive(Debug, Clone)]
pub struct MountedDevice {
    root: PathBuf,
}

impl MountedDevice {
    /// Block until the mount point exposes a `DCIM` directory, or fail once
    /// `timeout` has elapsed.
    pub fn connect(mount_point: &Path, timeout: Duration) -> Result<Self> {
        let started = Instant::now();
        let mut announced = false;

        loop {
            if mount_point.join(ACTIVE_ROOT).is_dir() {
                info!("Device connected at {}", mount_point.display());
                return Ok(Self {
                    root: mount_point.to_path_buf(),
                });
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(Error::Connection(format!(
                    "no device media found at {} after {:.1}s",
                    mount_point.display(),
                    waited.as_secs_f64()
                )));
            }

            if !announced {
                info!(
                    "Waiting for device to be mounted at {}...",
                    mount_point.display()
                );
                announced = true;
            }
            thread::sleep(POLL_INTERVAL.min(timeout - waited));
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn remote_path(&self, folder: &str, filename: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in folder_segments(folder) {
            path.push(segment);
        }
        path.push(filename);
        path
    }
}

impl DeviceSource for MountedDevice {
    fn fetch(&self, folder: &str, filename: &str) -> Result<Vec<u8>> {
        let path = self.remote_path(folder, filename);
        debug!("Fetching {}", path.display());
        fs::read(&path).map_err(|source| Error::Transfer {
            remote: format!("{}/{}", folder.trim_end_matches('/'), filename),
            source,
        })
    }

    fn describe(&self) -> String {
        format!("device mounted at {}", self.root.display())
    }
}
