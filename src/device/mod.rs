pub mod mounted;

pub use mounted::MountedDevice;

use crate::error::Result;

/// Device folder and file holding the media catalog.
pub const SNAPSHOT_FOLDER: &str = "PhotoData";
pub const SNAPSHOT_FILE: &str = "Photos.sqlite";

/// Read access to files on a connected device.
pub trait DeviceSource {
    /// Read `<folder>/<filename>` from the device in full.
    /// Fails with [`crate::Error::Transfer`].
    fn fetch(&self, folder: &str, filename: &str) -> Result<Vec<u8>>;

    /// Human readable device identity for logs.
    fn describe(&self) -> String {
        "device".to_string()
    }
}
