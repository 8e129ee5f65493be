pub mod models;
pub mod reader;
pub mod snapshot;

pub use models::{AssetRecord, AssetTime, CatalogRow};
pub use reader::{group_rows, GroupedAssets};
pub use snapshot::{
    find_newest_snapshot, load_asset_times, load_catalog, snapshot_file_name, Snapshot,
};

use crate::device::{DeviceSource, SNAPSHOT_FILE, SNAPSHOT_FOLDER};
use crate::error::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Copy the device's media catalog into `library` under a timestamped name.
pub fn copy_snapshot_from_device(device: &dyn DeviceSource, library: &Path) -> Result<PathBuf> {
    let bytes = device.fetch(SNAPSHOT_FOLDER, SNAPSHOT_FILE)?;
    fs::create_dir_all(library)?;
    let path = library.join(snapshot_file_name(Local::now()));
    fs::write(&path, &bytes)?;
    info!(
        "Copied {}/{} ({} bytes) to {}",
        SNAPSHOT_FOLDER,
        SNAPSHOT_FILE,
        bytes.len(),
        path.display()
    );
    Ok(path)
}

/// Use a fresh copy from the device when one is given, otherwise the newest
/// snapshot already in the library.
pub fn resolve_snapshot(device: Option<&dyn DeviceSource>, library: &Path) -> Result<PathBuf> {
    match device {
        Some(device) => copy_snapshot_from_device(device, library),
        None => find_newest_snapshot(library),
    }
}
