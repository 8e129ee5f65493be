use crate::catalog::AssetRecord;
use crate::device::DeviceSource;
use crate::error::{Error, Result};
use crate::layout::LibraryLayout;
use crate::probe::{probe, LocalPlacement};
use crate::staging;
use crate::timestamp::{self, TimestampOutcome};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What happened to one asset during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetAction {
    Copied,
    Skipped,
    MovedToDeleted,
    MovedToUndeleted,
}

impl fmt::Display for AssetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetAction::Copied => write!(f, "copied"),
            AssetAction::Skipped => write!(f, "skipped"),
            AssetAction::MovedToDeleted => write!(f, "moved to deleted"),
            AssetAction::MovedToUndeleted => write!(f, "moved to undeleted"),
        }
    }
}

/// The filesystem step chosen for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Fetch { to: PathBuf },
    Move { from: PathBuf, to: PathBuf, action: AssetAction },
    Nothing,
}

/// Decide the step from the device trashed flag and the local placement.
pub fn plan(layout: &LibraryLayout, record: &AssetRecord, placement: LocalPlacement) -> Plan {
    let active = || layout.active_path(&record.folder, &record.filename);
    let deleted = || layout.deleted_path(&record.folder, &record.filename);

    match (record.trashed, placement) {
        (false, LocalPlacement::Absent) => Plan::Fetch { to: active() },
        (true, LocalPlacement::Absent) => Plan::Fetch { to: deleted() },
        (false, LocalPlacement::ActiveTree) | (true, LocalPlacement::DeletedTree) => Plan::Nothing,
        (true, LocalPlacement::ActiveTree) => Plan::Move {
            from: active(),
            to: deleted(),
            action: AssetAction::MovedToDeleted,
        },
        (false, LocalPlacement::DeletedTree) => Plan::Move {
            from: deleted(),
            to: active(),
            action: AssetAction::MovedToUndeleted,
        },
    }
}

/// Result of reconciling one asset's placement.
#[derive(Debug)]
pub struct AssetOutcome {
    pub action: AssetAction,
    /// Where the asset lives after reconciliation.
    pub path: PathBuf,
    /// Timestamp result for freshly copied files; failures here are recoverable.
    pub timestamp: Option<Result<TimestampOutcome>>,
}

/// Brings one asset's file into the tree matching its trashed flag.
pub struct AssetReconciler<'a, D: DeviceSource + ?Sized> {
    layout: &'a LibraryLayout,
    device: &'a D,
}

impl<'a, D: DeviceSource + ?Sized> AssetReconciler<'a, D> {
    pub fn new(layout: &'a LibraryLayout, device: &'a D) -> Self {
        Self { layout, device }
    }

    pub fn reconcile(&self, record: &AssetRecord) -> Result<AssetOutcome> {
        let step = self.decide(record);
        self.execute(record, step)
    }

    /// Probe the local trees and pick the step for `record`.
    pub fn decide(&self, record: &AssetRecord) -> Plan {
        let placement = probe(self.layout, &record.folder, &record.filename);
        let step = plan(self.layout, record, placement);
        debug!(
            "{} trashed={} placement={} plan={:?}",
            record.filename, record.trashed, placement, step
        );
        step
    }

    /// Carry out a step chosen by [`Self::decide`].
    pub fn execute(&self, record: &AssetRecord, step: Plan) -> Result<AssetOutcome> {
        match step {
            Plan::Fetch { to } => {
                let bytes = self.device.fetch(&record.folder, &record.filename)?;
                staging::write_staged(&to, &bytes)?;
                let timestamp = Some(timestamp::adjust(&to, record.created_at));
                Ok(AssetOutcome {
                    action: AssetAction::Copied,
                    path: to,
                    timestamp,
                })
            }
            Plan::Move { from, to, action } => {
                move_file(&from, &to)?;
                Ok(AssetOutcome {
                    action,
                    path: to,
                    timestamp: None,
                })
            }
            Plan::Nothing => {
                let path = if record.trashed {
                    self.layout.deleted_path(&record.folder, &record.filename)
                } else {
                    self.layout.active_path(&record.folder, &record.filename)
                };
                Ok(AssetOutcome {
                    action: AssetAction::Skipped,
                    path,
                    timestamp: None,
                })
            }
        }
    }
}

/// Rename `from` to `to`, creating the destination's parent first.
/// A missing source means the tree changed under us since the probe.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::ConcurrentModification {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(from, to).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound if !from.exists() => Error::ConcurrentModification {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        },
        _ => Error::Io(e),
    })
}
