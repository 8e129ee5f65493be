use crate::catalog::{AssetRecord, AssetTime};
use crate::error::Error;
use crate::engine::SyncReport;
use crate::reconcile::{AlbumChange, AssetAction, Plan};
use crate::timestamp::TimestampOutcome;
use std::path::Path;

/// Trait for reporting reconciliation progress.
///
/// The CLI implements it with indicatif; all methods default to no-ops.
pub trait ProgressReporter {
    fn on_run_start(&self, _total_assets: usize) {}
    /// Called after the local trees were probed and before the step runs.
    fn on_asset_start(&self, _record: &AssetRecord, _step: &Plan) {}
    fn on_asset(&self, _record: &AssetRecord, _action: AssetAction) {}
    fn on_album_change(&self, _change: &AlbumChange) {}
    fn on_failure(&self, _error: &Error) {}
    fn on_timestamp(&self, _path: &Path, _outcome: TimestampOutcome) {}
    fn on_dates_adjusted(&self, _asset: &AssetTime, _copies: usize) {}
    fn on_run_complete(&self, _report: &SyncReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
