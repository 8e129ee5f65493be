use crate::catalog::AssetRecord;
use crate::config::{compile_ignore_patterns, AppConfig};
use crate::device::DeviceSource;
use crate::error::{Error, Result};
use crate::layout::LibraryLayout;
use crate::progress::ProgressReporter;
use crate::reconcile::{AlbumChange, AlbumLinker, AssetAction, AssetReconciler, LinkMode};
use glob::Pattern;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Drives one reconciliation run over a catalog.
pub struct SyncEngine<'a, D: DeviceSource + ?Sized> {
    layout: LibraryLayout,
    device: &'a D,
    link_mode: LinkMode,
    ignore_patterns: Vec<Pattern>,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub copied: usize,
    pub skipped: usize,
    pub moved_to_deleted: usize,
    pub moved_to_undeleted: usize,
    pub albums_added: usize,
    pub albums_removed: usize,
    /// Recoverable link and timestamp failures.
    pub failures: Vec<Error>,
    pub duration: Duration,
}

impl SyncReport {
    pub fn total_assets(&self) -> usize {
        self.copied + self.skipped + self.moved_to_deleted + self.moved_to_undeleted
    }

    /// True when the run changed nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.copied == 0
            && self.moved_to_deleted == 0
            && self.moved_to_undeleted == 0
            && self.albums_added == 0
            && self.albums_removed == 0
    }

    fn count(&mut self, action: AssetAction) {
        match action {
            AssetAction::Copied => self.copied += 1,
            AssetAction::Skipped => self.skipped += 1,
            AssetAction::MovedToDeleted => self.moved_to_deleted += 1,
            AssetAction::MovedToUndeleted => self.moved_to_undeleted += 1,
        }
    }
}

impl<'a, D: DeviceSource + ?Sized> SyncEngine<'a, D> {
    pub fn new(layout: LibraryLayout, device: &'a D) -> Self {
        Self {
            layout,
            device,
            link_mode: LinkMode::Copy,
            ignore_patterns: Vec::new(),
        }
    }

    pub fn from_config(config: &AppConfig, device: &'a D) -> Self {
        Self::new(LibraryLayout::new(&config.library_path), device)
            .with_link_mode(LinkMode::from_hard_links(config.hard_links))
            .with_ignore_patterns(compile_ignore_patterns(&config.ignore_patterns))
    }

    pub fn with_link_mode(mut self, mode: LinkMode) -> Self {
        self.link_mode = mode;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    /// Reconcile every asset in order: placement first, then album entries.
    ///
    /// Transfer, move and I/O errors abort the run; link and timestamp
    /// failures are collected in the report.
    pub fn run(
        &self,
        assets: &[AssetRecord],
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncReport> {
        let started = Instant::now();
        info!(
            "Reconciling {} assets from {} into {}",
            assets.len(),
            self.device.describe(),
            self.layout.root().display()
        );
        reporter.on_run_start(assets.len());

        let reconciler = AssetReconciler::new(&self.layout, self.device);
        let mut linker = AlbumLinker::open(&self.layout, self.link_mode, &self.ignore_patterns)?;
        let mut report = SyncReport::default();

        for record in assets {
            let step = reconciler.decide(record);
            reporter.on_asset_start(record, &step);
            let outcome = reconciler.execute(record, step)?;
            info!("{} {}", record.remote_path(), outcome.action);
            report.count(outcome.action);
            reporter.on_asset(record, outcome.action);

            match outcome.timestamp {
                Some(Ok(result)) => reporter.on_timestamp(&outcome.path, result),
                Some(Err(e)) => {
                    warn!("{}", e);
                    reporter.on_failure(&e);
                    report.failures.push(e);
                }
                None => {}
            }

            let albums = linker.reconcile(&record.filename, &record.albums, &outcome.path);
            for change in &albums.changes {
                info!("{} {}", record.filename, change);
                match change {
                    AlbumChange::Added { .. } => report.albums_added += 1,
                    AlbumChange::Removed { .. } => report.albums_removed += 1,
                }
                reporter.on_album_change(change);
            }
            for failure in albums.failures {
                reporter.on_failure(&failure);
                report.failures.push(failure);
            }
        }

        report.duration = started.elapsed();
        debug!("Run finished in {:.2}s", report.duration.as_secs_f64());
        reporter.on_run_complete(&report);
        Ok(report)
    }
}
