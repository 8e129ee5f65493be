//! Re-applies device creation times to every local copy of every asset,
//! without touching placement or album membership.

use crate::catalog::AssetTime;
use crate::error::{Error, Result};
use crate::layout::LibraryLayout;
use crate::progress::ProgressReporter;
use crate::timestamp::{self, TimestampOutcome};
use glob::Pattern;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct AdjustReport {
    pub updated: usize,
    pub unchanged: usize,
    pub read_only: usize,
    /// Assets with no local copy in any tree.
    pub missing: usize,
    pub failures: Vec<Error>,
    pub duration: Duration,
}

/// Every file under the given roots grouped by base name (file name without
/// its extension).
pub struct BaseNameIndex {
    files: HashMap<String, Vec<PathBuf>>,
}

impl BaseNameIndex {
    pub fn build(roots: &[PathBuf], ignore: &[Pattern]) -> Result<Self> {
        let mut files: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for root in roots.iter().filter(|r| r.is_dir()) {
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::PermissionDenied)
                        {
                            warn!("Access denied while walking {}: {}", root.display(), e);
                            continue;
                        }
                        return Err(Error::Io(io::Error::other(e)));
                    }
                };
                if !entry.file_type().is_file()
                    || ignore.iter().any(|p| p.matches_path(entry.path()))
                {
                    continue;
                }
                if let Some(stem) = base_name(entry.path()) {
                    files.entry(stem).or_default().push(entry.into_path());
                }
            }
        }
        debug!("Indexed {} base names", files.len());
        Ok(Self { files })
    }

    pub fn matches(&self, filename: &str) -> &[PathBuf] {
        base_name(Path::new(filename))
            .and_then(|stem| self.files.get(&stem))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn base_name(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Apply each asset's creation time to all of its copies in the active,
/// deleted and album trees.
pub fn adjust_dates(
    layout: &LibraryLayout,
    assets: &[AssetTime],
    ignore: &[Pattern],
    reporter: &dyn ProgressReporter,
) -> Result<AdjustReport> {
    let started = Instant::now();
    let roots = [
        layout.active_root(),
        layout.deleted_root(),
        layout.albums_root(),
    ];
    let index = BaseNameIndex::build(&roots, ignore)?;
    let mut report = AdjustReport::default();
    reporter.on_run_start(assets.len());

    for asset in assets {
        let copies = index.matches(&asset.filename);
        if copies.is_empty() {
            debug!("No local copy of {}", asset.filename);
            report.missing += 1;
            reporter.on_dates_adjusted(asset, 0);
            continue;
        }
        for path in copies {
            match timestamp::adjust(path, asset.created_at) {
                Ok(outcome) => {
                    match outcome {
                        TimestampOutcome::Updated => report.updated += 1,
                        TimestampOutcome::Unchanged => report.unchanged += 1,
                        TimestampOutcome::ReadOnly => report.read_only += 1,
                    }
                    reporter.on_timestamp(path, outcome);
                }
                Err(e) => {
                    warn!("{}", e);
                    reporter.on_failure(&e);
                    report.failures.push(e);
                }
            }
        }
        reporter.on_dates_adjusted(asset, copies.len());
    }

    report.duration = started.elapsed();
    info!(
        "Dates adjusted: {} updated, {} unchanged, {} read-only, {} assets without local copy",
        report.updated, report.unchanged, report.read_only, report.missing
    );
    Ok(report)
}
