use indicatif::{ProgressBar, ProgressStyle};
use photo_mirror::catalog::{AssetRecord, AssetTime};
use photo_mirror::reconcile::{AssetAction, Plan};
use photo_mirror::{Error, ProgressReporter, SyncReport};
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter: one bar over the catalog, with asset outcomes and
/// failures printed above it.
pub struct CliReporter {
    label: &'static str,
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    pub fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_run_start(&self, total_assets: usize) {
        let pb = ProgressBar::new(total_assets as u64);
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {pos}/{len} assets ({eta} remaining)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.set_message(self.label);
        pb.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn on_asset_start(&self, record: &AssetRecord, step: &Plan) {
        if let Plan::Fetch { .. } = step {
            self.with_bar(|pb| pb.set_message(format!("{} {}", self.label, record.filename)));
        }
    }

    fn on_asset(&self, _record: &AssetRecord, _action: AssetAction) {
        self.with_bar(|pb| pb.inc(1));
    }

    fn on_failure(&self, error: &Error) {
        self.with_bar(|pb| pb.println(format!("  \x1b[33m!\x1b[0m {}", error)));
    }

    fn on_dates_adjusted(&self, _asset: &AssetTime, _copies: usize) {
        self.with_bar(|pb| pb.inc(1));
    }

    fn on_run_complete(&self, _report: &SyncReport) {
        self.finish();
    }
}
