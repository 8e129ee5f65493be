mod cli;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use dotenv::dotenv;
use tracing::{error, info};

use cli::commands::{Cli, Commands};
use cli::progress::CliReporter;
use photo_mirror::adjust::{adjust_dates, AdjustReport};
use photo_mirror::catalog::{self, load_asset_times, load_catalog};
use photo_mirror::config::{compile_ignore_patterns, load_configuration};
use photo_mirror::device::{DeviceSource, MountedDevice};
use photo_mirror::layout::LibraryLayout;
use photo_mirror::{AppConfig, Error, SyncEngine, SyncReport};

fn main() {
    dotenv().ok();

    let guard = cli::logging::init_logger();

    let args = Cli::parse();

    let mut config = match load_configuration() {
        Ok(config) => config,
        Err(err) => {
            let err = Error::from(err);
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(err.exit_code());
        }
    };
    if let Some(library) = &args.library {
        config.library_path = library.to_string_lossy().into_owned();
    }
    if let Some(device) = &args.device {
        config.device_mount = Some(device.to_string_lossy().into_owned());
    }

    let result = match args.command {
        Some(Commands::Snapshot) => run_snapshot(&config),
        Some(Commands::Transfer(transfer)) => {
            config.hard_links |= transfer.hard_links;
            run_transfer(&config, transfer.fresh_snapshot)
        }
        Some(Commands::AdjustDates(adjust)) => run_adjust_dates(&config, adjust.fresh_snapshot),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        let code = err
            .downcast_ref::<Error>()
            .map(Error::exit_code)
            .unwrap_or(1);
        drop(guard);
        process::exit(code);
    }
}

fn connect_device(config: &AppConfig) -> Result<MountedDevice> {
    let mount = config.device_mount.as_ref().ok_or_else(|| {
        Error::Connection("no device mount point configured (use --device)".to_string())
    })?;
    let device = MountedDevice::connect(
        &PathBuf::from(mount),
        Duration::from_secs(config.connect_timeout_secs),
    )?;
    Ok(device)
}

fn snapshot_path(config: &AppConfig, device: Option<&dyn DeviceSource>) -> Result<PathBuf> {
    let library = PathBuf::from(&config.library_path);
    let path = catalog::resolve_snapshot(device, &library)
        .with_context(|| format!("acquiring snapshot for {}", library.display()))?;
    info!("Using snapshot {}", path.display());
    Ok(path)
}

fn run_snapshot(config: &AppConfig) -> Result<()> {
    let device = connect_device(config)?;
    snapshot_path(config, Some(&device as &dyn DeviceSource))?;
    Ok(())
}

fn run_transfer(config: &AppConfig, fresh_snapshot: bool) -> Result<()> {
    let device = connect_device(config)?;
    let snapshot = snapshot_path(config, fresh_snapshot.then_some(&device as &dyn DeviceSource))?;
    let assets = load_catalog(&snapshot)
        .with_context(|| format!("reading {}", snapshot.display()))?;

    let engine = SyncEngine::from_config(config, &device);
    let reporter = CliReporter::new("Transferring");
    let report = engine.run(&assets, &reporter);
    reporter.finish();

    print_sync_summary(&report?);
    Ok(())
}

fn run_adjust_dates(config: &AppConfig, fresh_snapshot: bool) -> Result<()> {
    let device = if fresh_snapshot {
        Some(connect_device(config)?)
    } else {
        None
    };
    let snapshot = snapshot_path(config, device.as_ref().map(|d| d as &dyn DeviceSource))?;
    let assets = load_asset_times(&snapshot)
        .with_context(|| format!("reading {}", snapshot.display()))?;

    let layout = LibraryLayout::new(&config.library_path);
    let ignore = compile_ignore_patterns(&config.ignore_patterns);
    let reporter = CliReporter::new("Adjusting");
    let report = adjust_dates(&layout, &assets, &ignore, &reporter);
    reporter.finish();

    print_adjust_summary(&report?);
    Ok(())
}

fn print_sync_summary(report: &SyncReport) {
    println!();
    info!(
        "{} assets in {}: {} copied, {} skipped, {} moved to deleted, {} moved to undeleted",
        report.total_assets(),
        format!("{:.2}s", report.duration.as_secs_f64()).green(),
        format!("{}", report.copied).green(),
        format!("{}", report.skipped).cyan(),
        format!("{}", report.moved_to_deleted).yellow(),
        format!("{}", report.moved_to_undeleted).yellow(),
    );
    info!(
        "Albums: {} entries added, {} entries removed",
        format!("{}", report.albums_added).green(),
        format!("{}", report.albums_removed).yellow(),
    );
    if !report.failures.is_empty() {
        info!(
            "{} album or timestamp updates failed (see log)",
            format!("{}", report.failures.len()).red(),
        );
    }
}

fn print_adjust_summary(report: &AdjustReport) {
    println!();
    info!(
        "Dates in {}: {} updated, {} unchanged, {} read-only, {} without local copy",
        format!("{:.2}s", report.duration.as_secs_f64()).green(),
        format!("{}", report.updated).green(),
        format!("{}", report.unchanged).cyan(),
        format!("{}", report.read_only).yellow(),
        format!("{}", report.missing).yellow(),
    );
    if !report.failures.is_empty() {
        info!(
            "{} timestamp updates failed (see log)",
            format!("{}", report.failures.len()).red(),
        );
    }
}
