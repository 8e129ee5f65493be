use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "photo-mirror")]
#[command(about = "Mirror a phone's photo library and albums to a local folder", long_about = None)]
pub struct Cli {
    /// Library folder (overrides `library_path`)
    #[arg(short, long, global = true)]
    pub library: Option<PathBuf>,

    /// Mount point of the device's media partition (overrides `device_mount`)
    #[arg(short, long, global = true)]
    pub device: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Copy Photos.sqlite from the device into the library
    Snapshot,
    /// Transfer photos and videos and rebuild the album folders
    Transfer(TransferArgs),
    /// Set modified dates of local copies from the catalog
    AdjustDates(AdjustArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Copy a fresh snapshot from the device instead of using the newest local one
    #[arg(long)]
    pub fresh_snapshot: bool,

    /// Create hard links in album folders instead of copies
    #[arg(long)]
    pub hard_links: bool,
}

#[derive(Debug, Args)]
pub struct AdjustArgs {
    /// Copy a fresh snapshot from the device instead of using the newest local one
    #[arg(long)]
    pub fresh_snapshot: bool,
}
