pub mod adjust;
pub mod catalog;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod layout;
pub mod probe;
pub mod progress;
pub mod reconcile;
pub mod staging;
pub mod timestamp;

pub use config::AppConfig;
pub use engine::{SyncEngine, SyncReport};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
