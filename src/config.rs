use config::{Config, ConfigError, Environment, File as ConfigFile};
use glob::Pattern;
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root of the local mirror (holds DCIM, DCIM_deleted, Albums and snapshots).
    pub library_path: String,
    /// Where the device's media partition is mounted.
    pub device_mount: Option<String>,
    pub connect_timeout_secs: u64,
    /// Populate albums with hard links instead of copies.
    pub hard_links: bool,
    pub ignore_patterns: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_path: ".".to_string(),
            device_mount: None,
            connect_timeout_secs: 60,
            hard_links: false,
            ignore_patterns: vec!["*.DS_Store".to_string(), "*Thumbs.db".to_string()],
        }
    }
}

/// Defaults, then `Config.toml` if present, then `PHOTO_MIRROR_*` variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("library_path", defaults.library_path)?
        .set_default("connect_timeout_secs", defaults.connect_timeout_secs)?
        .set_default("hard_links", defaults.hard_links)?
        .set_default("ignore_patterns", defaults.ignore_patterns)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("PHOTO_MIRROR")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Compile glob ignore patterns, logging and dropping the invalid ones.
pub fn compile_ignore_patterns(globs: &[String]) -> Vec<Pattern> {
    globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}
