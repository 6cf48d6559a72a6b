pub mod config;

pub use config::ConfigStorage;

use std::path::PathBuf;

/// Default directory holding `config.json`.
///
/// Falls back to the current directory on platforms without a config dir.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("httprpc")
}

