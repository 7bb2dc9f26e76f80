//! Persistent defaults, stored with `confy` under the `svcbind` app name

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const APP_NAME: &str = "svcbind";

/// Defaults for the global flags; the flags and their environment variables win
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub devfile: Option<PathBuf>,
    pub namespace: Option<String>,
}

impl CliConfig {
    /// Read the configuration file if there is one. A missing or unreadable
    /// file yields the defaults.
    pub fn load() -> Self {
        let path = match confy::get_configuration_file_path(APP_NAME, None) {
            Ok(path) => path,
            Err(e) => {
                debug!("no configuration location: {e}");
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        match confy::load_path(&path) {
            Ok(config) => {
                debug!("loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("ignoring configuration {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
