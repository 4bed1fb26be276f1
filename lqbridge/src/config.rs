//! Bridge configuration.
//!
//! Usually embedded as the `[bridge]` table of a host's TOML config.
//!
//! ```toml
//! [bridge]
//! data_dir = "/var/lib/wallet"
//! create_data_dir = true
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Message of the failure raised when the data directory is unusable.
pub const DATA_DIR_ERROR: &str = "Mandatory field dataDir must contain a writable directory";

/// Settings applied by the bridge around `connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Directory substituted when a connect request has no `dataDir`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Create the data directory before contacting the SDK (default: `true`).
    #[serde(default = "default_create_data_dir")]
    pub create_data_dir: bool,
}

const fn default_create_data_dir() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            create_data_dir: default_create_data_dir(),
        }
    }
}

impl BridgeConfig {
    /// Sets the default data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Resolves the data directory for a request, preferring the request's
    /// own value.
    #[must_use]
    pub fn resolve_data_dir(&self, requested: Option<&str>) -> Option<PathBuf> {
        requested
            .map(PathBuf::from)
            .or_else(|| self.data_dir.clone())
    }

    /// Creates `dir` when configured to.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be created.
    pub fn prepare_data_dir(&self, dir: &std::path::Path) -> std::io::Result<()> {
        if self.create_data_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_toml() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert!(config.create_data_dir);
    }

    #[test]
    fn reads_toml_table() {
        let config: BridgeConfig =
            toml::from_str("data_dir = \"/srv/wallet\"\ncreate_data_dir = false\n").unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/wallet")));
        assert!(!config.create_data_dir);
    }

    #[test]
    fn request_dir_wins_over_default() {
        let config = BridgeConfig::default().with_data_dir("/default");
        assert_eq!(
            config.resolve_data_dir(Some("/mine")),
            Some(PathBuf::from("/mine"))
        );
        assert_eq!(config.resolve_data_dir(None), Some(PathBuf::from("/default")));
        assert_eq!(BridgeConfig::default().resolve_data_dir(None), None);
    }
}
