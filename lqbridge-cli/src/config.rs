//! Host configuration.
//!
//! Loaded from TOML. String values may reference the environment as `$VAR`
//! or `${VAR}`; references that do not resolve are kept verbatim, which is
//! how an unset mnemonic is detected.
//!
//! ```toml
//! network = "testnet"
//! mnemonic = "$LQB_MNEMONIC"
//! initial_balance_sat = 250000
//!
//! [bridge]
//! data_dir = "${HOME}/.lqbridge"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to the configuration file (default: `lqbridge.toml`)
//! - Anything referenced from the file, typically the mnemonic

use std::path::{Path, PathBuf};

use lqbridge::BridgeConfig;
use lqbridge::proto::WireValue;
use serde::Deserialize;

/// Default configuration path.
pub const DEFAULT_CONFIG_PATH: &str = "lqbridge.toml";

/// Failure to load the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The configuration path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`CliConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// Network used for the startup connect (default: `regtest`).
    #[serde(default = "default_network")]
    pub network: String,

    /// Wallet mnemonic. Without one, no session is opened at startup.
    #[serde(default)]
    pub mnemonic: Option<String>,

    /// Balance of freshly opened simulated wallets.
    #[serde(default)]
    pub initial_balance_sat: u64,

    /// Bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,
}

fn default_network() -> String {
    "regtest".to_owned()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            mnemonic: None,
            initial_balance_sat: 0,
            bridge: BridgeConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads `path`, expanding variables from the process environment. A
    /// missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    /// Parses TOML after expanding variables through `lookup`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for invalid TOML.
    pub fn parse<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(toml::from_str(&expand_vars(content, lookup))?)
    }

    /// The mnemonic, unless absent, blank or an unresolved reference.
    #[must_use]
    pub fn resolved_mnemonic(&self) -> Option<&str> {
        self.mnemonic
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty() && !m.starts_with('$'))
    }

    /// `ConnectRequest` document for the startup connect. The data directory
    /// is left to the bridge's default.
    #[must_use]
    pub fn connect_request(&self) -> Option<WireValue> {
        let mnemonic = self.resolved_mnemonic()?;
        Some(WireValue::map([
            ("mnemonic", WireValue::from(mnemonic)),
            ("network", WireValue::from(self.network.as_str())),
        ]))
    }
}

/// Replaces `$NAME` and `${NAME}` with `lookup(NAME)`. Unresolved or
/// malformed references are copied unchanged.
pub fn expand_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(at) = rest.find('$') {
        out.push_str(&rest[..at]);
        let tail = &rest[at + 1..];
        let (name, len) = match tail.strip_prefix('{') {
            Some(braced) => braced
                .find('}')
                .map_or(("", 0), |end| (&braced[..end], end + 2)),
            None => {
                let end = tail
                    .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                    .unwrap_or(tail.len());
                (&tail[..end], end)
            }
        };
        let reference = &rest[at..=at + len];
        let value = if name.is_empty() { None } else { lookup(name) };
        out.push_str(value.as_deref().unwrap_or(reference));
        rest = &rest[at + 1 + len..];
    }
    out.push_str(rest);
    out
}
