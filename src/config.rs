// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! A small JSON file holds the defaults for the live scanner; command-line
//! flags always win over it. A missing or unreadable file silently falls
//! back to the built-in defaults; the file is a convenience, not a
//! requirement.

use crate::decode::DecoderBackend;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera device index (0 for /dev/video0)
    pub device: usize,
    /// Decoding strategy for the live scanner
    pub decoder: DecoderBackend,
    /// Whether the enhancement pipeline runs before decoding
    pub enhance: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: 0,
            decoder: DecoderBackend::default(),
            enhance: true,
        }
    }
}

impl Config {
    /// Path of the config file, if a config directory exists on this system.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dimscan").join("config.json"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scans_device_zero_with_enhancement() {
        let config = Config::default();
        assert_eq!(config.device, 0);
        assert_eq!(config.decoder, DecoderBackend::MultiSymbol);
        assert!(config.enhance);
    }

    #[test]
    fn partial_config_files_keep_defaults_for_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"decoder":"qr-native"}"#).unwrap();
        assert_eq!(config.decoder, DecoderBackend::QrNative);
        assert_eq!(config.device, 0);
        assert!(config.enhance);
    }
}
