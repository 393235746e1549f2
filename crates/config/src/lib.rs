//! # Config - environment-driven settings for the cookie shell
//!
//! ```text
//! BINCOOKIE_PATH        cookie file path             (default: "Cookies.binarycookies")
//! BINCOOKIE_PAGE_BYTES  page budget when re-encoding (default: 4096)
//! BINCOOKIE_BACKUP      keep <path>.bak on save      (default: "true")
//! BINCOOKIE_UNTRUSTED_CHECKSUM
//!                       save edited files with the   (default: "false")
//!                       checksum they were read with
//! ```
//!
//! Unparsable values fall back to the default.

use bincookie::{page_header_len, EncodeOptions, DEFAULT_PAGE_BUDGET, RECORD_HEADER_BYTES};
use std::path::PathBuf;

pub const ENV_PATH: &str = "BINCOOKIE_PATH";
pub const ENV_PAGE_BYTES: &str = "BINCOOKIE_PAGE_BYTES";
pub const ENV_BACKUP: &str = "BINCOOKIE_BACKUP";
pub const ENV_UNTRUSTED_CHECKSUM: &str = "BINCOOKIE_UNTRUSTED_CHECKSUM";

pub const DEFAULT_PATH: &str = "Cookies.binarycookies";

/// Smallest accepted page budget: one header plus one empty record.
pub const MIN_PAGE_BYTES: usize = page_header_len(1) + RECORD_HEADER_BYTES + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub path: PathBuf,
    pub page_bytes: usize,
    pub backup: bool,
    pub untrusted_checksum: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            page_bytes: DEFAULT_PAGE_BUDGET,
            backup: true,
            untrusted_checksum: false,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let path = lookup(ENV_PATH).map(PathBuf::from).unwrap_or(defaults.path);
        let page_bytes = lookup(ENV_PAGE_BYTES)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.page_bytes)
            .max(MIN_PAGE_BYTES);
        let backup = lookup(ENV_BACKUP)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.backup);
        let untrusted_checksum = lookup(ENV_UNTRUSTED_CHECKSUM)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.untrusted_checksum);
        Self {
            path,
            page_bytes,
            backup,
            untrusted_checksum,
        }
    }

    #[must_use]
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            page_budget: self.page_bytes,
        }
    }
}
