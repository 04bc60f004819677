//! Runtime configuration for embedding hosts.
//!
//! # Responsibility
//! - Resolve database location, autosave delay and default title.
//! - Read overrides from the process environment.
//!
//! # Invariants
//! - Resolution never fails; malformed overrides fall back to defaults.

use crate::autosave::DEFAULT_AUTOSAVE_DELAY;
use crate::model::note::DefaultTitle;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "QUICKNOTE_DB_PATH";
pub const AUTOSAVE_MS_ENV: &str = "QUICKNOTE_AUTOSAVE_MS";
pub const DEFAULT_TITLE_ENV: &str = "QUICKNOTE_DEFAULT_TITLE";

const DEFAULT_DB_FILE_NAME: &str = "quicknote.sqlite3";
const DATE_TITLE_KEYWORD: &str = "date";

/// Settings shared by the FFI layer and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub autosave_delay: Duration,
    pub default_title: DefaultTitle,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            default_title: DefaultTitle::default(),
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = read(AUTOSAVE_MS_ENV) {
            match raw.parse::<u64>() {
                Ok(millis) => config.autosave_delay = Duration::from_millis(millis),
                Err(_) => warn!(
                    "event=config_resolve module=core status=fallback key={} value={}",
                    AUTOSAVE_MS_ENV, raw
                ),
            }
        }

        if let Some(title) = read(DEFAULT_TITLE_ENV) {
            config.default_title = if title.eq_ignore_ascii_case(DATE_TITLE_KEYWORD) {
                DefaultTitle::DateDerived
            } else {
                DefaultTitle::Fixed(title)
            };
        }

        config
    }
}
