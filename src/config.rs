//! Store configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::StoreError;

pub const ENV_DATA_DIR: &str = "RECORD_STORE_DATA_DIR";
pub const ENV_READ_ONLY: &str = "RECORD_STORE_READ_ONLY";
pub const ENV_LOCK_TIMEOUT_MS: &str = "RECORD_STORE_LOCK_TIMEOUT_MS";
pub const ENV_PRETTY: &str = "RECORD_STORE_PRETTY";

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one `<collection>.json` per collection.
    pub data_dir: PathBuf,
    /// Treat the durable medium as unwritable from the start. Every
    /// collection that gets mutated runs from volatile memory.
    pub read_only: bool,
    /// How long a mutation waits for its collection's lock before giving
    /// up. `None` waits indefinitely.
    pub lock_timeout: Option<Duration>,
    /// Pretty-print snapshot JSON.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            read_only: false,
            lock_timeout: None,
            pretty: true,
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Defaults overridden by `RECORD_STORE_*` environment variables.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_READ_ONLY) {
            config.read_only = parse_flag(ENV_READ_ONLY, &value)?;
        }
        if let Some(value) = lookup(ENV_LOCK_TIMEOUT_MS) {
            let millis: u64 = value.trim().parse().map_err(|_| {
                StoreError::Config(format!(
                    "{} must be milliseconds, got {:?}",
                    ENV_LOCK_TIMEOUT_MS, value
                ))
            })?;
            config.lock_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(value) = lookup(ENV_PRETTY) {
            config.pretty = parse_flag(ENV_PRETTY, &value)?;
        }

        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, StoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(StoreError::Config(format!(
            "{} must be a boolean, got {:?}",
            key, value
        ))),
    }
}
