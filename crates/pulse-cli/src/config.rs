use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use pulse_notify::NotifyConfig;
use pulse_store::{DEFAULT_HISTORY_LIMIT, DEFAULT_QUOTA_BYTES};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub history_limit: usize,
    pub quota_bytes: u64,
    pub notify: NotifyConfig,
}

impl Config {
    /// Read `PULSE_*` variables. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path: PathBuf = lookup("PULSE_DB_PATH")
            .unwrap_or_else(|| "pulse.db".into())
            .into();

        let history_limit: usize = match lookup("PULSE_HISTORY_LIMIT") {
            Some(v) => v.parse().context("PULSE_HISTORY_LIMIT must be an integer")?,
            None => DEFAULT_HISTORY_LIMIT,
        };

        let quota_bytes: u64 = match lookup("PULSE_STORAGE_QUOTA_BYTES") {
            Some(v) => v
                .parse()
                .context("PULSE_STORAGE_QUOTA_BYTES must be an integer")?,
            None => DEFAULT_QUOTA_BYTES,
        };

        let mut notify = NotifyConfig::default();
        if let Some(v) = lookup("PULSE_TOAST_DURATION_MS") {
            let ms: u64 = v.parse().context("PULSE_TOAST_DURATION_MS must be an integer")?;
            notify.default_toast_duration = Duration::from_millis(ms);
        }

        Ok(Self {
            db_path,
            history_limit,
            quota_bytes,
            notify,
        })
    }
}
