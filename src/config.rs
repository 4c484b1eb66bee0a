use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "uni_scraper";
const ENV_PREFIX: &str = "UNI_SCRAPER";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the SQLite artifact holding both tables.
    pub output: PathBuf,
    /// Courses kept per institution, real or placeholder.
    pub batch_size: usize,
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Copy the previous artifact aside before replacing it.
    pub keep_backup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output: PathBuf::from("data/universities_and_courses.sqlite"),
            batch_size: 5,
            request_delay_ms: 1000,
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            keep_backup: false,
        }
    }
}

impl Settings {
    /// `uni_scraper.toml` (optional), then `UNI_SCRAPER_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::from_sources(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;
        if settings.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }
        Ok(settings)
    }
}
