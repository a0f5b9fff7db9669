use anyhow::{bail, Context, Result};
use chrono::Duration;
use debtbar_core::{
    CollapseRules, TrackerConfig, UnitNoun, DEFAULT_INITIAL_DEBT, DEFAULT_PAGE_SIZE,
    DEFAULT_TTL_SECS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::state::ensure_debtbar_home;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub ledger: LedgerSection,
    pub cache: CacheSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSection {
    /// Site hosting the store functions
    pub base_url: String,
    /// Debt before any entry was recorded
    pub initial: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSection {
    pub ttl_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogSection {
    pub page_size: usize,
    pub unit_singular: String,
    pub unit_plural: String,
    #[serde(default)]
    pub collapse: CollapseRules,
}

impl Default for Config {
    fn default() -> Self {
        let unit = UnitNoun::default();
        Self {
            ledger: LedgerSection {
                base_url: "http://localhost:8888".to_string(),
                initial: DEFAULT_INITIAL_DEBT,
            },
            cache: CacheSection {
                ttl_secs: DEFAULT_TTL_SECS,
            },
            log: LogSection {
                page_size: DEFAULT_PAGE_SIZE,
                unit_singular: unit.singular,
                unit_plural: unit.plural,
                collapse: CollapseRules::default(),
            },
        }
    }
}

impl Config {
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            initial: self.ledger.initial,
            page_size: self.log.page_size,
            collapse: self.log.collapse.clone(),
        }
    }

    /// Cache lifetime. Negative or unrepresentable values are config errors.
    pub fn ttl(&self) -> Result<Duration> {
        let secs = self.cache.ttl_secs;
        if secs < 0 {
            bail!("cache.ttl_secs must not be negative (got {secs})");
        }
        Duration::try_seconds(secs)
            .with_context(|| format!("cache.ttl_secs out of range (got {secs})"))
    }

    pub fn unit(&self) -> UnitNoun {
        UnitNoun::new(&self.log.unit_singular, &self.log.unit_plural)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_debtbar_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_at(&config_path()?)
}

pub fn load_config_at(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config_at(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(PathBuf),
    /// An existing file is left as it is
    AlreadyExists(PathBuf),
}

pub fn init_config() -> Result<InitOutcome> {
    init_config_at(&config_path()?)
}

pub fn init_config_at(path: &Path) -> Result<InitOutcome> {
    if path.exists() {
        info!(path = %path.display(), "config already present");
        return Ok(InitOutcome::AlreadyExists(path.to_path_buf()));
    }
    save_config_at(path, &Config::default())?;
    info!(path = %path.display(), "wrote default config");
    Ok(InitOutcome::Created(path.to_path_buf()))
}
