use crate::core::{
    DEFAULT_AUDIT_THRESHOLD_PERCENT, DEFAULT_BLOCK_REWARD, DEFAULT_DIFFICULTY, MAX_DIFFICULTY,
};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const DIFFICULTY_KEY: &str = "AUDIT_CHAIN_DIFFICULTY";
const BLOCK_REWARD_KEY: &str = "AUDIT_CHAIN_BLOCK_REWARD";
const AUDIT_THRESHOLD_KEY: &str = "AUDIT_CHAIN_AUDIT_THRESHOLD";
const LOG_LEVEL_KEY: &str = "AUDIT_CHAIN_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits every block hash needs
    pub difficulty: u32,
    /// Value paid by `system` to the miner of each block
    pub block_reward: u64,
    /// Minimum compliance score, in percent
    pub audit_threshold_percent: u32,
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            difficulty: DEFAULT_DIFFICULTY,
            block_reward: DEFAULT_BLOCK_REWARD,
            audit_threshold_percent: DEFAULT_AUDIT_THRESHOLD_PERCENT,
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Defaults, then the file if given, then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<LedgerConfig> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => LedgerConfig::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<LedgerConfig> {
        let contents = fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<LedgerConfig> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(difficulty) = env_parse(DIFFICULTY_KEY)? {
            self.difficulty = difficulty;
        }
        if let Some(reward) = env_parse(BLOCK_REWARD_KEY)? {
            self.block_reward = reward;
        }
        if let Some(threshold) = env_parse(AUDIT_THRESHOLD_KEY)? {
            self.audit_threshold_percent = threshold;
        }
        if let Ok(level) = env::var(LOG_LEVEL_KEY) {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "difficulty {} exceeds the {MAX_DIFFICULTY} hex digits of a hash",
                self.difficulty
            )));
        }
        if !(1..=100).contains(&self.audit_threshold_percent) {
            return Err(LedgerError::Config(format!(
                "audit threshold must be between 1 and 100 percent, got {}",
                self.audit_threshold_percent
            )));
        }
        if log::LevelFilter::from_str(&self.log_level).is_err() {
            return Err(LedgerError::Config(format!(
                "unknown log level: {}",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LedgerError::Config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}
