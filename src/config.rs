//! Match configuration.
//!
//! Loaded from JSON; every field has a default so `{}` is a valid config.

use std::fs;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;

use crate::dice::DiceSource;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for one match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Seed for the dice. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl MatchConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        MatchConfig::from_json_str(&raw)
    }

    /// Applies a named option. Returns false for unknown names or values
    /// that do not parse.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> bool {
        match name.to_ascii_lowercase().as_str() {
            "seed" => match value {
                None | Some("none") => {
                    self.seed = None;
                    true
                }
                Some(v) => match v.parse::<u64>() {
                    Ok(seed) => {
                        self.seed = Some(seed);
                        true
                    }
                    Err(_) => false,
                },
            },
            _ => false,
        }
    }

    /// Builds the dice source this config asks for.
    pub fn dice(&self) -> Box<dyn DiceSource> {
        match self.seed {
            Some(seed) => Box::new(SmallRng::seed_from_u64(seed)),
            None => Box::new(SmallRng::from_entropy()),
        }
    }
}
