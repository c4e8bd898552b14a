//! Configuration loading for the traverse server

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use traverse_core::{ActionOptions, CommandEngine, DryRunEngine, Engine, OptionLimits, Paths};

use crate::options::OptionsBuilder;

/// Server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Automation engine to drive
    pub engine: EngineConfig,

    /// Default options record, before per-call overrides
    pub defaults: ActionOptions,

    /// Upper bounds for timing options
    pub limits: OptionLimits,
}

/// Out-of-process engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Helper program; when unset the dry-run engine is used
    pub command: Option<String>,

    /// Extra arguments passed to the helper
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from `path`, or the standard location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if !config_path.exists() {
            if path.is_some() {
                warn!("Config file {:?} not found, using defaults", config_path);
            }
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Paths::new().config_file()
    }

    /// Options builder seeded with the configured defaults and limits
    pub fn options_builder(&self) -> OptionsBuilder {
        OptionsBuilder::new(self.defaults.clone(), self.limits)
    }

    /// Instantiate the configured engine
    pub fn build_engine(&self, dry_run: bool) -> Box<dyn Engine> {
        match (&self.engine.command, dry_run) {
            (Some(command), false) => {
                info!("Using engine command {}", command);
                Box::new(CommandEngine::new(command, self.engine.args.clone()))
            }
            (None, false) => {
                warn!("No engine command configured, actions will not be performed");
                Box::new(DryRunEngine)
            }
            (_, true) => Box::new(DryRunEngine),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render config as TOML")
    }
}
