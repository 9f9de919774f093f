//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Simulation settings.
    pub simulation: SimulationConfig,
    /// Item arbitration rules for the demo collaborators.
    pub items: ItemRulesConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (Hz).
    pub tick_rate: u32,
}

/// Item arbitration rules: which item kinds are restricted, which may not
/// be crafted with, and what bound items do when used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ItemRulesConfig {
    /// Item kinds that may not be stored in ordinary inventories.
    pub restricted_kinds: Vec<u16>,
    /// Item kinds that may not be used as crafting ingredients.
    pub craft_banned_kinds: Vec<u16>,
    /// Per-kind usage bindings.
    pub bindings: Vec<ItemBinding>,
}

/// What using an item of a given kind does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemBinding {
    /// Item kind the binding applies to.
    pub kind: u16,
    /// Cancel the host's default behavior for the use event.
    pub cancel_use: bool,
    /// Commands to dispatch, in order.
    pub commands: Vec<CommandSpec>,
    /// Feedback message for the acting player.
    pub message: Option<String>,
}

/// One command dispatched by an item binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandSpec {
    /// Full command text.
    pub command: String,
    /// Execute under the privileged console principal instead of the
    /// acting player.
    pub as_console: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { tick_rate: 20 }
    }
}

impl Default for ItemRulesConfig {
    fn default() -> Self {
        Self {
            restricted_kinds: vec![900],
            craft_banned_kinds: vec![900],
            bindings: vec![ItemBinding {
                kind: 900,
                cancel_use: true,
                commands: vec![CommandSpec {
                    command: "give diamond".to_string(),
                    as_console: true,
                }],
                message: Some("You got a diamond!".to_string()),
            }],
        }
    }
}

/// Default configuration directory (`<platform config dir>/aegis`).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aegis")
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
