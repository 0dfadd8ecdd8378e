//! Runtime Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line: `--steps 600 --swing 400 --config my.toml`
//! 2. Environment variables: `PUTT_STEPS`, `PUTT_TIMESTEP`, `PUTT_DEBUG`
//! 3. Config file: the path in `PUTT_CONFIG`, otherwise `putt.toml`
//! 4. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! steps = 600        # 0 runs the interactive command loop
//! timestep = 0.0166  # frame time handed to each step
//! swing = 400.0      # optional swing before a batch run
//! debug = false
//! level_file = "levels/custom.toml"
//!
//! [physics]
//! max_substeps = 4
//! drive_factor = 10.0
//! ```

use putt_level::LevelLayout;
use putt_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "putt.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frames to run in batch mode; 0 starts the command loop
    pub steps: u32,
    /// Frame time passed to every step
    pub timestep: f32,
    /// Swing applied before a batch run
    pub swing: Option<f32>,
    /// Enable debug logging
    pub debug: bool,
    /// Level layout to load instead of the built-in course
    pub level_file: Option<PathBuf>,
    /// Physics world settings
    pub physics: PhysicsConfig,
    /// Config file path (for reporting)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            steps: 0,
            timestep: 1.0 / 60.0,
            swing: None,
            debug: false,
            level_file: None,
            physics: PhysicsConfig::default(),
            config_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();

        let mut config = match lookup("PUTT_CONFIG") {
            Some(path) if !path.is_empty() => Self::load_from_file(path)?,
            _ if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load_from_file(DEFAULT_CONFIG_FILE)?,
            _ => Self::default(),
        };

        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded runtime config from {}", path.display());
        Ok(config)
    }

    /// Apply `PUTT_*` overrides read through `lookup`
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(steps) = lookup("PUTT_STEPS") {
            self.steps = parse_value("PUTT_STEPS", &steps)?;
            log::info!("Steps from env: {}", self.steps);
        }

        if let Some(timestep) = lookup("PUTT_TIMESTEP") {
            self.timestep = parse_timestep("PUTT_TIMESTEP", &timestep)?;
        }

        if let Some(debug) = lookup("PUTT_DEBUG") {
            self.debug = matches!(debug.as_str(), "1" | "true" | "yes" | "");
        }

        Ok(())
    }

    /// Apply command-line flags on top of the loaded configuration
    pub fn apply_args<I, S>(&mut self, args: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let flag = arg.as_ref().to_string();
            let mut value = || {
                args.next()
                    .map(|v| v.as_ref().to_string())
                    .ok_or_else(|| ConfigError::MissingValue(flag.clone()))
            };

            match flag.as_str() {
                "--steps" => self.steps = parse_value(&flag, &value()?)?,
                "--timestep" => self.timestep = parse_timestep(&flag, &value()?)?,
                "--swing" => self.swing = Some(parse_value(&flag, &value()?)?),
                "--level" => self.level_file = Some(PathBuf::from(value()?)),
                "--debug" => self.debug = true,
                // Consumed before the file is loaded
                "--config" => {
                    value()?;
                }
                _ => return Err(ConfigError::UnknownArgument(flag)),
            }
        }
        Ok(())
    }

    /// Whether a batch run was requested
    pub fn is_batch(&self) -> bool {
        self.steps > 0
    }

    /// The level to build: `level_file` if set, the built-in course otherwise
    pub fn level(&self) -> Result<LevelLayout, ConfigError> {
        let Some(path) = &self.level_file else {
            return Ok(LevelLayout::minigolf());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let layout = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("Loaded level from {}", path.display());
        Ok(layout)
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("=== Runtime Configuration ===");
        if let Some(path) = &self.config_path {
            log::info!("Config file: {}", path.display());
        }
        if self.is_batch() {
            log::info!("Mode: batch ({} steps)", self.steps);
        } else {
            log::info!("Mode: interactive");
        }
        log::info!("Frame time: {:.4}s", self.timestep);
        log::info!("Physics timestep: {:.4}s", self.physics.timestep);
        if let Some(path) = &self.level_file {
            log::info!("Level: {}", path.display());
        }
        log::info!("Debug: {}", self.debug);
        log::info!("=============================");
    }
}

/// Find `--config <path>` among the arguments
pub fn config_path_arg<S: AsRef<str>>(args: &[S]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a.as_ref() == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|p| PathBuf::from(p.as_ref()))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_timestep(key: &str, value: &str) -> Result<f32, ConfigError> {
    let timestep: f32 = parse_value(key, value)?;
    if !timestep.is_finite() || timestep <= 0.0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(timestep)
}
