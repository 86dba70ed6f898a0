use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use weatherfy_forecast::{GeneratorBounds, ViewType, WeatherUnit};

use crate::error::ConfigError;

const APP_DIR: &str = "weatherfy";
const CONFIG_FILE: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Bounds for synthetic forecasts
    #[serde(default)]
    pub forecast: GeneratorBounds,

    /// Controller behaviour and initial view settings
    #[serde(default)]
    pub controller: ControllerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Duration of one UI transition; errors stay on screen for twice this
    #[serde(default = "default_animation_duration_ms")]
    pub animation_duration_ms: u64,

    /// City shown before any location or search result arrives
    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default)]
    pub weather_unit: WeatherUnit,

    #[serde(default)]
    pub view_type: ViewType,
}

fn default_animation_duration_ms() -> u64 {
    1000
}

fn default_city() -> String {
    weatherfy_forecast::repository::DEFAULT_CITY.to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            animation_duration_ms: default_animation_duration_ms(),
            default_city: default_city(),
            weather_unit: WeatherUnit::default(),
            view_type: ViewType::default(),
        }
    }
}

impl ControllerConfig {
    /// How long the error state is held before reverting to idle.
    pub fn error_cooldown(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms.saturating_mul(2))
    }
}

impl Config {
    /// Load configuration from the user config directory, creating the
    /// default file if it doesn't exist.
    ///
    /// # Errors
    /// Fails when the config directory is unknown or the file can't be
    /// read, parsed or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if missing.
    ///
    /// # Errors
    /// Fails when the file can't be read, parsed or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration and validate it, logging any warnings.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` when validation reports errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        let bounds = &self.forecast;
        if bounds.max_temperature <= 0 {
            result.add_error(
                "forecast.max_temperature",
                "Maximum temperature must be greater than 0",
            );
        }
        for (field, value) in [
            ("forecast.max_wind_speed", bounds.max_wind_speed),
            ("forecast.max_precipitation", bounds.max_precipitation),
        ] {
            if value <= 0 {
                result.add_error(field, "Value must be greater than 0");
            } else if value > 100 {
                result.add_error(field, "Value must not exceed 100");
            }
        }

        if self.controller.default_city.trim().is_empty() {
            result.add_error("controller.default_city", "Default city must not be empty");
        }

        if self.controller.animation_duration_ms == 0 {
            result.add_warning(
                "controller.animation_duration_ms",
                "Errors will clear immediately (0 ms)",
            );
        } else if self.controller.animation_duration_ms > 10_000 {
            result.add_warning(
                "controller.animation_duration_ms",
                "Animation duration is unusually long (>10s)",
            );
        }

        result
    }

    /// Save configuration to the user config directory.
    ///
    /// # Errors
    /// Fails when the config directory is unknown or the file can't be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// Fails when serialization or any filesystem write fails.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(write_err)?;

        Ok(())
    }

    /// Path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }
}
