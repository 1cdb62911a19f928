use std::path::PathBuf;

use anyhow::{Result, bail};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://indoor-climate.sqlite";

/// Door steps are estimated per day, so a longer cap is meaningless.
pub const MAX_DOOR_STEP_MINUTES: i64 = 24 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub data: DataConfig,
    pub display: DisplayConfig,
    pub door: DoorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// CSV export used to seed an empty database.
    pub csv_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("TempFuktData.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Number of rows printed per ranking.
    pub top_n: usize,
    /// Decimal places for printed values.
    pub decimals: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            decimals: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DoorConfig {
    pub open_indoor_drop_c: f64,
    pub open_outdoor_rise_c: f64,
    pub close_indoor_rise_c: f64,
    pub close_outdoor_drop_c: f64,
    pub max_step_minutes: i64,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            open_indoor_drop_c: 0.3,
            open_outdoor_rise_c: 0.3,
            close_indoor_rise_c: 0.2,
            close_outdoor_drop_c: 0.2,
            max_step_minutes: 5,
        }
    }
}

impl DoorConfig {
    /// Reject thresholds the door automaton cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_DOOR_STEP_MINUTES).contains(&self.max_step_minutes) {
            bail!(
                "door.max_step_minutes must be between 0 and {}, got {}",
                MAX_DOOR_STEP_MINUTES,
                self.max_step_minutes
            );
        }

        let thresholds = [
            ("open_indoor_drop_c", self.open_indoor_drop_c),
            ("open_outdoor_rise_c", self.open_outdoor_rise_c),
            ("close_indoor_rise_c", self.close_indoor_rise_c),
            ("close_outdoor_drop_c", self.close_outdoor_drop_c),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                bail!("door.{name} must be a non-negative number, got {value}");
            }
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("indoor-climate");

        let builder = Config::builder()
            // 1. Defaults
            .set_default("database.url", database_url)?
            .set_default("data.csv_path", "TempFuktData.csv")?
            .set_default("display.top_n", 10)?
            .set_default("display.decimals", 1)?
            .set_default("door.open_indoor_drop_c", 0.3)?
            .set_default("door.open_outdoor_rise_c", 0.3)?
            .set_default("door.close_indoor_rise_c", 0.2)?
            .set_default("door.close_outdoor_drop_c", 0.2)?
            .set_default("door.max_step_minutes", 5)?
            // 2. Local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))
            // 3. User config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))
            // 4. Environment variables (CLIMATE__DISPLAY__TOP_N=20)
            .add_source(Environment::with_prefix("CLIMATE").separator("__"));

        let s = builder.build()?;
        let config: Self = s.try_deserialize()?;
        config.door.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Default Value Tests ====================

    #[test]
    fn test_database_config_defaults() {
        assert_eq!(DatabaseConfig::default().url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_data_config_defaults() {
        assert_eq!(
            DataConfig::default().csv_path,
            PathBuf::from("TempFuktData.csv")
        );
    }

    #[test]
    fn test_display_config_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.decimals, 1);
    }

    #[test]
    fn test_door_config_defaults_are_asymmetric() {
        let config = DoorConfig::default();
        assert_eq!(config.open_indoor_drop_c, 0.3);
        assert_eq!(config.open_outdoor_rise_c, 0.3);
        assert_eq!(config.close_indoor_rise_c, 0.2);
        assert_eq!(config.close_outdoor_drop_c, 0.2);
        assert_eq!(config.max_step_minutes, 5);
        assert!(config.open_indoor_drop_c > config.close_indoor_rise_c);
    }

    #[test]
    fn test_door_config_matches_threshold_defaults() {
        let from_config = crate::door::DoorThresholds::from(&DoorConfig::default());
        assert_eq!(from_config, crate::door::DoorThresholds::default());
    }

    #[test]
    fn test_door_config_validate_accepts_defaults() {
        assert!(DoorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_door_config_rejects_negative_step_cap() {
        let config = DoorConfig {
            max_step_minutes: -1,
            ..DoorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_step_minutes"));
    }

    #[test]
    fn test_door_config_rejects_oversized_step_cap() {
        let config = DoorConfig {
            max_step_minutes: i64::MAX,
            ..DoorConfig::default()
        };
        assert!(config.validate().is_err());

        let one_day = DoorConfig {
            max_step_minutes: MAX_DOOR_STEP_MINUTES,
            ..DoorConfig::default()
        };
        assert!(one_day.validate().is_ok());
    }

    #[test]
    fn test_door_config_rejects_bad_thresholds() {
        let negative = DoorConfig {
            close_indoor_rise_c: -0.2,
            ..DoorConfig::default()
        };
        assert!(negative.validate().is_err());

        let nan = DoorConfig {
            open_outdoor_rise_c: f64::NAN,
            ..DoorConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    // ==================== Config Loading Tests ====================

    #[test]
    fn test_config_load_with_defaults() {
        let result = AppConfig::load();
        assert!(result.is_ok(), "{:?}", result.err());
    }

    #[test]
    fn test_loaded_config_has_expected_structure() {
        let config = AppConfig::load().expect("Config should load");

        assert!(!config.database.url.is_empty());
        assert!(!config.data.csv_path.as_os_str().is_empty());
        assert!(config.door.max_step_minutes > 0);
    }

    // ==================== Environment Variable Override Tests ====================

    /// Helper to set and remove an environment variable around a closure.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // SAFETY: Test environment, keys are unique per test
        unsafe {
            std::env::set_var(key, value);
        }
        let result = f();
        unsafe {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_env_var_overrides_top_n() {
        let config = with_env_var("CLIMATE__DISPLAY__TOP_N", "25", || {
            AppConfig::load().expect("Config should load")
        });
        assert_eq!(config.display.top_n, 25);
    }

    #[test]
    fn test_env_var_overrides_door_step_cap() {
        let config = with_env_var("CLIMATE__DOOR__MAX_STEP_MINUTES", "10", || {
            AppConfig::load().expect("Config should load")
        });
        assert_eq!(config.door.max_step_minutes, 10);
    }

    #[test]
    fn test_env_var_overrides_csv_path() {
        let config = with_env_var("CLIMATE__DATA__CSV_PATH", "/tmp/readings.csv", || {
            AppConfig::load().expect("Config should load")
        });
        assert_eq!(config.data.csv_path, PathBuf::from("/tmp/readings.csv"));
    }
}
