pub use config::ConfigError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

pub const DEFAULT_DATA_DIR: &str = "databases";
pub const DEFAULT_DAILY_XP_GOAL: u32 = 100;
pub const DEFAULT_STREAK_DAYS: u32 = 7;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ProgressConfig {
    pub daily_xp_goal: u32,
    pub streak_days: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub progress: ProgressConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: DEFAULT_DATA_DIR.to_string(),
            },
            progress: ProgressConfig {
                daily_xp_goal: DEFAULT_DAILY_XP_GOAL,
                streak_days: DEFAULT_STREAK_DAYS,
            },
        }
    }
}

impl AppConfig {
    /// Loads `config/default`, then `config/<RUN_MODE>`, then `LESSONFORGE__*`
    /// environment overrides, relative to the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let dir = config_dir.as_ref();
        let default_path = dir.join("default");
        let mode_path = dir.join(&run_mode);
        tracing::debug!(dir = %dir.display(), run_mode = %run_mode, "loading configuration");

        let builder = Config::builder()
            .set_default("storage.data_dir", DEFAULT_DATA_DIR)?
            .set_default("progress.daily_xp_goal", i64::from(DEFAULT_DAILY_XP_GOAL))?
            .set_default("progress.streak_days", i64::from(DEFAULT_STREAK_DAYS))?
            .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
            .add_source(File::with_name(&mode_path.to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("LESSONFORGE").separator("__"));

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(ConfigError::Message(
                "storage.data_dir must not be empty".to_string(),
            ));
        }
        if self.progress.streak_days == 0 {
            return Err(ConfigError::Message(
                "progress.streak_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_dir_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().join("absent")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_file_overrides_builtin_values() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[storage]\ndata_dir = \"modules\"\n\n[progress]\ndaily_xp_goal = 250\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.storage.data_dir, "modules");
        assert_eq!(config.progress.daily_xp_goal, 250);
        assert_eq!(config.progress.streak_days, DEFAULT_STREAK_DAYS);
    }

    #[test]
    fn zero_streak_window_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[progress]\nstreak_days = 0\n",
        )
        .unwrap();

        assert!(AppConfig::load_from(dir.path()).is_err());
    }
}
