use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, PathResolver},
    currency::CurrencyCode,
    errors::{CoreError, CoreResult},
    layering::Palette,
    storage::json_backend::{tmp_path, write_atomic, DEFAULT_RETENTION},
};

/// User preferences stored as `config.json` in the app data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Overrides where collections are stored. Defaults to the app data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default = "Config::default_currency_value")]
    pub default_currency: String,
    #[serde(default)]
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            backup_retention: Self::default_backup_retention(),
            default_currency: Self::default_currency_value(),
            palette: Palette::default(),
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        DEFAULT_RETENTION
    }

    pub fn default_currency_value() -> String {
        "KRW".into()
    }

    pub fn default_currency_code(&self) -> CoreResult<CurrencyCode> {
        Ok(CurrencyCode::parse(&self.default_currency)?)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.backup_retention == 0 {
            return Err(CoreError::Config("backup_retention must be at least 1".into()));
        }
        self.default_currency_code()
            .map(|_| ())
            .map_err(|err| CoreError::Config(err.to_string()))
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> CoreResult<Self> {
        Self::with_base_dir(PathResolver::resolve_base(None))
    }

    pub fn with_base_dir(base: PathBuf) -> CoreResult<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Defaults when no file has been written yet.
    pub fn load(&self) -> CoreResult<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data).map_err(|err| {
            CoreError::Config(format!("invalid `{}`: {}", self.path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> CoreResult<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_currency, "KRW");
        assert_eq!(config.backup_retention, 5);
        assert_eq!(config.palette.len(), 7);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            data_dir: Some(temp.path().join("elsewhere")),
            backup_retention: 2,
            default_currency: "JPY".into(),
            palette: Palette::new(vec!["#000000".into()]).unwrap(),
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!tmp_path(manager.path()).exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"default_currency": "usd"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.backup_retention, 5);
        assert_eq!(config.default_currency_code().unwrap().as_str(), "USD");
    }

    #[test]
    fn rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            backup_retention: 0,
            ..Config::default()
        };
        assert!(matches!(manager.save(&config), Err(CoreError::Config(_))));

        fs::write(manager.path(), r#"{"palette": []}"#).unwrap();
        assert!(matches!(manager.load(), Err(CoreError::Config(_))));
    }
}
