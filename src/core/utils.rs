use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::CoreResult;

pub const HOME_ENV_VAR: &str = "DAYGO_HOME";
const DEFAULT_DIR_NAME: &str = ".daygo";
const DATA_DIR: &str = "data";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.daygo`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV_VAR) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Creates `path` and its parents when missing.
pub fn ensure_dir(path: &Path) -> CoreResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Layout of files under a base directory.
pub struct PathResolver;

impl PathResolver {
    /// `explicit` wins over the environment and the home directory.
    pub fn resolve_base(explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(app_data_dir)
    }

    pub fn data_dir_in(base: &Path) -> PathBuf {
        base.join(DATA_DIR)
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join(BACKUP_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_base_takes_precedence() {
        let base = PathResolver::resolve_base(Some(PathBuf::from("/tmp/daygo-test")));
        assert_eq!(base, PathBuf::from("/tmp/daygo-test"));
        assert_eq!(PathResolver::data_dir_in(&base), base.join("data"));
        assert_eq!(PathResolver::config_file_in(&base), base.join("config.json"));
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
