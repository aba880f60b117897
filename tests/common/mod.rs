#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use daygo_core::{
    config::ConfigManager,
    storage::JsonStorage,
    StateManager,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated state manager and config manager sharing one directory.
pub fn setup_test_env() -> (StateManager<JsonStorage>, ConfigManager) {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage backend");
    let state = StateManager::load(storage).expect("load state");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (state, config_manager)
}

pub fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).expect("valid january date")
}
