use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    config::Config,
    core::utils::{ensure_dir, PathResolver},
    errors::{CoreError, CoreResult},
    itinerary::TripBook,
    wallet::WalletBook,
};

use super::{Collection, Envelope, StorageBackend};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// One pretty-printed JSON file per collection under `<root>/data`, with the
/// previous version copied to `<root>/backups/<collection>/` before each save.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> CoreResult<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let data_dir = PathResolver::data_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&data_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            data_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> CoreResult<Self> {
        Self::new(None, None)
    }

    pub fn from_config(config: &Config) -> CoreResult<Self> {
        Self::new(config.data_dir.clone(), Some(config.backup_retention))
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", collection.file_stem(), FILE_EXTENSION))
    }

    fn backup_dir(&self, collection: Collection) -> PathBuf {
        self.backups_dir.join(collection.file_stem())
    }

    pub fn backup_path(&self, collection: Collection, backup_name: &str) -> PathBuf {
        self.backup_dir(collection).join(backup_name)
    }

    fn load_collection<T>(&self, collection: Collection) -> CoreResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.collection_path(collection);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no saved data; starting empty");
            return Ok(T::default());
        }
        read_envelope(&path)
    }

    fn save_collection<T: Serialize>(&self, collection: Collection, items: &T) -> CoreResult<()> {
        let path = self.collection_path(collection);
        if path.exists() {
            self.backup_existing_file(collection, &path)?;
        }
        let json = serde_json::to_string_pretty(&Envelope::new(items))?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), "collection saved");
        Ok(())
    }

    fn backup_existing_file(&self, collection: Collection, path: &Path) -> CoreResult<()> {
        let dir = self.backup_dir(collection);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_name = format!(
            "{}_{}.{}",
            collection.file_stem(),
            timestamp,
            FILE_EXTENSION
        );
        fs::copy(path, dir.join(&backup_name))?;
        self.prune_backups(collection)?;
        Ok(())
    }

    fn prune_backups(&self, collection: Collection) -> CoreResult<()> {
        let backups = self.list_backups(collection)?;
        for entry in backups.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(self.backup_path(collection, entry)) {
                tracing::warn!(backup = %entry, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load_trips(&self) -> CoreResult<TripBook> {
        self.load_collection(Collection::Trips)
    }

    fn save_trips(&self, trips: &TripBook) -> CoreResult<()> {
        self.save_collection(Collection::Trips, trips)
    }

    fn load_wallets(&self) -> CoreResult<WalletBook> {
        self.load_collection(Collection::Wallets)
    }

    fn save_wallets(&self, wallets: &WalletBook) -> CoreResult<()> {
        self.save_collection(Collection::Wallets, wallets)
    }

    fn list_backups(&self, collection: Collection) -> CoreResult<Vec<String>> {
        let dir = self.backup_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn restore_backup(&self, collection: Collection, backup_name: &str) -> CoreResult<()> {
        let backup_path = self.backup_path(collection, backup_name);
        if !backup_path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        // Refuse to install a backup that would not load.
        match collection {
            Collection::Trips => read_envelope::<TripBook>(&backup_path).map(|_| ())?,
            Collection::Wallets => read_envelope::<WalletBook>(&backup_path).map(|_| ())?,
        }
        let target = self.collection_path(collection);
        let tmp = tmp_path(&target);
        fs::copy(&backup_path, &tmp)?;
        fs::rename(&tmp, &target)?;
        tracing::info!(backup = %backup_name, collection = collection.file_stem(), "backup restored");
        Ok(())
    }
}

fn read_envelope<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let data = fs::read_to_string(path)?;
    let envelope: Envelope<T> = serde_json::from_str(&data).map_err(|err| {
        CoreError::Storage(format!("failed to parse `{}`: {}", path.display(), err))
    })?;
    envelope.into_items()
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", FILE_EXTENSION))?;
    let segments: Vec<&str> = trimmed.split('_').collect();
    if segments.len() < 3 {
        return None;
    }
    let time_part = segments.last()?;
    let date_part = segments.get(segments.len() - 2)?;
    if !is_digits(date_part, 8) || !is_digits(time_part, 6) {
        return None;
    }
    let raw = format!("{}{}", date_part, time_part);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
