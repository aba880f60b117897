pub mod json_backend;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{CoreError, CoreResult},
    itinerary::TripBook,
    wallet::WalletBook,
};

/// Current version of the on-disk envelope.
pub const SCHEMA_VERSION: u32 = 1;

/// The independently persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Trips,
    Wallets,
}

impl Collection {
    pub fn file_stem(&self) -> &'static str {
        match self {
            Collection::Trips => "trips",
            Collection::Wallets => "wallets",
        }
    }
}

/// Versioned wrapper written around every persisted collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub items: T,
}

impl<T> Envelope<T> {
    pub fn new(items: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            items,
        }
    }

    /// Rejects files written by a newer schema.
    pub fn into_items(self) -> CoreResult<T> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "schema version {} is newer than supported {}",
                self.schema_version, SCHEMA_VERSION
            )));
        }
        Ok(self.items)
    }
}

/// Durable home for the trip and wallet collections.
///
/// Loading a collection that was never saved yields an empty one. Every save
/// replaces the whole collection.
pub trait StorageBackend: Send + Sync {
    fn load_trips(&self) -> CoreResult<TripBook>;
    fn save_trips(&self, trips: &TripBook) -> CoreResult<()>;
    fn load_wallets(&self) -> CoreResult<WalletBook>;
    fn save_wallets(&self, wallets: &WalletBook) -> CoreResult<()>;

    /// Backup names for `collection`, newest first.
    fn list_backups(&self, _collection: Collection) -> CoreResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Replaces the live file of `collection` with the named backup.
    fn restore_backup(&self, collection: Collection, backup_name: &str) -> CoreResult<()> {
        Err(CoreError::Storage(format!(
            "backup `{}` of {} not available",
            backup_name,
            collection.file_stem()
        )))
    }
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
