use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    errors::CoreResult,
    itinerary::{TripBook, TripCommand},
    layering::{compute_layout_with, CalendarLayout, Palette},
    storage::{Collection, StorageBackend},
    wallet::{WalletBook, WalletCommand},
};

/// Everything the engines operate on, as one immutable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub trips: TripBook,
    pub wallets: WalletBook,
}

impl AppState {
    pub fn apply_trip(&self, command: TripCommand) -> CoreResult<AppState> {
        Ok(AppState {
            trips: self.trips.apply(command)?,
            wallets: self.wallets.clone(),
        })
    }

    pub fn apply_wallet(&self, command: WalletCommand) -> CoreResult<AppState> {
        Ok(AppState {
            trips: self.trips.clone(),
            wallets: self.wallets.apply(command)?,
        })
    }

    pub fn layout(&self, palette: &Palette) -> CalendarLayout {
        compute_layout_with(self.trips.trips(), palette)
    }
}

/// Owns the current [`AppState`] and writes each changed collection back
/// through the backend after every successful command.
///
/// A failed write never rolls back the in-memory state; the collection stays
/// pending until [`StateManager::flush`] succeeds.
pub struct StateManager<B: StorageBackend> {
    backend: B,
    state: AppState,
    palette: Palette,
    pending: BTreeSet<Collection>,
}

impl<B: StorageBackend> StateManager<B> {
    /// Loads both collections and repairs any wallet balance drift.
    pub fn load(backend: B) -> CoreResult<Self> {
        Self::load_with_palette(backend, Palette::default())
    }

    pub fn load_with_palette(backend: B, palette: Palette) -> CoreResult<Self> {
        let trips = backend.load_trips()?;
        let mut wallets = backend.load_wallets()?;
        let repaired = wallets.reconcile();
        tracing::info!(
            trips = trips.len(),
            wallets = wallets.len(),
            "state loaded"
        );
        let mut manager = Self {
            backend,
            state: AppState { trips, wallets },
            palette,
            pending: BTreeSet::new(),
        };
        if !repaired.is_empty() {
            manager.persist(Collection::Wallets);
        }
        Ok(manager)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn layout(&self) -> CalendarLayout {
        self.state.layout(&self.palette)
    }

    pub fn dispatch_trip(&mut self, command: TripCommand) -> CoreResult<()> {
        self.state = self.state.apply_trip(command)?;
        self.persist(Collection::Trips);
        Ok(())
    }

    pub fn dispatch_wallet(&mut self, command: WalletCommand) -> CoreResult<()> {
        self.state = self.state.apply_wallet(command)?;
        self.persist(Collection::Wallets);
        Ok(())
    }

    /// Collections whose latest snapshot has not reached the backend.
    pub fn pending(&self) -> impl Iterator<Item = Collection> + '_ {
        self.pending.iter().copied()
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Retries every pending write; the first failure is returned.
    pub fn flush(&mut self) -> CoreResult<()> {
        let pending: Vec<Collection> = self.pending.iter().copied().collect();
        for collection in pending {
            self.write(collection)?;
            self.pending.remove(&collection);
        }
        Ok(())
    }

    /// Swaps in a stored backup and reloads that collection.
    pub fn restore_backup(&mut self, collection: Collection, backup_name: &str) -> CoreResult<()> {
        self.backend.restore_backup(collection, backup_name)?;
        match collection {
            Collection::Trips => self.state.trips = self.backend.load_trips()?,
            Collection::Wallets => {
                let mut wallets = self.backend.load_wallets()?;
                wallets.reconcile();
                self.state.wallets = wallets;
            }
        }
        self.pending.remove(&collection);
        Ok(())
    }

    fn persist(&mut self, collection: Collection) {
        match self.write(collection) {
            Ok(()) => {
                self.pending.remove(&collection);
            }
            Err(err) => {
                tracing::error!(
                    collection = collection.file_stem(),
                    error = %err,
                    "failed to persist state; will retry on flush"
                );
                self.pending.insert(collection);
            }
        }
    }

    fn write(&self, collection: Collection) -> CoreResult<()> {
        match collection {
            Collection::Trips => self.backend.save_trips(&self.state.trips),
            Collection::Wallets => self.backend.save_wallets(&self.state.wallets),
        }
    }
}
