use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, MutexGuard,
};

use crate::{
    errors::{CoreError, CoreResult},
    itinerary::TripBook,
    wallet::WalletBook,
};

use super::StorageBackend;

/// In-process backend for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    trips: Mutex<Option<TripBook>>,
    wallets: Mutex<Option<WalletBook>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(trips: TripBook, wallets: WalletBook) -> Self {
        Self {
            trips: Mutex::new(Some(trips)),
            wallets: Mutex::new(Some(wallets)),
            ..Self::default()
        }
    }

    /// Makes every subsequent save fail until switched off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> CoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("memory storage is read-only".into()));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> CoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| CoreError::Storage("memory storage lock poisoned".into()))
}

impl StorageBackend for MemoryStorage {
    fn load_trips(&self) -> CoreResult<TripBook> {
        Ok(lock(&self.trips)?.clone().unwrap_or_default())
    }

    fn save_trips(&self, trips: &TripBook) -> CoreResult<()> {
        self.check_writable()?;
        *lock(&self.trips)? = Some(trips.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_wallets(&self) -> CoreResult<WalletBook> {
        Ok(lock(&self.wallets)?.clone().unwrap_or_default())
    }

    fn save_wallets(&self, wallets: &WalletBook) -> CoreResult<()> {
        self.check_writable()?;
        *lock(&self.wallets)? = Some(wallets.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
