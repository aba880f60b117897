#![doc(test(attr(deny(warnings))))]

//! Daygo Core holds the engines behind a travel planner: trip itineraries with
//! a calendar layering pass that stacks overlapping trips into lanes, and
//! per-currency wallets whose balance always matches their transaction log.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod itinerary;
pub mod layering;
pub mod storage;
pub mod utils;
pub mod wallet;

use std::sync::Once;

pub use crate::core::{AppState, StateManager};
pub use errors::{CoreError, CoreResult, ValidationError};
pub use itinerary::{TripBook, TripCommand};
pub use layering::{compute_layout, CalendarLayout};
pub use wallet::{WalletBook, WalletCommand};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git = build.git_hash,
            profile = build.profile,
            "Daygo Core tracing initialized."
        );
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
