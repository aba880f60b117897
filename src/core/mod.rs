//! Application state ownership and filesystem helpers.

pub mod state;
pub mod utils;

pub use state::{AppState, StateManager};
