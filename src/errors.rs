use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the itinerary, wallet, and storage layers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),
    #[error("Trip not found: {0}")]
    TripNotFound(Uuid),
    #[error("Day not found: {0}")]
    DayNotFound(Uuid),
    #[error("Schedule item not found: {0}")]
    ScheduleItemNotFound(Uuid),
    #[error("Checklist item not found: {0}")]
    ChecklistItemNotFound(Uuid),
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CoreResult<T> = StdResult<T, CoreError>;

/// Input rejected before any state was touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(String),
    #[error("amount {0} has more than two fractional digits")]
    TooManyDecimals(String),
    #[error("amount {0} would take a wallet total out of range")]
    AmountOutOfRange(String),
    #[error("date range end {end} is before start {start}")]
    InvalidDateRange { start: String, end: String },
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("`{0}` is not a valid HH:mm time")]
    InvalidTime(String),
    #[error("end time {end} must be after start time {start}")]
    EndBeforeStart { start: String, end: String },
    #[error("`{0}` is not a valid currency code")]
    InvalidCurrency(String),
    #[error("checklist text must not be empty")]
    EmptyChecklistText,
    #[error("exchange rate must be positive, got {0}")]
    InvalidRate(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl CoreError {
    /// True for failures caused by caller input rather than state or I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}
