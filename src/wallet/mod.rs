//! Wallet Ledger Engine: one budget per currency, an append/delete-only
//! transaction log, and a cached balance that always equals
//! `initial + Σincome − Σexpense`.

pub mod book;
pub mod transaction;
#[allow(clippy::module_inception)]
pub mod wallet;

pub use book::{BudgetOutcome, WalletBook, WalletCommand};
pub use transaction::{validate_amount, Transaction, TransactionKind};
pub use wallet::CurrencyWallet;
