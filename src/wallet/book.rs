use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{symbol_for, CurrencyCode};
use crate::errors::{CoreError, CoreResult};

use super::transaction::{validate_amount, Transaction, TransactionKind};
use super::wallet::CurrencyWallet;

/// Result of [`WalletBook::set_budget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetOutcome {
    Created,
    Updated,
}

/// All wallets, at most one per currency, in creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WalletBook {
    wallets: Vec<CurrencyWallet>,
}

impl WalletBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a loaded collection; a later wallet with a duplicate currency is dropped.
    pub fn from_wallets(wallets: Vec<CurrencyWallet>) -> Self {
        let mut book = Self::new();
        for wallet in wallets {
            if book.position(wallet.currency()).is_some() {
                tracing::warn!(currency = %wallet.currency(), "duplicate wallet dropped");
                continue;
            }
            book.wallets.push(wallet);
        }
        book
    }

    pub fn wallets(&self) -> &[CurrencyWallet] {
        &self.wallets
    }

    pub fn into_wallets(self) -> Vec<CurrencyWallet> {
        self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Lookup by code in any case; malformed codes match nothing.
    pub fn wallet(&self, currency: &str) -> Option<&CurrencyWallet> {
        let code = CurrencyCode::parse(currency).ok()?;
        self.position(&code).map(|index| &self.wallets[index])
    }

    fn position(&self, code: &CurrencyCode) -> Option<usize> {
        self.wallets.iter().position(|wallet| wallet.currency() == code)
    }

    fn wallet_mut(&mut self, currency: &str) -> CoreResult<&mut CurrencyWallet> {
        let code = CurrencyCode::parse(currency)?;
        match self.position(&code) {
            Some(index) => Ok(&mut self.wallets[index]),
            None => Err(CoreError::WalletNotFound(code.to_string())),
        }
    }

    /// Creates the wallet or changes its budget and symbol, recomputing the
    /// balance from the existing log. A blank symbol falls back to the known one.
    pub fn set_budget(
        &mut self,
        currency: &str,
        symbol: &str,
        amount: Decimal,
    ) -> CoreResult<BudgetOutcome> {
        let code = CurrencyCode::parse(currency)?;
        let amount = validate_amount(amount)?;
        let symbol = match symbol.trim() {
            "" => symbol_for(&code),
            trimmed => trimmed.to_string(),
        };

        match self.position(&code) {
            Some(index) => {
                let wallet = &mut self.wallets[index];
                wallet.set_budget(symbol, amount)?;
                tracing::info!(
                    currency = %code,
                    %amount,
                    remaining = %wallet.remaining_amount(),
                    "wallet budget updated"
                );
                Ok(BudgetOutcome::Updated)
            }
            None => {
                tracing::info!(currency = %code, %amount, "wallet created");
                self.wallets.push(CurrencyWallet::new(code, symbol, amount));
                Ok(BudgetOutcome::Created)
            }
        }
    }

    pub fn record_expense(
        &mut self,
        currency: &str,
        amount: Decimal,
        description: &str,
        date: Option<DateTime<Utc>>,
    ) -> CoreResult<Uuid> {
        self.record(currency, TransactionKind::Expense, amount, description, date, None)
    }

    pub fn record_income(
        &mut self,
        currency: &str,
        amount: Decimal,
        description: &str,
        date: Option<DateTime<Utc>>,
    ) -> CoreResult<Uuid> {
        self.record(currency, TransactionKind::Income, amount, description, date, None)
    }

    /// Records an entry of either kind with an optional category label.
    /// Nothing changes unless the entry is valid and the wallet exists.
    pub fn record(
        &mut self,
        currency: &str,
        kind: TransactionKind,
        amount: Decimal,
        description: &str,
        date: Option<DateTime<Utc>>,
        category: Option<&str>,
    ) -> CoreResult<Uuid> {
        let mut txn = Transaction::new(kind, amount, description, date)?;
        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            txn = txn.with_category(category);
        }
        let wallet = self.wallet_mut(currency)?;
        let id = txn.id;
        let amount = txn.amount;
        wallet.push(txn)?;
        tracing::debug!(
            currency = %wallet.currency(),
            kind = ?kind,
            %amount,
            transaction = %id,
            "transaction recorded"
        );
        Ok(id)
    }

    /// Removes the entry and reverses its effect. Unknown wallet or id is a no-op.
    pub fn delete_transaction(&mut self, currency: &str, transaction_id: Uuid) -> Option<Transaction> {
        let wallet = self.wallet_mut(currency).ok()?;
        let removed = wallet.remove(transaction_id)?;
        tracing::debug!(
            currency = %wallet.currency(),
            transaction = %transaction_id,
            remaining = %wallet.remaining_amount(),
            "transaction deleted"
        );
        Some(removed)
    }

    /// Clears the log and restores the initial budget.
    pub fn reset_wallet(&mut self, currency: &str) -> bool {
        match self.wallet_mut(currency) {
            Ok(wallet) => {
                wallet.reset();
                tracing::info!(currency = %wallet.currency(), "wallet reset");
                true
            }
            Err(_) => false,
        }
    }

    pub fn delete_wallet(&mut self, currency: &str) -> Option<CurrencyWallet> {
        let code = CurrencyCode::parse(currency).ok()?;
        let index = self.position(&code)?;
        tracing::info!(currency = %code, "wallet deleted");
        Some(self.wallets.remove(index))
    }

    /// Recomputes every cached balance from its log and returns the
    /// currencies whose stored balance had drifted.
    pub fn reconcile(&mut self) -> Vec<CurrencyCode> {
        let mut repaired = Vec::new();
        for wallet in &mut self.wallets {
            let stored = wallet.remaining_amount();
            if wallet.repair() {
                tracing::warn!(
                    currency = %wallet.currency(),
                    %stored,
                    recomputed = %wallet.remaining_amount(),
                    "wallet balance drift repaired"
                );
                repaired.push(wallet.currency().clone());
            }
        }
        repaired
    }

    /// Pure reducer: returns the next snapshot and leaves `self` untouched.
    /// Failed commands produce no snapshot.
    pub fn apply(&self, command: WalletCommand) -> CoreResult<WalletBook> {
        let mut next = self.clone();
        next.apply_in_place(command)?;
        Ok(next)
    }

    pub(crate) fn apply_in_place(&mut self, command: WalletCommand) -> CoreResult<()> {
        match command {
            WalletCommand::SetBudget {
                currency,
                symbol,
                amount,
            } => self.set_budget(&currency, &symbol, amount).map(|_| ()),
            WalletCommand::RecordExpense {
                currency,
                amount,
                description,
                date,
                category,
            } => self
                .record(
                    &currency,
                    TransactionKind::Expense,
                    amount,
                    &description,
                    date,
                    category.as_deref(),
                )
                .map(|_| ()),
            WalletCommand::RecordIncome {
                currency,
                amount,
                description,
                date,
                category,
            } => self
                .record(
                    &currency,
                    TransactionKind::Income,
                    amount,
                    &description,
                    date,
                    category.as_deref(),
                )
                .map(|_| ()),
            WalletCommand::DeleteTransaction {
                currency,
                transaction_id,
            } => {
                self.delete_transaction(&currency, transaction_id);
                Ok(())
            }
            WalletCommand::ResetWallet { currency } => {
                self.reset_wallet(&currency);
                Ok(())
            }
            WalletCommand::DeleteWallet { currency } => {
                self.delete_wallet(&currency);
                Ok(())
            }
        }
    }
}

/// Serializable form of every wallet mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletCommand {
    SetBudget {
        currency: String,
        #[serde(default)]
        symbol: String,
        amount: Decimal,
    },
    RecordExpense {
        currency: String,
        amount: Decimal,
        #[serde(default)]
        description: String,
        #[serde(default)]
        date: Option<DateTime<Utc>>,
        #[serde(default)]
        category: Option<String>,
    },
    RecordIncome {
        currency: String,
        amount: Decimal,
        #[serde(default)]
        description: String,
        #[serde(default)]
        date: Option<DateTime<Utc>>,
        #[serde(default)]
        category: Option<String>,
    },
    DeleteTransaction {
        currency: String,
        transaction_id: Uuid,
    },
    ResetWallet {
        currency: String,
    },
    DeleteWallet {
        currency: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    fn dec(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    #[test]
    fn set_budget_creates_then_updates() {
        let mut book = WalletBook::new();
        assert_eq!(book.set_budget("usd", "", dec(1000)).unwrap(), BudgetOutcome::Created);
        let wallet = book.wallet("USD").unwrap();
        assert_eq!(wallet.symbol(), "$");
        assert_eq!(wallet.remaining_amount(), dec(1000));

        book.record_expense("USD", dec(300), "Hotel", None).unwrap();
        assert_eq!(book.set_budget("USD", "US$", dec(500)).unwrap(), BudgetOutcome::Updated);
        let wallet = book.wallet("USD").unwrap();
        assert_eq!(wallet.remaining_amount(), dec(200));
        assert_eq!(wallet.transactions().len(), 1);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn invalid_amounts_leave_book_untouched() {
        let mut book = WalletBook::new();
        let err = book.set_budget("EUR", "€", Decimal::ZERO).unwrap_err();
        assert!(err.is_validation());
        assert!(book.is_empty());

        book.set_budget("EUR", "€", dec(100)).unwrap();
        let before = book.clone();
        let err = book
            .record_expense("EUR", Decimal::new(1234, 3), "", None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TooManyDecimals(_))
        ));
        assert_eq!(book, before);
    }

    #[test]
    fn recording_into_missing_wallet_is_an_error() {
        let mut book = WalletBook::new();
        let err = book.record_income("GBP", dec(10), "Refund", None).unwrap_err();
        assert!(matches!(err, CoreError::WalletNotFound(code) if code == "GBP"));
        assert!(book.is_empty());
    }

    #[test]
    fn deletes_on_missing_targets_are_noops() {
        let mut book = WalletBook::new();
        book.set_budget("THB", "฿", dec(5000)).unwrap();
        assert!(book.delete_transaction("THB", Uuid::new_v4()).is_none());
        assert!(book.delete_transaction("VND", Uuid::new_v4()).is_none());
        assert!(!book.reset_wallet("VND"));
        assert!(book.delete_wallet("VND").is_none());
        assert_eq!(book.wallet("THB").unwrap().remaining_amount(), dec(5000));
    }

    #[test]
    fn reconcile_reports_drifted_wallets() {
        let mut book = WalletBook::new();
        book.set_budget("KRW", "₩", dec(100_000)).unwrap();
        book.set_budget("USD", "$", dec(100)).unwrap();
        book.record_expense("KRW", dec(12_000), "Lunch", None).unwrap();

        let mut json = serde_json::to_value(&book).unwrap();
        json[0]["remaining_amount"] = serde_json::json!("100000");
        let mut loaded: WalletBook = serde_json::from_value(json).unwrap();

        let repaired = loaded.reconcile();
        assert_eq!(repaired, vec![CurrencyCode::parse("KRW").unwrap()]);
        assert_eq!(loaded.wallet("KRW").unwrap().remaining_amount(), dec(88_000));
        assert!(loaded.reconcile().is_empty());
    }

    #[test]
    fn apply_returns_new_snapshot() {
        let book = WalletBook::new();
        let next = book
            .apply(WalletCommand::SetBudget {
                currency: "JPY".into(),
                symbol: "¥".into(),
                amount: dec(20_000),
            })
            .unwrap();
        assert!(book.is_empty());
        assert_eq!(next.len(), 1);

        let failed = next.apply(WalletCommand::RecordExpense {
            currency: "CNY".into(),
            amount: dec(5),
            description: String::new(),
            date: None,
            category: None,
        });
        assert!(failed.is_err());
    }

    #[test]
    fn overflowing_totals_are_rejected_before_mutation() {
        let mut book = WalletBook::new();
        book.set_budget("USD", "$", Decimal::MAX).unwrap();
        let before = book.clone();

        let err = book
            .record_income("USD", Decimal::MAX, "Windfall", None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::AmountOutOfRange(_))
        ));
        assert_eq!(book, before);

        book.record_expense("USD", Decimal::MAX, "Everything", None)
            .unwrap();
        assert!(book.record_expense("USD", dec(1), "", None).is_err());
        assert_eq!(book.wallet("USD").unwrap().transactions().len(), 1);
        assert!(book.wallet("USD").unwrap().is_consistent());
    }

    #[test]
    fn budget_change_that_overflows_keeps_old_budget() {
        let mut book = WalletBook::new();
        book.set_budget("EUR", "€", dec(1)).unwrap();
        book.record_income("EUR", Decimal::MAX - dec(5), "Grant", None)
            .unwrap();
        let before = book.clone();

        let err = book.set_budget("EUR", "€", dec(6)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(book, before);
    }

    #[test]
    fn categories_flow_through_commands() {
        let mut book = WalletBook::new();
        book.set_budget("JPY", "¥", dec(50_000)).unwrap();
        let next = book
            .apply(
                serde_json::from_str(
                    r#"{"type":"record_expense","currency":"JPY","amount":"1200","category":" Food "}"#,
                )
                .unwrap(),
            )
            .unwrap();
        let wallet = next.wallet("JPY").unwrap();
        assert_eq!(wallet.transactions()[0].category.as_deref(), Some("Food"));

        let id = book
            .record("JPY", TransactionKind::Income, dec(100), "", None, Some("  "))
            .unwrap();
        let txn = book.wallet("JPY").unwrap().transaction(id).unwrap();
        assert_eq!(txn.category, None);
        assert_eq!(txn.description, "Income");
    }

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let command: WalletCommand = serde_json::from_str(
            r#"{"type":"record_income","currency":"USD","amount":"200"}"#,
        )
        .unwrap();
        assert!(matches!(command, WalletCommand::RecordIncome { amount, .. } if amount == dec(200)));
    }
}
