use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{format_amount, CurrencyCode};
use crate::domain::common::{Identifiable, NamedEntity};
use crate::errors::ValidationError;

use super::transaction::{Transaction, TransactionKind};

/// Per-currency budget with its transaction log and running balance.
///
/// `remaining_amount` is cached state; every mutation keeps it equal to
/// [`CurrencyWallet::recomputed_balance`]. Transactions are kept newest first.
/// Mutations that would push a total past `Decimal::MAX` are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyWallet {
    id: Uuid,
    currency: CurrencyCode,
    symbol: String,
    initial_amount: Decimal,
    remaining_amount: Decimal,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

impl CurrencyWallet {
    pub(crate) fn new(currency: CurrencyCode, symbol: String, initial_amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency,
            symbol,
            initial_amount,
            remaining_amount: initial_amount,
            transactions: Vec::new(),
        }
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn initial_amount(&self) -> Decimal {
        self.initial_amount
    }

    pub fn remaining_amount(&self) -> Decimal {
        self.remaining_amount
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn total_spent(&self) -> Decimal {
        self.sum_of(TransactionKind::Expense)
    }

    pub fn total_income(&self) -> Decimal {
        self.sum_of(TransactionKind::Income)
    }

    /// Initial budget plus every income entry.
    pub fn total_budget(&self) -> Decimal {
        self.initial_amount.saturating_add(self.total_income())
    }

    /// Balance derived from the log alone.
    pub fn recomputed_balance(&self) -> Decimal {
        self.total_budget().saturating_sub(self.total_spent())
    }

    pub fn is_consistent(&self) -> bool {
        self.remaining_amount == self.recomputed_balance()
    }

    pub fn formatted_remaining(&self) -> String {
        format_amount(self.remaining_amount, &self.currency, &self.symbol)
    }

    fn sum_of(&self, kind: TransactionKind) -> Decimal {
        self.amounts_of(kind)
            .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
    }

    fn checked_sum_of(&self, kind: TransactionKind) -> Option<Decimal> {
        self.amounts_of(kind)
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
    }

    fn amounts_of(&self, kind: TransactionKind) -> impl Iterator<Item = Decimal> + '_ {
        self.transactions
            .iter()
            .filter(move |txn| txn.kind == kind)
            .map(|txn| txn.amount)
    }

    /// Balance with `initial_amount` and an optional extra entry, or `None`
    /// when the budget or spending total leaves the representable range.
    fn checked_balance(&self, initial_amount: Decimal, extra: Option<&Transaction>) -> Option<Decimal> {
        let mut income = self.checked_sum_of(TransactionKind::Income)?;
        let mut spent = self.checked_sum_of(TransactionKind::Expense)?;
        match extra {
            Some(txn) if txn.kind == TransactionKind::Income => {
                income = income.checked_add(txn.amount)?
            }
            Some(txn) => spent = spent.checked_add(txn.amount)?,
            None => {}
        }
        initial_amount.checked_add(income)?.checked_sub(spent)
    }

    pub(crate) fn set_budget(
        &mut self,
        symbol: String,
        initial_amount: Decimal,
    ) -> Result<(), ValidationError> {
        let balance = self
            .checked_balance(initial_amount, None)
            .ok_or_else(|| ValidationError::AmountOutOfRange(initial_amount.to_string()))?;
        self.symbol = symbol;
        self.initial_amount = initial_amount;
        self.remaining_amount = balance;
        Ok(())
    }

    pub(crate) fn push(&mut self, txn: Transaction) -> Result<(), ValidationError> {
        let balance = self
            .checked_balance(self.initial_amount, Some(&txn))
            .ok_or_else(|| ValidationError::AmountOutOfRange(txn.amount.to_string()))?;
        self.remaining_amount = balance;
        self.transactions.insert(0, txn);
        // Stable, so same-instant entries keep newest-inserted first.
        self.transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        let txn = self.transactions.remove(index);
        self.remaining_amount = self.recomputed_balance();
        Some(txn)
    }

    pub(crate) fn reset(&mut self) {
        self.transactions.clear();
        self.remaining_amount = self.initial_amount;
    }

    /// Overwrites a drifted cached balance; returns whether anything changed.
    pub(crate) fn repair(&mut self) -> bool {
        let expected = self.recomputed_balance();
        if self.remaining_amount == expected {
            return false;
        }
        self.remaining_amount = expected;
        true
    }
}

impl Identifiable for CurrencyWallet {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for CurrencyWallet {
    fn name(&self) -> &str {
        self.currency.as_str()
    }
}
