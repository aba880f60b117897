use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;
use crate::errors::ValidationError;

pub const DEFAULT_EXPENSE_LABEL: &str = "Expense";
pub const DEFAULT_INCOME_LABEL: &str = "Income";

/// Largest number of fractional digits an amount may carry.
pub const MAX_AMOUNT_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    /// Funds added to the wallet after the initial budget.
    Income,
}

impl TransactionKind {
    pub fn default_label(&self) -> &'static str {
        match self {
            TransactionKind::Expense => DEFAULT_EXPENSE_LABEL,
            TransactionKind::Income => DEFAULT_INCOME_LABEL,
        }
    }
}

/// Immutable ledger entry; it can be deleted but never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    /// Validates `amount`, fills in a blank description and a missing date.
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        description: &str,
        date: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        let amount = validate_amount(amount)?;
        let description = match description.trim() {
            "" => kind.default_label().to_string(),
            trimmed => trimmed.to_string(),
        };
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            description,
            date: date.unwrap_or_else(Utc::now),
            category: None,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Effect on the wallet balance: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Expense => -self.amount,
            TransactionKind::Income => self.amount,
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Accepts strictly positive amounts with at most two fractional digits.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount.to_string()));
    }
    let normalized = amount.normalize();
    if normalized.scale() > MAX_AMOUNT_SCALE {
        return Err(ValidationError::TooManyDecimals(amount.to_string()));
    }
    Ok(normalized)
}
