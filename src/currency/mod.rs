//! Currency codes, display helpers, exchange-rate sources, and the read-side
//! projection of wallet balances into another currency.

pub mod projection;
pub mod rates;
pub mod remote;

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

pub use projection::{project, project_with, Projection};
pub use rates::{ManualRates, RateSource};
pub use remote::{parse_latest_rates, LatestRates};
#[cfg(feature = "remote-rates")]
pub use remote::RemoteRates;

/// ISO 4217 style currency code, always upper-case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Accepts three ASCII letters in any case.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn info(&self) -> Option<&'static CurrencyInfo> {
        BY_CODE.get(self.0.as_str()).copied()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CurrencyCode::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

/// Display metadata for a currency offered in the wallet screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub minor_units: u8,
}

pub const KNOWN_CURRENCIES: [CurrencyInfo; 9] = [
    CurrencyInfo { code: "KRW", symbol: "₩", minor_units: 0 },
    CurrencyInfo { code: "USD", symbol: "$", minor_units: 2 },
    CurrencyInfo { code: "JPY", symbol: "¥", minor_units: 0 },
    CurrencyInfo { code: "EUR", symbol: "€", minor_units: 2 },
    CurrencyInfo { code: "CNY", symbol: "¥", minor_units: 2 },
    CurrencyInfo { code: "GBP", symbol: "£", minor_units: 2 },
    CurrencyInfo { code: "VND", symbol: "₫", minor_units: 0 },
    CurrencyInfo { code: "THB", symbol: "฿", minor_units: 2 },
    CurrencyInfo { code: "TWD", symbol: "NT$", minor_units: 2 },
];

static BY_CODE: Lazy<HashMap<&'static str, &'static CurrencyInfo>> =
    Lazy::new(|| KNOWN_CURRENCIES.iter().map(|info| (info.code, info)).collect());

/// Display glyph for `code`; unknown codes render as the code itself.
pub fn symbol_for(code: &CurrencyCode) -> String {
    code.info()
        .map(|info| info.symbol.to_string())
        .unwrap_or_else(|| code.as_str().to_string())
}

pub fn minor_units_for(code: &CurrencyCode) -> u8 {
    code.info().map(|info| info.minor_units).unwrap_or(2)
}

/// Rounds half away from zero to the currency's minor units.
pub fn round_for(code: &CurrencyCode, amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        minor_units_for(code) as u32,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Renders `amount` as `"<symbol> <grouped digits>"`, e.g. `"₩ 12,000"`.
pub fn format_amount(amount: Decimal, code: &CurrencyCode, symbol: &str) -> String {
    let precision = minor_units_for(code) as usize;
    let rounded = round_for(code, amount);
    let body = format!("{:.*}", precision, rounded.abs());
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (body.as_str(), None),
    };
    let mut rendered = group_digits(int_part, ',');
    if let Some(frac) = frac_part {
        rendered.push('.');
        rendered.push_str(frac);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{} {}", sign, symbol, rendered)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
