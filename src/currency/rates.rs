use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::errors::{CoreError, CoreResult, ValidationError};

use super::CurrencyCode;

/// Supplies an exchange rate for a currency pair on demand.
///
/// Implementations may be slow or fail; callers that only need a display value
/// go through [`super::project_with`], which degrades instead of erroring.
pub trait RateSource {
    /// Units of `to` per one unit of `from`.
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> CoreResult<Decimal>;
}

/// User-entered rates keyed by currency pair.
#[derive(Debug, Clone, Default)]
pub struct ManualRates {
    rates: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
}

impl ManualRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) -> CoreResult<()> {
        if rate <= Decimal::ZERO {
            return Err(ValidationError::InvalidRate(rate.to_string()).into());
        }
        self.rates.insert((from, to), rate);
        Ok(())
    }

    pub fn remove(&mut self, from: &CurrencyCode, to: &CurrencyCode) {
        self.rates.remove(&(from.clone(), to.clone()));
    }
}

impl RateSource for ManualRates {
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> CoreResult<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Ok(*rate);
        }
        if let Some(inverse) = self.rates.get(&(to.clone(), from.clone())) {
            return Decimal::ONE
                .checked_div(*inverse)
                .ok_or_else(|| CoreError::RateUnavailable(format!("{from} -> {to}")));
        }
        Err(CoreError::RateUnavailable(format!("{from} -> {to}")))
    }
}
