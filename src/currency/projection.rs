use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::wallet::CurrencyWallet;

use super::{round_for, CurrencyCode, RateSource};

/// A wallet's balance and spending expressed in another currency.
///
/// Display-only: stored wallet amounts are never touched. Without a usable
/// rate both amounts are zero and `rate` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
    pub rate: Option<Decimal>,
    pub remaining: Decimal,
    pub spent: Decimal,
}

impl Projection {
    pub fn is_available(&self) -> bool {
        self.rate.is_some()
    }
}

/// Projects with a caller-supplied rate. Non-positive rates count as missing.
pub fn project(wallet: &CurrencyWallet, target: &CurrencyCode, rate: Option<Decimal>) -> Projection {
    let rate = rate.filter(|rate| *rate > Decimal::ZERO);
    let convert = |amount: Decimal| match rate {
        Some(rate) => amount
            .checked_mul(rate)
            .map(|value| round_for(target, value))
            .unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    };
    Projection {
        source: wallet.currency().clone(),
        target: target.clone(),
        rate,
        remaining: convert(wallet.remaining_amount()),
        spent: convert(wallet.total_spent()),
    }
}

/// Asks `source` for the rate; a failed lookup yields an unavailable projection.
pub fn project_with<R: RateSource + ?Sized>(
    wallet: &CurrencyWallet,
    target: &CurrencyCode,
    source: &R,
) -> Projection {
    let rate = match source.rate(wallet.currency(), target) {
        Ok(rate) => Some(rate),
        Err(err) => {
            tracing::warn!(
                from = %wallet.currency(),
                to = %target,
                error = %err,
                "exchange rate unavailable; projection left empty"
            );
            None
        }
    };
    project(wallet, target, rate)
}
