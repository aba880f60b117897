//! Rates from an exchangerate-api style `GET {base_url}/{BASE}` endpoint that
//! answers `{"base": "USD", "rates": {"KRW": 1350.2, ...}}`.
//!
//! The response parser is always available; the blocking HTTP client is behind
//! the `remote-rates` feature.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::{CoreError, CoreResult};

use super::CurrencyCode;

pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest";

/// Decoded body of a "latest rates" response.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestRates {
    pub base: String,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl LatestRates {
    pub fn rate_for(&self, target: &CurrencyCode) -> CoreResult<Decimal> {
        let raw = self
            .rates
            .get(target.as_str())
            .copied()
            .ok_or_else(|| CoreError::RateUnavailable(format!("{} -> {}", self.base, target)))?;
        Decimal::try_from(raw)
            .ok()
            .filter(|rate| *rate > Decimal::ZERO)
            .ok_or_else(|| CoreError::RateUnavailable(format!("unusable rate {raw} for {target}")))
    }
}

pub fn parse_latest_rates(body: &str) -> CoreResult<LatestRates> {
    serde_json::from_str(body)
        .map_err(|err| CoreError::RateUnavailable(format!("malformed rate response: {err}")))
}

#[cfg(feature = "remote-rates")]
pub use client::RemoteRates;

#[cfg(feature = "remote-rates")]
mod client {
    use std::time::Duration;

    use rust_decimal::Decimal;

    use super::{parse_latest_rates, DEFAULT_RATES_URL};
    use crate::currency::{CurrencyCode, RateSource};
    use crate::errors::{CoreError, CoreResult};

    /// Fetches rates over HTTP on every call; retries are left to the caller.
    pub struct RemoteRates {
        client: reqwest::blocking::Client,
        base_url: String,
    }

    impl RemoteRates {
        pub fn new() -> CoreResult<Self> {
            Self::with_base_url(DEFAULT_RATES_URL)
        }

        pub fn with_base_url(base_url: impl Into<String>) -> CoreResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent(concat!("daygo_core/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|err| CoreError::RateUnavailable(err.to_string()))?;
            Ok(Self {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            })
        }
    }

    impl RateSource for RemoteRates {
        fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> CoreResult<Decimal> {
            if from == to {
                return Ok(Decimal::ONE);
            }
            let url = format!("{}/{}", self.base_url, from);
            tracing::debug!(%url, "fetching exchange rates");
            let body = self
                .client
                .get(&url)
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.text())
                .map_err(|err| CoreError::RateUnavailable(err.to_string()))?;
            parse_latest_rates(&body)?.rate_for(to)
        }
    }
}
