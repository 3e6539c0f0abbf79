//! Exchange rate sources.

use std::{collections::HashMap, fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Error, currency::CurrencyCode};

/// A source of exchange rates.
#[async_trait]
pub trait RateProvider: Debug + Send + Sync {
    /// The number of units of `to` that one unit of `from` buys.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Conversion] if the rate could not be retrieved.
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, Error>;
}

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The response body of a "latest rates" API, e.g. `https://open.er-api.com/v6/latest/NZD`.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    /// "success" or "error".
    result: String,
    /// How many units of each currency one unit of the base currency buys.
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Fetches the latest rates from a JSON HTTP API.
///
/// Requests are made to `{base_url}/{from}` and the response is expected to
/// look like `{"result": "success", "rates": {"USD": 0.59, ...}}`.
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    client: Client,
    base_url: String,
}

impl HttpRateProvider {
    /// Create a provider that queries `base_url`, e.g. "https://open.er-api.com/v6/latest".
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, Error> {
        if from == to {
            return Ok(1.0);
        }

        let url = format!("{}/{}", self.base_url, from);
        tracing::debug!("Fetching exchange rates from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| Error::Conversion(error.to_string()))?;

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|error| Error::Conversion(error.to_string()))?;

        if body.result != "success" {
            return Err(Error::Conversion(format!(
                "rate provider returned \"{}\" for {from}",
                body.result
            )));
        }

        match body.rates.get(to.as_ref()) {
            Some(rate) if *rate > 0.0 && rate.is_finite() => Ok(*rate),
            Some(rate) => Err(Error::Conversion(format!(
                "invalid rate {rate} from {from} to {to}"
            ))),
            None => Err(Error::Conversion(format!("no rate from {from} to {to}"))),
        }
    }
}

/// A fixed table of exchange rates.
///
/// Each entry is the value of one unit of the currency in the canonical
/// currency. The canonical currency itself is always present with a rate of one.
#[derive(Debug, Clone, Default)]
pub struct FixedRateProvider {
    rates_to_canonical: HashMap<CurrencyCode, f64>,
}

impl FixedRateProvider {
    /// Create a provider from `(currency, value in canonical currency)` pairs.
    pub fn new(rates: impl IntoIterator<Item = (CurrencyCode, f64)>) -> Self {
        Self {
            rates_to_canonical: rates.into_iter().collect(),
        }
    }

    fn rate_to_canonical(&self, code: &CurrencyCode) -> Option<f64> {
        if code.is_canonical() {
            Some(1.0)
        } else {
            self.rates_to_canonical.get(code).copied()
        }
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, Error> {
        if from == to {
            return Ok(1.0);
        }

        match (self.rate_to_canonical(from), self.rate_to_canonical(to)) {
            (Some(from_rate), Some(to_rate)) if to_rate > 0.0 => Ok(from_rate / to_rate),
            _ => Err(Error::Conversion(format!("no rate from {from} to {to}"))),
        }
    }
}
