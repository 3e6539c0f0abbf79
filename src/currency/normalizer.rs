//! Normalizes amounts into the canonical currency.

use std::sync::Arc;

use crate::{
    Error,
    currency::{CurrencyCode, RateProvider},
};

/// Round `amount` to two decimal places.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Converts amounts in any currency into the canonical currency.
#[derive(Debug, Clone)]
pub struct CurrencyNormalizer {
    provider: Arc<dyn RateProvider>,
}

impl CurrencyNormalizer {
    /// Create a normalizer that gets its exchange rates from `provider`.
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self { provider }
    }

    /// Convert `amount` in `currency` into the canonical currency, rounded to cents.
    ///
    /// Amounts already in the canonical currency are returned unchanged, without
    /// consulting the rate provider.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::Validation] if `amount` is not a positive, finite number.
    /// - [Error::Conversion] if the exchange rate could not be retrieved. There is
    ///   no fallback to the unconverted amount.
    pub async fn normalize(&self, amount: f64, currency: &CurrencyCode) -> Result<f64, Error> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Validation(format!(
                "amount must be a positive number, got {amount}"
            )));
        }

        if currency.is_canonical() {
            return Ok(amount);
        }

        let rate = self
            .provider
            .rate(currency, &CurrencyCode::canonical())
            .await
            .inspect_err(|error| {
                tracing::warn!("Could not convert {amount} {currency}: {error}");
            })?;

        Ok(round_to_cents(amount * rate))
    }
}
