//! Conversion of monetary amounts into the canonical currency.

mod code;
mod normalizer;
mod provider;

pub use code::{CANONICAL_CURRENCY, CurrencyCode};
pub use normalizer::{CurrencyNormalizer, round_to_cents};
pub use provider::{FixedRateProvider, HttpRateProvider, RateProvider};
