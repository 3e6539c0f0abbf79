//! The request body for creating or editing a transaction.

use serde::Deserialize;
use time::Date;

use crate::{
    CurrencyCode, CurrencyNormalizer, Error, UserID,
    currency::round_to_cents,
    recurrence::Recurrence,
    transaction::{Transaction, TransactionBuilder, TransactionType},
};

/// The fields a client sends to create or replace a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub sub_type: Option<String>,
    /// The amount in `currency`.
    pub amount: f64,
    /// Defaults to the canonical currency.
    #[serde(default)]
    pub currency: CurrencyCode,
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    pub date: Date,
}

impl TransactionForm {
    /// Validate the form and convert its amount into the canonical currency.
    ///
    /// This awaits the exchange rate lookup, so it must be called before taking
    /// the database lock.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the category is blank or the amount is
    /// not positive, or an [Error::Conversion] if the amount could not be converted.
    pub async fn into_builder(
        self,
        user_id: UserID,
        normalizer: &CurrencyNormalizer,
    ) -> Result<TransactionBuilder, Error> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(Error::Validation("category must not be empty".to_owned()));
        }

        let original_amount = round_to_cents(self.amount);
        let amount = normalizer
            .normalize(original_amount, &self.currency)
            .await?;

        let tags = self
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(
            Transaction::build(user_id, self.transaction_type, amount, category, self.date)
                .original(original_amount, self.currency)
                .sub_type(non_blank(self.sub_type))
                .notes(non_blank(self.notes))
                .tags(tags)
                .recurrence(self.recurrence),
        )
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
