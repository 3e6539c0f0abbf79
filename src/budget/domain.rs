//! Core budget domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    CurrencyCode, CurrencyNormalizer, Error, UserID,
    currency::round_to_cents,
    database_id::BudgetId,
    recurrence::Recurrence,
    window::{DateRange, month_bounds, week_bounds, year_bounds},
};

/// The alert threshold used when a budget is created without one.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 90.0;

/// The stretch of time a budget's amount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Monday to Sunday of the current week.
    Weekly,
    /// The current calendar month.
    Monthly,
    /// The current calendar year.
    Yearly,
    /// The fixed dates in the budget's [CustomPeriod].
    Custom,
}

impl BudgetPeriod {
    /// The lowercase name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
            BudgetPeriod::Custom => "custom",
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            "custom" => Ok(BudgetPeriod::Custom),
            other => Err(Error::Validation(format!("\"{other}\" is not a budget period"))),
        }
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The inclusive dates of a custom budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPeriod {
    pub start_date: Date,
    pub end_date: Date,
}

/// A spending limit for a category over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    /// The transaction category the budget applies to.
    pub category: String,
    /// The limit in the canonical currency.
    pub amount: f64,
    /// The limit as it was entered, in `currency`.
    pub original_amount: f64,
    pub currency: CurrencyCode,
    pub period: BudgetPeriod,
    /// Set if and only if `period` is [BudgetPeriod::Custom].
    pub custom_period: Option<CustomPeriod>,
    pub recurrence: Option<Recurrence>,
    /// The percentage of the budget (0-100) at which an alert is raised.
    pub alert_threshold: f64,
}

impl Budget {
    /// The dates the budget covers when evaluated on `today`.
    ///
    /// A custom period without dates cannot be stored, but would fall back to
    /// the month containing `today`.
    pub fn window(&self, today: Date) -> DateRange {
        match (self.period, self.custom_period) {
            (BudgetPeriod::Weekly, _) => week_bounds(today),
            (BudgetPeriod::Monthly, _) => month_bounds(today),
            (BudgetPeriod::Yearly, _) => year_bounds(today),
            (BudgetPeriod::Custom, Some(custom_period)) => DateRange {
                start: custom_period.start_date,
                end: custom_period.end_date,
            },
            (BudgetPeriod::Custom, None) => month_bounds(today),
        }
    }
}

/// A validated budget that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub user_id: UserID,
    pub category: String,
    pub amount: f64,
    pub original_amount: f64,
    pub currency: CurrencyCode,
    pub period: BudgetPeriod,
    pub custom_period: Option<CustomPeriod>,
    pub recurrence: Option<Recurrence>,
    pub alert_threshold: f64,
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

/// Request body for budget creation and editing.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub period: BudgetPeriod,
    #[serde(default)]
    pub custom_period: Option<CustomPeriod>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
}

impl BudgetForm {
    /// Validate the form and convert its amount into the canonical currency.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if:
    /// - the category is blank,
    /// - the alert threshold is outside 0-100,
    /// - a custom period is missing its dates or does not start before it ends,
    /// - or the amount is not positive.
    ///
    /// Returns an [Error::Conversion] if the amount could not be converted.
    pub async fn into_new_budget(
        self,
        user_id: UserID,
        normalizer: &CurrencyNormalizer,
    ) -> Result<NewBudget, Error> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(Error::Validation("category must not be empty".to_owned()));
        }

        if !(0.0..=100.0).contains(&self.alert_threshold) {
            return Err(Error::Validation(format!(
                "alert threshold must be between 0 and 100, got {}",
                self.alert_threshold
            )));
        }

        let custom_period = match (self.period, self.custom_period) {
            (BudgetPeriod::Custom, Some(custom_period))
                if custom_period.start_date < custom_period.end_date =>
            {
                Some(custom_period)
            }
            (BudgetPeriod::Custom, Some(_)) => {
                return Err(Error::Validation(
                    "custom period must start before it ends".to_owned(),
                ));
            }
            (BudgetPeriod::Custom, None) => {
                return Err(Error::Validation(
                    "a custom budget needs a custom period".to_owned(),
                ));
            }
            (_, _) => None,
        };

        let original_amount = round_to_cents(self.amount);
        let amount = normalizer.normalize(original_amount, &self.currency).await?;

        Ok(NewBudget {
            user_id,
            category: category.to_owned(),
            amount,
            original_amount,
            currency: self.currency,
            period: self.period,
            custom_period,
            recurrence: self.recurrence,
            alert_threshold: self.alert_threshold,
        })
    }
}
