//! Core goal domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, UserID, currency::round_to_cents, database_id::GoalId};

/// Whether a goal has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalStatus {
    InProgress,
    Completed,
}

impl GoalStatus {
    /// The name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::InProgress => "in-progress",
            GoalStatus::Completed => "completed",
        }
    }
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-progress" => Ok(GoalStatus::InProgress),
            "completed" => Ok(GoalStatus::Completed),
            other => Err(Error::Validation(format!("\"{other}\" is not a goal status"))),
        }
    }
}

impl ToSql for GoalStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for GoalStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A sub-target of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub amount: f64,
    /// Whether the goal's current amount has reached `amount`.
    pub achieved: bool,
}

/// An amount the user is saving towards by a deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserID,
    pub title: String,
    pub target_amount: f64,
    /// Never more than `target_amount`.
    pub current_amount: f64,
    pub deadline: Date,
    pub status: GoalStatus,
    /// Ordered by amount.
    pub milestones: Vec<Milestone>,
}

impl Goal {
    /// How far the goal is from its target as a percentage between 0 and 100.
    pub fn progress(&self) -> f64 {
        progress_percentage(self.current_amount, self.target_amount)
    }

    /// The number of days from `today` until the deadline, negative once it has passed.
    pub fn days_until_deadline(&self, today: Date) -> i64 {
        (self.deadline - today).whole_days()
    }
}

/// `current_amount` as a percentage of `target_amount`, capped at 100 and 0 for a zero target.
pub fn progress_percentage(current_amount: f64, target_amount: f64) -> f64 {
    if target_amount <= 0.0 {
        0.0
    } else {
        round_to_cents((current_amount / target_amount * 100.0).min(100.0))
    }
}

/// The status implied by the progress towards the target.
pub fn status_for(current_amount: f64, target_amount: f64) -> GoalStatus {
    if target_amount > 0.0 && current_amount >= target_amount {
        GoalStatus::Completed
    } else {
        GoalStatus::InProgress
    }
}

/// A validated goal that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub user_id: UserID,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Date,
    pub milestone_amounts: Vec<f64>,
}

/// Request body for goal creation.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalForm {
    pub title: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: Date,
    /// The amounts of the goal's initial milestones.
    #[serde(default)]
    pub milestones: Vec<f64>,
}

impl GoalForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the title is blank, an amount is negative
    /// or not finite, and [Error::InvalidProgress] if the current amount
    /// exceeds the target amount.
    pub fn into_new_goal(self, user_id: UserID) -> Result<NewGoal, Error> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title must not be empty".to_owned()));
        }

        let target_amount = validate_amount("target amount", self.target_amount)?;
        let current_amount = validate_amount("current amount", self.current_amount)?;
        if current_amount > target_amount {
            return Err(Error::InvalidProgress {
                current_amount,
                target_amount,
            });
        }

        let milestone_amounts = self
            .milestones
            .into_iter()
            .map(|amount| validate_amount("milestone amount", amount))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewGoal {
            user_id,
            title: title.to_owned(),
            target_amount,
            current_amount,
            deadline: self.deadline,
            milestone_amounts,
        })
    }
}

/// Round `amount` to cents, rejecting negative and non-finite values.
pub fn validate_amount(field: &str, amount: f64) -> Result<f64, Error> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::Validation(format!(
            "{field} must be zero or more, got {amount}"
        )));
    }

    Ok(round_to_cents(amount))
}
