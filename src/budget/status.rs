//! Spent versus budgeted amounts for each budget's current period.

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use time::Date;

use crate::{
    Error, UserID,
    budget::{Budget, BudgetsState, get_budgets},
    currency::round_to_cents,
    database_id::BudgetId,
    transaction::{Transaction, TransactionFilter, TransactionType, get_transactions},
    window::DateRange,
};

/// How much of a budget has been used in its current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget_id: BudgetId,
    pub category: String,
    pub budgeted: f64,
    pub spent: f64,
    /// Negative when the budget has been overspent.
    pub remaining: f64,
    pub percentage: f64,
    pub alert_triggered: bool,
    pub period_start: Date,
    pub period_end: Date,
}

/// Sum the expenses in `category` that fall inside `window`.
pub fn spent_in_window(transactions: &[Transaction], category: &str, window: DateRange) -> f64 {
    let spent = transactions
        .iter()
        .filter(|transaction| {
            transaction.transaction_type == TransactionType::Expense
                && transaction.category == category
                && window.contains(transaction.date)
        })
        .map(|transaction| transaction.amount)
        .sum();

    round_to_cents(spent)
}

/// `spent` as a percentage of `budgeted`, zero for an empty budget.
pub fn percentage_of(spent: f64, budgeted: f64) -> f64 {
    if budgeted == 0.0 {
        0.0
    } else {
        round_to_cents(spent / budgeted * 100.0)
    }
}

/// Compute the status of each budget on `today`.
///
/// Only expenses count towards a budget. Transactions whose category has no
/// budget are ignored.
pub fn compute_status(
    transactions: &[Transaction],
    budgets: &[Budget],
    today: Date,
) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|budget| {
            let window = budget.window(today);
            let spent = spent_in_window(transactions, &budget.category, window);
            let percentage = percentage_of(spent, budget.amount);

            BudgetStatus {
                budget_id: budget.id,
                category: budget.category.clone(),
                budgeted: budget.amount,
                spent,
                remaining: round_to_cents(budget.amount - spent),
                percentage,
                alert_triggered: percentage >= budget.alert_threshold,
                period_start: window.start,
                period_end: window.end,
            }
        })
        .collect()
}

/// A route handler for the status of all of the user's budgets.
pub async fn get_budget_status_endpoint(
    State(state): State<BudgetsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<BudgetStatus>>, Error> {
    let today = state.clock.today();
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)?;
    let expenses = get_transactions(
        user_id,
        &TransactionFilter {
            transaction_type: Some(TransactionType::Expense),
            ..Default::default()
        },
        &connection,
    )?;

    Ok(Json(compute_status(&expenses, &budgets, today)))
}

#[cfg(test)]
mod compute_status_tests {
    use time::{OffsetDateTime, macros::date};

    use crate::{
        CurrencyCode, UserID,
        budget::{Budget, BudgetPeriod, CustomPeriod},
        transaction::{Transaction, TransactionType},
    };

    use super::compute_status;

    fn budget(category: &str, amount: f64, period: BudgetPeriod) -> Budget {
        Budget {
            id: 1,
            user_id: UserID::new(1),
            category: category.to_owned(),
            amount,
            original_amount: amount,
            currency: CurrencyCode::canonical(),
            period,
            custom_period: None,
            recurrence: None,
            alert_threshold: 90.0,
        }
    }

    fn transaction(
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
        date: time::Date,
    ) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            transaction_type,
            sub_type: None,
            amount,
            original_amount: amount,
            currency: CurrencyCode::canonical(),
            category: category.to_owned(),
            notes: None,
            tags: Vec::new(),
            recurrence: None,
            date,
            created_at: OffsetDateTime::UNIX_EPOCH,
            source_transaction_id: None,
            occurrence_date: None,
        }
    }

    #[test]
    fn monthly_budget_near_its_limit_triggers_alert() {
        let transactions = [
            transaction(TransactionType::Expense, 120.0, "Food", date!(2025 - 03 - 02)),
            transaction(TransactionType::Expense, 70.0, "Food", date!(2025 - 03 - 20)),
            transaction(TransactionType::Expense, 50.0, "Food", date!(2025 - 02 - 28)),
            transaction(TransactionType::Income, 500.0, "Food", date!(2025 - 03 - 05)),
            transaction(TransactionType::Expense, 30.0, "Fuel", date!(2025 - 03 - 05)),
        ];
        let budgets = [budget("Food", 200.0, BudgetPeriod::Monthly)];

        let status = compute_status(&transactions, &budgets, date!(2025 - 03 - 21));

        assert_eq!(status.len(), 1);
        assert_eq!(status[0].spent, 190.0);
        assert_eq!(status[0].remaining, 10.0);
        assert_eq!(status[0].percentage, 95.0);
        assert!(status[0].alert_triggered);
        assert_eq!(status[0].period_start, date!(2025 - 03 - 01));
        assert_eq!(status[0].period_end, date!(2025 - 03 - 31));
    }

    #[test]
    fn overspent_budget_has_negative_remaining() {
        let transactions = [transaction(
            TransactionType::Expense,
            80.0,
            "Fun",
            date!(2025 - 03 - 19),
        )];
        let budgets = [budget("Fun", 50.0, BudgetPeriod::Weekly)];

        let status = compute_status(&transactions, &budgets, date!(2025 - 03 - 21));

        assert_eq!(status[0].remaining, -30.0);
        assert_eq!(status[0].percentage, 160.0);
        assert_eq!(status[0].period_start, date!(2025 - 03 - 17));
        assert_eq!(status[0].period_end, date!(2025 - 03 - 23));
    }

    #[test]
    fn weekly_window_excludes_previous_sunday() {
        let transactions = [transaction(
            TransactionType::Expense,
            10.0,
            "Fun",
            date!(2025 - 03 - 16),
        )];
        let budgets = [budget("Fun", 50.0, BudgetPeriod::Weekly)];

        let status = compute_status(&transactions, &budgets, date!(2025 - 03 - 17));

        assert_eq!(status[0].spent, 0.0);
        assert!(!status[0].alert_triggered);
    }

    #[test]
    fn zero_budget_reports_zero_percent() {
        let transactions = [transaction(
            TransactionType::Expense,
            10.0,
            "Gifts",
            date!(2025 - 03 - 16),
        )];
        let budgets = [budget("Gifts", 0.0, BudgetPeriod::Yearly)];

        let status = compute_status(&transactions, &budgets, date!(2025 - 03 - 17));

        assert_eq!(status[0].spent, 10.0);
        assert_eq!(status[0].percentage, 0.0);
    }

    #[test]
    fn custom_window_uses_its_dates_regardless_of_today() {
        let transactions = [
            transaction(TransactionType::Expense, 300.0, "Holiday", date!(2025 - 01 - 02)),
            transaction(TransactionType::Expense, 99.0, "Holiday", date!(2025 - 01 - 06)),
        ];
        let mut holiday = budget("Holiday", 1000.0, BudgetPeriod::Custom);
        holiday.custom_period = Some(CustomPeriod {
            start_date: date!(2024 - 12 - 20),
            end_date: date!(2025 - 01 - 05),
        });

        let status = compute_status(&transactions, &[holiday], date!(2025 - 06 - 01));

        assert_eq!(status[0].spent, 300.0);
        assert_eq!(status[0].percentage, 30.0);
    }
}
