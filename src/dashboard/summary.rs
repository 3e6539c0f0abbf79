//! Aggregates a user's transactions and budgets into the dashboard summary.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::{
    budget::{Budget, spent_in_window},
    currency::round_to_cents,
    database_id::BudgetId,
    transaction::{Transaction, TransactionType},
};

/// How much has been spent against one budget in its current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub budget_id: BudgetId,
    pub category: String,
    pub budgeted: f64,
    pub spent: f64,
}

/// The totals shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// Income minus expenses. Transfers and investments are not counted.
    pub net_balance: f64,
    /// Total expenses per category. Every budget category is present, zero if
    /// nothing has been spent on it.
    pub category_breakdown: BTreeMap<String, f64>,
    /// The transactions that repeat.
    pub recurring_transactions: Vec<Transaction>,
    pub budget_summary: Vec<BudgetSummary>,
}

/// Summarize all of a user's `transactions` and `budgets` as of `today`.
pub fn summarize(transactions: &[Transaction], budgets: &[Budget], today: Date) -> DashboardSummary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut category_breakdown: BTreeMap<String, f64> = budgets
        .iter()
        .map(|budget| (budget.category.clone(), 0.0))
        .collect();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => total_income += transaction.amount,
            TransactionType::Expense => {
                total_expenses += transaction.amount;
                *category_breakdown
                    .entry(transaction.category.clone())
                    .or_insert(0.0) += transaction.amount;
            }
            TransactionType::Transfer | TransactionType::Investment => {}
        }
    }

    for total in category_breakdown.values_mut() {
        *total = round_to_cents(*total);
    }

    let recurring_transactions = transactions
        .iter()
        .filter(|transaction| transaction.recurrence.is_some())
        .cloned()
        .collect();

    let budget_summary = budgets
        .iter()
        .map(|budget| BudgetSummary {
            budget_id: budget.id,
            category: budget.category.clone(),
            budgeted: budget.amount,
            spent: spent_in_window(transactions, &budget.category, budget.window(today)),
        })
        .collect();

    DashboardSummary {
        total_income: round_to_cents(total_income),
        total_expenses: round_to_cents(total_expenses),
        net_balance: round_to_cents(total_income - total_expenses),
        category_breakdown,
        recurring_transactions,
        budget_summary,
    }
}
