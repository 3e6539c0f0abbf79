//! Budgets and their status.
//!
//! A budget limits the spending in one category over a weekly, monthly,
//! yearly or custom period. The status endpoint compares the expenses in the
//! current period against each budget.

mod db;
mod domain;
mod read_endpoints;
mod status;
mod write_endpoints;

pub use db::{create_budget_table, get_budgets};
pub use domain::{Budget, BudgetForm, BudgetPeriod, CustomPeriod, NewBudget};
pub use read_endpoints::{BudgetsState, get_budget_endpoint, list_budgets_endpoint};
pub use status::{get_budget_status_endpoint, percentage_of, spent_in_window};
pub use write_endpoints::{
    create_budget_endpoint, delete_budget_endpoint, edit_budget_endpoint,
};

#[cfg(test)]
pub use db::{create_budget, get_budget};
#[cfg(test)]
pub use domain::DEFAULT_ALERT_THRESHOLD;
#[cfg(test)]
pub use status::compute_status;
