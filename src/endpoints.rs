//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/goals/{goal_id}', use [format_endpoint].

/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route for the spending status of every budget.
pub const BUDGET_STATUS: &str = "/api/budgets/status";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";

/// The route to list and create goals.
pub const GOALS: &str = "/api/goals";
/// The route for the due-soon and completed messages for a user's goals.
pub const GOAL_NOTIFICATIONS: &str = "/api/goals/notifications";
/// The route to access a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to update the amount saved towards a goal.
pub const GOAL_PROGRESS: &str = "/api/goals/{goal_id}/progress";
/// The route to mark a goal as completed.
pub const GOAL_COMPLETE: &str = "/api/goals/{goal_id}/complete";
/// The route to add a milestone to a goal.
pub const GOAL_MILESTONES: &str = "/api/goals/{goal_id}/milestones";

/// The route to list the stored notifications.
pub const NOTIFICATIONS: &str = "/api/notifications";
/// The route to run the notification generator for the current user.
pub const GENERATE_NOTIFICATIONS: &str = "/api/notifications/generate";

/// The route for the dashboard summary.
pub const DASHBOARD: &str = "/api/dashboard";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
