//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    auth::{auth_guard, post_log_in, post_log_out, register_user},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, edit_budget_endpoint, get_budget_endpoint,
        get_budget_status_endpoint, list_budgets_endpoint,
    },
    dashboard::get_dashboard_endpoint,
    endpoints,
    goal::{
        add_milestone_endpoint, create_goal_endpoint, delete_goal_endpoint, get_goal_endpoint,
        goal_notifications_endpoint, list_goals_endpoint, mark_complete_endpoint,
        update_progress_endpoint,
    },
    notification::{generate_notifications_endpoint, list_notifications_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::BUDGET_STATUS, get(get_budget_status_endpoint))
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(edit_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::GOALS,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(endpoints::GOAL_NOTIFICATIONS, get(goal_notifications_endpoint))
        .route(
            endpoints::GOAL,
            get(get_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(endpoints::GOAL_PROGRESS, put(update_progress_endpoint))
        .route(endpoints::GOAL_COMPLETE, post(mark_complete_endpoint))
        .route(endpoints::GOAL_MILESTONES, post(add_milestone_endpoint))
        .route(endpoints::NOTIFICATIONS, get(list_notifications_endpoint))
        .route(
            endpoints::GENERATE_NOTIFICATIONS,
            post(generate_notifications_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes.merge(unprotected_routes).with_state(state)
}
