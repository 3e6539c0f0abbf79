//! HTTP handler for the dashboard summary.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Clock, Error, UserID,
    budget::get_budgets,
    dashboard::summary::{DashboardSummary, summarize},
    transaction::{TransactionFilter, get_transactions},
};

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            clock: state.clock.clone(),
        }
    }
}

/// A route handler for the dashboard summary, recomputed on every request.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<DashboardSummary>, Error> {
    let today = state.clock.today();
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &TransactionFilter::default(), &connection)?;
    let budgets = get_budgets(user_id, &connection)?;

    Ok(Json(summarize(&transactions, &budgets, today)))
}
