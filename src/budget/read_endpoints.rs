//! Defines the endpoints for reading budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Clock, Error, UserID,
    budget::{
        Budget,
        db::{get_budget, get_budgets},
    },
    database_id::BudgetId,
};

/// The state needed to read budgets and their status.
#[derive(Debug, Clone)]
pub struct BudgetsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// Decides which period window the budget status is computed for.
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for BudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            clock: state.clock.clone(),
        }
    }
}

/// A route handler for listing the user's budgets.
pub async fn list_budgets_endpoint(
    State(state): State<BudgetsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_budgets(user_id, &connection).map(Json)
}

/// A route handler for getting a single budget.
pub async fn get_budget_endpoint(
    State(state): State<BudgetsState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<Budget>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_budget(budget_id, user_id, &connection).map(Json)
}
