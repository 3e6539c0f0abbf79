//! Defines the endpoints for reading transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::TransactionId,
    transaction::{
        Transaction, TransactionFilter,
        core::{get_transaction, get_transactions},
    },
};

/// The state needed to read or delete transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the user's transactions, newest first.
///
/// Supports the query parameters `type`, `category`, `start_date` and `end_date`.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions(user_id, &filter, &connection).map(Json)
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_transaction(transaction_id, user_id, &connection).map(Json)
}
