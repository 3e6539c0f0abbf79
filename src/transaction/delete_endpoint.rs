//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, UserID,
    database_id::TransactionId,
    transaction::{TransactionsState, core::delete_transaction},
};

/// A route handler for deleting a transaction, responds with 204 No Content.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
        })
        .map(|_| StatusCode::NO_CONTENT)
}
