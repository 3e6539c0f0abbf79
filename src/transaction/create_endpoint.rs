//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, CurrencyNormalizer, Error, UserID,
    transaction::{Transaction, TransactionForm, core::create_transaction},
};

/// The state needed to create or edit a transaction.
#[derive(Debug, Clone)]
pub struct TransactionWriteState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Converts the entered amount into the canonical currency.
    pub normalizer: CurrencyNormalizer,
}

impl FromRef<AppState> for TransactionWriteState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            normalizer: state.normalizer.clone(),
        }
    }
}

/// A route handler for creating a new transaction, responds with the stored transaction.
///
/// The amount is converted before the transaction is stored. If the conversion
/// fails the transaction is not stored.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionWriteState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let builder = form.into_builder(user_id, &state.normalizer).await?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(builder, &connection).inspect_err(|error| {
        tracing::error!("could not create transaction: {error}");
    })?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
