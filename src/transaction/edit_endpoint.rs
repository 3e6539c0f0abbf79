//! Defines the endpoint for replacing the fields of a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, UserID,
    database_id::TransactionId,
    transaction::{
        Transaction, TransactionForm, TransactionWriteState, core::update_transaction,
    },
};

/// A route handler for editing a transaction, responds with the updated transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionWriteState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let builder = form.into_builder(user_id, &state.normalizer).await?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_transaction(transaction_id, builder, &connection)
        .inspect_err(|error| {
            tracing::error!("could not update transaction {transaction_id}: {error}");
        })
        .map(Json)
}

#[cfg(test)]
mod tests {
    use axum::{Extension, Json, extract::Path, extract::State};
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error,
        test_utils::{get_test_app_state, insert_test_user},
        transaction::{Transaction, TransactionType, TransactionWriteState, create_transaction},
    };

    use super::edit_transaction_endpoint;

    #[tokio::test]
    async fn edits_owned_transaction_and_rejects_others() {
        let app_state = get_test_app_state(date!(2025 - 06 - 01));
        let (owner, other, transaction) = {
            let connection = app_state.db_connection.lock().unwrap();
            let owner = insert_test_user("owner@bar.baz", &connection);
            let other = insert_test_user("other@bar.baz", &connection);
            let transaction = create_transaction(
                Transaction::build(owner, TransactionType::Expense, 5.0, "Food", date!(2025 - 05 - 01)),
                &connection,
            )
            .unwrap();
            (owner, other, transaction)
        };
        let state = TransactionWriteState {
            db_connection: app_state.db_connection.clone(),
            normalizer: app_state.normalizer.clone(),
        };
        let body = json!({
            "type": "expense",
            "amount": 12.5,
            "category": "Takeaway",
            "date": "2025-05-02",
        });

        let Json(updated) = edit_transaction_endpoint(
            State(state.clone()),
            Extension(owner),
            Path(transaction.id),
            Json(serde_json::from_value(body.clone()).unwrap()),
        )
        .await
        .unwrap();
        let rejected = edit_transaction_endpoint(
            State(state),
            Extension(other),
            Path(transaction.id),
            Json(serde_json::from_value(body).unwrap()),
        )
        .await;

        assert_eq!(updated.amount, 12.5);
        assert_eq!(updated.category, "Takeaway");
        assert_eq!(updated.date, date!(2025 - 05 - 02));
        assert!(matches!(rejected, Err(Error::NotFound)));
    }
}
