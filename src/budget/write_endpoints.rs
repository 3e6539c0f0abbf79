//! Defines the endpoints that create, edit and delete budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, CurrencyNormalizer, Error, UserID,
    budget::{
        Budget, BudgetForm,
        db::{create_budget, delete_budget, update_budget},
    },
    database_id::BudgetId,
};

/// The state needed to create or edit a budget.
#[derive(Debug, Clone)]
pub struct BudgetWriteState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub normalizer: CurrencyNormalizer,
}

impl FromRef<AppState> for BudgetWriteState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            normalizer: state.normalizer.clone(),
        }
    }
}

/// A route handler for creating a budget, responds with the stored budget.
pub async fn create_budget_endpoint(
    State(state): State<BudgetWriteState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<BudgetForm>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let new_budget = form.into_new_budget(user_id, &state.normalizer).await?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = create_budget(new_budget, &connection).inspect_err(|error| {
        tracing::error!("could not create budget: {error}");
    })?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// A route handler for replacing a budget's fields.
pub async fn edit_budget_endpoint(
    State(state): State<BudgetWriteState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    Json(form): Json<BudgetForm>,
) -> Result<Json<Budget>, Error> {
    let new_budget = form.into_new_budget(user_id, &state.normalizer).await?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_budget(budget_id, new_budget, &connection).map(Json)
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetWriteState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_budget(budget_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error,
        budget::{BudgetForm, get_budget},
        test_utils::{get_test_app_state, insert_test_user},
    };

    use super::{
        BudgetWriteState, create_budget_endpoint, delete_budget_endpoint, edit_budget_endpoint,
    };

    fn form(value: serde_json::Value) -> BudgetForm {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_edit_then_delete_budget() {
        let app_state = get_test_app_state(date!(2025 - 06 - 01));
        let user_id = insert_test_user("foo@bar.baz", &app_state.db_connection.lock().unwrap());
        let state = BudgetWriteState {
            db_connection: app_state.db_connection.clone(),
            normalizer: app_state.normalizer.clone(),
        };

        let (status, Json(created)) = create_budget_endpoint(
            State(state.clone()),
            Extension(user_id),
            Json(form(json!({ "category": "Food", "amount": 80.0, "currency": "GBP", "period": "monthly" }))),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.amount, 100.0);

        let Json(edited) = edit_budget_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(created.id),
            Json(form(json!({ "category": "Food", "amount": 150.0, "period": "weekly", "alert_threshold": 75.0 }))),
        )
        .await
        .unwrap();
        assert_eq!(edited.amount, 150.0);
        assert_eq!(edited.alert_threshold, 75.0);

        let status = delete_budget_endpoint(State(state.clone()), Extension(user_id), Path(created.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_budget(created.id, user_id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn invalid_budget_is_rejected() {
        let app_state = get_test_app_state(date!(2025 - 06 - 01));
        let user_id = insert_test_user("foo@bar.baz", &app_state.db_connection.lock().unwrap());
        let state = BudgetWriteState {
            db_connection: app_state.db_connection.clone(),
            normalizer: app_state.normalizer.clone(),
        };

        let result = create_budget_endpoint(
            State(state),
            Extension(user_id),
            Json(form(json!({ "category": "  ", "amount": 80.0, "period": "monthly" }))),
        )
        .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
