//! Defines the endpoints for reading and generating notifications.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Clock, Error, UserID,
    notification::{Notification, generate_and_store, get_notifications},
};

/// The state needed by the notification endpoints.
#[derive(Debug, Clone)]
pub struct NotificationState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for NotificationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            clock: state.clock.clone(),
        }
    }
}

/// The response to a request to generate notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateResponse {
    /// The number of notifications that did not exist yet.
    pub created: usize,
}

/// A route handler for listing the user's notifications, newest first.
pub async fn list_notifications_endpoint(
    State(state): State<NotificationState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Notification>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_notifications(user_id, &connection).map(Json)
}

/// A route handler that runs the notification generator for the user now.
pub async fn generate_notifications_endpoint(
    State(state): State<NotificationState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<GenerateResponse>, Error> {
    let today = state.clock.today();
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let created = generate_and_store(user_id, today, &connection)?;

    Ok(Json(GenerateResponse { created }))
}
