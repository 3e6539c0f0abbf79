//! Defines the JSON endpoints for goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Clock, Error, UserID,
    database_id::GoalId,
    goal::{
        Goal, GoalForm, GoalNotice, GoalQuery, add_milestone,
        db::{create_goal, delete_goal, get_goal, get_goals},
        goal_notices, mark_complete, select_goals, update_progress,
    },
};

/// The state needed by the goal endpoints.
#[derive(Debug, Clone)]
pub struct GoalState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// Decides how far away deadlines are.
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            clock: state.clock.clone(),
        }
    }
}

/// Request body for updating a goal's progress.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProgressForm {
    pub current_amount: f64,
}

/// Request body for adding a milestone.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MilestoneForm {
    pub amount: f64,
}

/// A route handler for listing goals.
///
/// Supports the query parameters `sort_by` (`progress` or `deadline`) and
/// `filter_by` (`completed` or `incomplete`).
pub async fn list_goals_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<GoalQuery>,
) -> Result<Json<Vec<Goal>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goals(user_id, &connection)?;

    Ok(Json(select_goals(goals, query)))
}

/// A route handler for creating a goal.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<GoalForm>,
) -> Result<(StatusCode, Json<Goal>), Error> {
    let new_goal = form.into_new_goal(user_id)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = create_goal(new_goal, &connection).inspect_err(|error| {
        tracing::error!("could not create goal: {error}");
    })?;

    Ok((StatusCode::CREATED, Json(goal)))
}

/// A route handler for getting a single goal.
pub async fn get_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<Goal>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_goal(goal_id, user_id, &connection).map(Json)
}

/// A route handler for deleting a goal.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_goal(goal_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for setting how much has been saved towards a goal.
pub async fn update_progress_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Json(form): Json<ProgressForm>,
) -> Result<Json<Goal>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_progress(goal_id, user_id, form.current_amount, &connection).map(Json)
}

/// A route handler for marking a goal as completed.
pub async fn mark_complete_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<Goal>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    mark_complete(goal_id, user_id, &connection).map(Json)
}

/// A route handler for adding a milestone to a goal.
pub async fn add_milestone_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Json(form): Json<MilestoneForm>,
) -> Result<Json<Goal>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    add_milestone(goal_id, user_id, form.amount, &connection).map(Json)
}

/// A route handler for the due-soon and completed messages of the user's goals.
pub async fn goal_notifications_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<GoalNotice>>, Error> {
    let today = state.clock.today();
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goals(user_id, &connection)?;

    Ok(Json(goal_notices(&goals, today)))
}
