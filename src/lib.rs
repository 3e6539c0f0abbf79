//! Fintrack is a web service for tracking personal finances.
//!
//! This library provides a JSON REST API for transactions, budgets, goals and
//! notifications, along with the derived state computed from them: budget
//! status, goal progress, recurring transaction materialisation and the
//! dashboard summary.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod clock;
mod currency;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod logging;
mod notification;
mod recurrence;
mod routing;
mod timezone;
mod transaction;
mod window;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use clock::{Clock, FixedClock, SystemClock};
pub use currency::{
    CANONICAL_CURRENCY, CurrencyCode, CurrencyNormalizer, FixedRateProvider, HttpRateProvider,
    RateProvider,
};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use recurrence::{Scheduler, SqlUserSource, SweepReport, UserSource};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request field was missing, malformed or out of range.
    ///
    /// The string describes which field was invalid and why, and is safe to
    /// show to the client.
    #[error("{0}")]
    Validation(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by another user are also reported as not found so that
    /// clients cannot probe for the IDs of other users' records.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The exchange rate for converting an amount into the canonical currency
    /// could not be retrieved.
    ///
    /// The write that needed the conversion must be rejected rather than
    /// stored with an unconverted amount.
    #[error("could not convert currency: {0}")]
    Conversion(String),

    /// The progress amount for a goal exceeds the goal's target amount.
    #[error("current amount {current_amount} exceeds the target amount {target_amount}")]
    InvalidProgress {
        /// The rejected progress amount.
        current_amount: f64,
        /// The goal's target amount.
        target_amount: f64,
    },

    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired auth token.
    #[error("you must be logged in to access this resource")]
    Unauthenticated,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email address is already registered.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) | Error::InvalidProgress { .. } | Error::TooWeak(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::Conversion(_) => StatusCode::BAD_GATEWAY,
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "An unexpected error occurred, check the server logs for more details."
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
