#![allow(missing_docs)]

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{body::Body, response::Response};
use email_address::EmailAddress;
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, CurrencyCode, CurrencyNormalizer, FixedClock, FixedRateProvider, PasswordHash,
    UserID,
    auth::create_user,
    db::initialize,
};

/// Read a response body as JSON.
pub(crate) async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}

/// An in-memory database with every table created.
#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user with the given email and return their ID.
#[track_caller]
pub(crate) fn insert_test_user(email: &str, connection: &Connection) -> UserID {
    create_user(
        EmailAddress::from_str(email).expect("Invalid test email"),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
    .id
}

/// A normalizer that knows EUR (1 EUR = 1.1 USD) and GBP (1 GBP = 1.25 USD).
pub(crate) fn get_test_normalizer() -> CurrencyNormalizer {
    CurrencyNormalizer::new(Arc::new(FixedRateProvider::new([
        (CurrencyCode::new("EUR").unwrap(), 1.1),
        (CurrencyCode::new("GBP").unwrap(), 1.25),
    ])))
}

/// App state over an in-memory database with the clock fixed at `today`.
#[track_caller]
pub(crate) fn get_test_app_state(today: Date) -> AppState {
    let mut state = AppState::from_shared_connection(
        Arc::new(Mutex::new(get_test_connection())),
        "42",
        get_test_normalizer(),
        Arc::new(FixedClock(today)),
    );
    state.password_hash_cost = 4;

    state
}
