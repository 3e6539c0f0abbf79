//! Handler for registering a new user.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{create_user, set_auth_cookie},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
}

/// Create a new user and log them in.
///
/// Responds with 201 and the new user's ID and email.
///
/// # Errors
///
/// - [Error::Validation] if the email address is malformed.
/// - [Error::TooWeak] if the password is easy to guess.
/// - [Error::DuplicateEmail] if the email address is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Json(user_data): Json<RegisterForm>,
) -> Result<Response, Error> {
    let email = EmailAddress::from_str(user_data.email.trim())
        .map_err(|error| Error::Validation(format!("invalid email address: {error}")))?;

    let validated_password = ValidatedPassword::new(&user_data.password, &[email.as_str()])?;

    let password_hash =
        PasswordHash::new(validated_password, state.password_hash_cost).inspect_err(|error| {
            tracing::error!("an error occurred while hashing a password: {error}");
        })?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        create_user(email, password_hash, &connection)?
    };

    tracing::info!("Registered new user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({ "id": user.id, "email": user.email.as_str() })),
    )
        .into_response())
}

#[cfg(test)]
mod register_user_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        PasswordHash,
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, create_user, create_user_table,
            get_user_by_email,
        },
        endpoints,
    };

    use super::{RegistrationState, register_user};

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState {
            cookie_key: create_cookie_key("42"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            password_hash_cost: 4,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: RegistrationState) -> TestServer {
        let app = Router::new()
            .route(endpoints::USERS, post(register_user))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn create_user_succeeds() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::USERS)
            .json(&json!({
                "email": "test@example.com",
                "password": "iamtestingwhethericancreateanewuser"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({ "id": 1, "email": "test@example.com" }));
        response.cookie(COOKIE_TOKEN);
    }

    #[tokio::test]
    async fn registered_user_is_stored() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        server
            .post(endpoints::USERS)
            .json(&json!({
                "email": "stored@example.com",
                "password": "iamtestingwhethericancreateanewuser"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let user = get_user_by_email(
            &EmailAddress::from_str("stored@example.com").unwrap(),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not find the registered user");
        assert_eq!(user.id.as_i64(), 1);
    }

    #[tokio::test]
    async fn create_user_fails_with_existing_email() {
        let state = get_test_state();
        create_user(
            EmailAddress::from_str("test@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");
        let server = get_test_server(state);

        server
            .post(endpoints::USERS)
            .json(&json!({
                "email": "test@example.com",
                "password": "averystrongandsecurepassword"
            }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn create_user_fails_when_password_is_weak() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::USERS)
            .json(&json!({ "email": "test@example.com", "password": "password" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_email() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::USERS)
            .json(&json!({
                "email": "not an email",
                "password": "averystrongandsecurepassword"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
