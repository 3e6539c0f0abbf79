//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Clock, CurrencyNormalizer, Error, PasswordHash, auth::DEFAULT_COOKIE_DURATION,
    db::initialize,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Converts amounts entered by users into the canonical currency.
    pub normalizer: CurrencyNormalizer,

    /// The source of "today" for budget windows, goal deadlines and notifications.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// The connection may be shared with other components, e.g. the recurrence scheduler.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Arc<Mutex<Connection>>,
        cookie_secret: &str,
        normalizer: CurrencyNormalizer,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        {
            let connection = db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;
            initialize(&connection)?;
        }

        Ok(Self::from_shared_connection(
            db_connection,
            cookie_secret,
            normalizer,
            clock,
        ))
    }

    /// Create a new [AppState] around a connection that is already initialized.
    pub fn from_shared_connection(
        db_connection: Arc<Mutex<Connection>>,
        cookie_secret: &str,
        normalizer: CurrencyNormalizer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            password_hash_cost: PasswordHash::DEFAULT_COST,
            db_connection,
            normalizer,
            clock,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
