//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    CurrencyCode, Error, UserID, database_id::TransactionId, recurrence::Recurrence,
};

// ============================================================================
// MODELS
// ============================================================================

/// What kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    Investment,
}

impl TransactionType {
    /// The lowercase name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Transfer => "transfer",
            TransactionType::Investment => "investment",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            "transfer" => Ok(TransactionType::Transfer),
            "investment" => Ok(TransactionType::Investment),
            other => Err(Error::Validation(format!(
                "\"{other}\" is not a transaction type"
            ))),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An event where money was earned, spent or moved.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A finer grained type, e.g. "salary" or "shares".
    pub sub_type: Option<String>,
    /// The amount in the canonical currency.
    pub amount: f64,
    /// The amount as it was entered, in `currency`.
    pub original_amount: f64,
    /// The currency the amount was entered in.
    pub currency: CurrencyCode,
    pub category: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    /// How often the transaction repeats. Only templates have this set.
    pub recurrence: Option<Recurrence>,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// The recurring transaction this one was generated from.
    pub source_transaction_id: Option<TransactionId>,
    /// The occurrence of the source transaction this one stands for.
    pub occurrence_date: Option<Date>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    ///
    /// `amount` must already be in the canonical currency. The original amount
    /// defaults to `amount` in the canonical currency, use [TransactionBuilder::original]
    /// to record the amount that was entered in another currency.
    pub fn build(
        user_id: UserID,
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            transaction_type,
            sub_type: None,
            amount,
            original_amount: amount,
            currency: CurrencyCode::canonical(),
            category: category.to_owned(),
            notes: None,
            tags: Vec::new(),
            recurrence: None,
            date,
        }
    }
}

/// A builder for creating [Transaction] instances.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub user_id: UserID,
    pub transaction_type: TransactionType,
    pub sub_type: Option<String>,
    /// The amount in the canonical currency.
    pub amount: f64,
    pub original_amount: f64,
    pub currency: CurrencyCode,
    pub category: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub recurrence: Option<Recurrence>,
    pub date: Date,
}

impl TransactionBuilder {
    /// Record the amount as it was entered before conversion.
    pub fn original(mut self, original_amount: f64, currency: CurrencyCode) -> Self {
        self.original_amount = original_amount;
        self.currency = currency;
        self
    }

    pub fn sub_type(mut self, sub_type: Option<String>) -> Self {
        self.sub_type = sub_type;
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn recurrence(mut self, recurrence: Option<Recurrence>) -> Self {
        self.recurrence = recurrence;
        self
    }
}

/// The optional filters for listing transactions.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, user_id, type, sub_type, amount, original_amount, \
    currency, category, notes, tags, recurrence, date, created_at, source_transaction_id, \
    occurrence_date";

fn serialize_tags(tags: &[String]) -> Result<String, Error> {
    serde_json::to_string(tags).map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the user does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tags = serialize_tags(&builder.tags)?;

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, type, sub_type, amount, original_amount, \
             currency, category, notes, tags, recurrence, date, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                builder.user_id.as_i64(),
                builder.transaction_type,
                builder.sub_type,
                builder.amount,
                builder.original_amount,
                builder.currency,
                builder.category,
                builder.notes,
                tags,
                builder.recurrence,
                builder.date,
                OffsetDateTime::now_utc(),
            ],
            map_transaction_row,
        )
        .map_err(map_foreign_key_error)
}

/// Store the occurrence of the recurring transaction `template` on `occurrence_date`.
///
/// The copy keeps the template's type, amounts, category, notes and tags, is
/// dated `occurrence_date` and does not recur itself.
///
/// Returns `None` if the occurrence has already been stored, so calling this
/// more than once for the same template and date creates a single copy.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_occurrence(
    template: &Transaction,
    occurrence_date: Date,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    let tags = serialize_tags(&template.tags)?;

    connection
        .prepare(&format!(
            "INSERT OR IGNORE INTO \"transaction\" (user_id, type, sub_type, amount, \
             original_amount, currency, category, notes, tags, recurrence, date, created_at, \
             source_transaction_id, occurrence_date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?11, ?12, ?10) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                template.user_id.as_i64(),
                template.transaction_type,
                template.sub_type,
                template.amount,
                template.original_amount,
                template.currency,
                template.category,
                template.notes,
                tags,
                occurrence_date,
                OffsetDateTime::now_utc(),
                template.id,
            ],
            map_transaction_row,
        )
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Get the transactions owned by `user_id` that match `filter`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
             WHERE user_id = ?1 \
             AND (?2 IS NULL OR type = ?2) \
             AND (?3 IS NULL OR category = ?3) \
             AND (?4 IS NULL OR date >= ?4) \
             AND (?5 IS NULL OR date <= ?5) \
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(
            rusqlite::params![
                user_id.as_i64(),
                filter.transaction_type,
                filter.category,
                filter.start_date,
                filter.end_date,
            ],
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Get the transactions owned by `user_id` that have a recurrence rule.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_recurring_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
             WHERE user_id = ?1 AND recurrence IS NOT NULL \
             ORDER BY id ASC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Replace the user editable fields of the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tags = serialize_tags(&builder.tags)?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\" SET type = ?3, sub_type = ?4, amount = ?5, \
             original_amount = ?6, currency = ?7, category = ?8, notes = ?9, tags = ?10, \
             recurrence = ?11, date = ?12 \
             WHERE id = ?1 AND user_id = ?2 \
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                id,
                builder.user_id.as_i64(),
                builder.transaction_type,
                builder.sub_type,
                builder.amount,
                builder.original_amount,
                builder.currency,
                builder.category,
                builder.notes,
                tags,
                builder.recurrence,
                builder.date,
            ],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Delete the transaction `id` owned by `user_id`.
///
/// Copies generated from the transaction are kept, but lose their link to it.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                sub_type TEXT,
                amount REAL NOT NULL,
                original_amount REAL NOT NULL,
                currency TEXT NOT NULL,
                category TEXT NOT NULL,
                notes TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                recurrence TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                source_transaction_id INTEGER,
                occurrence_date TEXT,
                UNIQUE(source_transaction_id, occurrence_date),
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(source_transaction_id) REFERENCES \"transaction\"(id) ON DELETE SET NULL
                )",
        (),
    )?;

    // Used by the listing, budget status and dashboard queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

fn map_foreign_key_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::NotFound,
        error => error.into(),
    }
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_tags: String = row.get(9)?;
    let tags = serde_json::from_str(&raw_tags).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type: row.get(2)?,
        sub_type: row.get(3)?,
        amount: row.get(4)?,
        original_amount: row.get(5)?,
        currency: row.get(6)?,
        category: row.get(7)?,
        notes: row.get(8)?,
        tags,
        recurrence: row.get(10)?,
        date: row.get(11)?,
        created_at: row.get(12)?,
        source_transaction_id: row.get(13)?,
        occurrence_date: row.get(14)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
