//! Defines the notification model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, UserID, database_id::NotificationId};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Budget,
    Recurring,
    Goal,
}

impl NotificationType {
    /// The lowercase name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Budget => "budget",
            NotificationType::Recurring => "recurring",
            NotificationType::Goal => "goal",
        }
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget" => Ok(NotificationType::Budget),
            "recurring" => Ok(NotificationType::Recurring),
            "goal" => Ok(NotificationType::Goal),
            other => Err(Error::Validation(format!(
                "\"{other}\" is not a notification type"
            ))),
        }
    }
}

impl ToSql for NotificationType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for NotificationType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A stored message for a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserID,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub created_at: OffsetDateTime,
}

/// A notification that has not been stored yet.
///
/// `user_id`, `notification_type`, `subject` and `occurrence_date` identify
/// the condition that triggered the notification. Storing a second
/// notification for the same condition does nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserID,
    pub notification_type: NotificationType,
    /// The budget, transaction or goal ID the notification is about.
    pub subject: String,
    pub occurrence_date: Date,
    pub message: String,
}

/// Store a notification unless one already exists for the same condition.
///
/// Returns whether the notification was stored.
pub fn insert_notification(
    notification: &NewNotification,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "INSERT OR IGNORE INTO notification \
         (user_id, type, subject, occurrence_date, message, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            notification.user_id.as_i64(),
            notification.notification_type,
            notification.subject,
            notification.occurrence_date,
            notification.message,
            OffsetDateTime::now_utc(),
        ],
    )?;

    Ok(rows_affected > 0)
}

/// Retrieve a user's notifications, newest first.
pub fn get_notifications(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Notification>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, message, type, created_at FROM notification \
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_notification| maybe_notification.map_err(|error| error.into()))
        .collect()
}

/// Initialize the notification table.
pub fn create_notification_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS notification (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            type TEXT NOT NULL,
            subject TEXT NOT NULL,
            occurrence_date TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, type, subject, occurrence_date),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_notification_user_created
            ON notification(user_id, created_at);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Notification, rusqlite::Error> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        message: row.get(2)?,
        notification_type: row.get(3)?,
        created_at: row.get(4)?,
    })
}
