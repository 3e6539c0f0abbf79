//! Materializes the occurrences of recurring transactions that are due.

use std::{
    ops::AddAssign,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error, UserID,
    auth::get_all_user_ids,
    transaction::{create_occurrence, get_recurring_transactions},
};

/// The outcome of a sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Occurrences that were stored.
    pub created: usize,
    /// Due occurrences that had already been stored by an earlier sweep.
    pub skipped: usize,
    /// Due occurrences that could not be stored.
    pub failed: usize,
}

impl AddAssign for SweepReport {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
    }
}

/// Provides the users whose recurring transactions should be swept.
pub trait UserSource: std::fmt::Debug + Send + Sync {
    /// The IDs of the users to sweep.
    fn user_ids(&self) -> Result<Vec<UserID>, Error>;
}

/// Sweeps every registered user.
#[derive(Debug, Clone)]
pub struct SqlUserSource {
    db_connection: Arc<Mutex<Connection>>,
}

impl SqlUserSource {
    /// Create a user source that reads the user table.
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self { db_connection }
    }
}

impl UserSource for SqlUserSource {
    fn user_ids(&self) -> Result<Vec<UserID>, Error> {
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_user_ids(&connection)
    }
}

/// Store today's occurrence of each of the user's recurring transactions that is due.
///
/// A template that fails is logged and counted, the remaining templates are
/// still processed.
///
/// # Errors
///
/// Returns an error only if the user's recurring transactions could not be read.
pub fn sweep_user(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<SweepReport, Error> {
    let mut report = SweepReport::default();

    for template in get_recurring_transactions(user_id, connection)? {
        let Some(recurrence) = template.recurrence else {
            continue;
        };

        if !recurrence.is_due(template.date, today) {
            continue;
        }

        match create_occurrence(&template, today, connection) {
            Ok(Some(occurrence)) => {
                tracing::debug!(
                    "created occurrence {} of transaction {} for {today}",
                    occurrence.id,
                    template.id
                );
                report.created += 1;
            }
            Ok(None) => report.skipped += 1,
            Err(error) => {
                tracing::error!(
                    "could not create the {today} occurrence of transaction {}: {error}",
                    template.id
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        recurrence::Recurrence,
        test_utils::{get_test_connection, insert_test_user},
        transaction::{
            Transaction, TransactionFilter, TransactionType, create_transaction, get_transactions,
        },
    };

    use super::{SweepReport, sweep_user};

    #[test]
    fn daily_template_is_copied_once_per_day() {
        let connection = get_test_connection();
        let user_id = insert_test_user("foo@bar.baz", &connection);
        let template = create_transaction(
            Transaction::build(user_id, TransactionType::Expense, 4.5, "Coffee", date!(2025 - 03 - 10))
                .tags(vec!["caffeine".to_owned()])
                .recurrence(Some(Recurrence::Daily)),
            &connection,
        )
        .unwrap();

        let first = sweep_user(user_id, date!(2025 - 03 - 11), &connection).unwrap();
        let second = sweep_user(user_id, date!(2025 - 03 - 11), &connection).unwrap();

        assert_eq!(first, SweepReport { created: 1, skipped: 0, failed: 0 });
        assert_eq!(second, SweepReport { created: 0, skipped: 1, failed: 0 });

        let transactions =
            get_transactions(user_id, &TransactionFilter::default(), &connection).unwrap();
        assert_eq!(transactions.len(), 2);
        let copy = &transactions[0];
        assert_eq!(copy.date, date!(2025 - 03 - 11));
        assert_eq!(copy.recurrence, None);
        assert_eq!(copy.amount, template.amount);
        assert_eq!(copy.tags, template.tags);
        assert_eq!(copy.source_transaction_id, Some(template.id));
    }

    #[test]
    fn template_date_itself_is_not_copied() {
        let connection = get_test_connection();
        let user_id = insert_test_user("foo@bar.baz", &connection);
        create_transaction(
            Transaction::build(user_id, TransactionType::Income, 3000.0, "Salary", date!(2025 - 01 - 31))
                .recurrence(Some(Recurrence::Monthly)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            sweep_user(user_id, date!(2025 - 01 - 31), &connection).unwrap(),
            SweepReport::default()
        );
        assert_eq!(
            sweep_user(user_id, date!(2025 - 02 - 27), &connection).unwrap(),
            SweepReport::default()
        );
        assert_eq!(
            sweep_user(user_id, date!(2025 - 02 - 28), &connection)
                .unwrap()
                .created,
            1
        );
    }

    #[test]
    fn failing_template_does_not_stop_the_sweep() {
        let connection = get_test_connection();
        let user_id = insert_test_user("foo@bar.baz", &connection);
        let mut templates = Vec::new();
        for category in ["Broken", "Coffee"] {
            templates.push(
                create_transaction(
                    Transaction::build(
                        user_id,
                        TransactionType::Expense,
                        4.5,
                        category,
                        date!(2025 - 03 - 10),
                    )
                    .recurrence(Some(Recurrence::Daily)),
                    &connection,
                )
                .unwrap(),
            );
        }
        connection
            .execute_batch(
                "CREATE TRIGGER reject_broken_copies BEFORE INSERT ON \"transaction\"
                 WHEN NEW.category = 'Broken'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let report = sweep_user(user_id, date!(2025 - 03 - 11), &connection).unwrap();

        assert_eq!(report, SweepReport { created: 1, skipped: 0, failed: 1 });
        let copies: Vec<_> = get_transactions(user_id, &TransactionFilter::default(), &connection)
            .unwrap()
            .into_iter()
            .filter(|transaction| transaction.source_transaction_id.is_some())
            .collect();
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].category, "Coffee");
        assert_eq!(copies[0].source_transaction_id, Some(templates[1].id));
        assert_eq!(copies[0].date, date!(2025 - 03 - 11));
    }
}
