//! Runs the daily sweep in the background.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;
use time::Date;
use tokio::task::JoinHandle;

use crate::{
    Clock, Error,
    notification::generate_and_store,
    recurrence::{SweepReport, UserSource, sweep::sweep_user},
};

/// How often the scheduler checks whether the date has changed, by default.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Owns the daily sweep.
///
/// The scheduler wakes up on an interval and, once per calendar date of its
/// [Clock], stores the due occurrences of every user's recurring transactions
/// and then generates every user's notifications.
#[derive(Debug)]
pub struct Scheduler {
    db_connection: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
    users: Arc<dyn UserSource>,
    check_interval: Duration,
    last_run: Option<Date>,
}

impl Scheduler {
    /// Create a scheduler that has not run yet.
    pub fn new(
        db_connection: Arc<Mutex<Connection>>,
        clock: Arc<dyn Clock>,
        users: Arc<dyn UserSource>,
    ) -> Self {
        Self {
            db_connection,
            clock,
            users,
            check_interval: DEFAULT_CHECK_INTERVAL,
            last_run: None,
        }
    }

    /// Set how often the scheduler checks whether the date has changed.
    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    /// Run the sweep if it has not run yet for the clock's current date.
    ///
    /// Returns `None` if the sweep already ran today.
    ///
    /// # Errors
    ///
    /// Returns an error if the users could not be listed or the database lock
    /// could not be acquired. The date is not marked as done in that case, so
    /// the next check retries.
    pub fn tick(&mut self) -> Result<Option<SweepReport>, Error> {
        let today = self.clock.today();

        if self.last_run == Some(today) {
            return Ok(None);
        }

        let report = self.run_sweep(today)?;
        self.last_run = Some(today);

        Ok(Some(report))
    }

    /// Sweep every user for `today`, then generate their notifications.
    ///
    /// A failure for one user is logged and does not stop the others.
    pub fn run_sweep(&self, today: Date) -> Result<SweepReport, Error> {
        let user_ids = self.users.user_ids()?;
        let mut report = SweepReport::default();

        for user_id in user_ids {
            let connection = self
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;

            match sweep_user(user_id, today, &connection) {
                Ok(user_report) => report += user_report,
                Err(error) => {
                    tracing::error!("could not sweep recurring transactions for user {user_id}: {error}");
                }
            }

            if let Err(error) = generate_and_store(user_id, today, &connection) {
                tracing::error!("could not generate notifications for user {user_id}: {error}");
            }
        }

        tracing::info!(
            "sweep for {today} finished: {} created, {} skipped, {} failed",
            report.created,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    /// Run the scheduler on a background task until the runtime shuts down.
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                "sweep scheduler started, checking every {} seconds",
                self.check_interval.as_secs()
            );

            // The first tick completes immediately, so the sweep runs at startup.
            let mut interval = tokio::time::interval(self.check_interval);

            loop {
                interval.tick().await;

                if let Err(error) = self.tick() {
                    tracing::error!("scheduled sweep failed: {error}");
                }
            }
        })
    }
}
