//! Recurring transactions.
//!
//! A transaction with a recurrence rule acts as a template. Each day the
//! [Scheduler] stores a copy of every template that is due, dated that day.

mod rule;
mod scheduler;
mod sweep;

pub use rule::Recurrence;
pub use scheduler::Scheduler;
pub use sweep::{SqlUserSource, SweepReport, UserSource};
