//! Derives notifications from a user's budgets, recurring transactions and goals.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error, UserID,
    budget::{Budget, get_budgets, percentage_of, spent_in_window},
    goal::{Goal, GoalNoticeKind, get_goals, goal_notices},
    notification::{NewNotification, NotificationType, insert_notification},
    transaction::{Transaction, TransactionFilter, get_transactions},
};

/// The share of a budget that has to be spent before a budget notification is raised.
///
/// This is fixed for every budget. A budget's own `alert_threshold` only drives
/// the `alert_triggered` flag of its status.
pub const BUDGET_ALERT_RATIO: f64 = 0.9;

/// How many days ahead of a recurring transaction a reminder is raised.
pub const RECURRING_REMINDER_DAYS: i64 = 7;

/// Build the notifications for one user on `today`.
///
/// Only the user's own records should be passed in. Each notification
/// carries the key that identifies its triggering condition:
/// - budget: the budget's ID and `today`,
/// - recurring: the template's ID and the date of its next occurrence,
/// - goal due soon: the goal's ID and `today`,
/// - goal completed: the goal's ID and its deadline, so it is only raised once.
pub fn generate_notifications(
    user_id: UserID,
    today: Date,
    transactions: &[Transaction],
    budgets: &[Budget],
    goals: &[Goal],
) -> Vec<NewNotification> {
    let mut notifications = Vec::new();

    for budget in budgets {
        if budget.amount <= 0.0 {
            continue;
        }

        let spent = spent_in_window(transactions, &budget.category, budget.window(today));
        // Compared as a rounded percentage so this agrees with the budget status.
        let percentage = percentage_of(spent, budget.amount);
        if percentage >= BUDGET_ALERT_RATIO * 100.0 {
            notifications.push(NewNotification {
                user_id,
                notification_type: NotificationType::Budget,
                subject: budget.id.to_string(),
                occurrence_date: today,
                message: format!(
                    "You have spent {percentage}% of your {} budget ({spent:.2} of {:.2}).",
                    budget.category,
                    budget.amount
                ),
            });
        }
    }

    for template in transactions {
        let Some(recurrence) = template.recurrence else {
            continue;
        };
        let Some(next_date) = recurrence.next_occurrence(template.date, today) else {
            continue;
        };

        if (next_date - today).whole_days() <= RECURRING_REMINDER_DAYS {
            notifications.push(NewNotification {
                user_id,
                notification_type: NotificationType::Recurring,
                subject: template.id.to_string(),
                occurrence_date: next_date,
                message: format!(
                    "Your {recurrence} {} \"{}\" of {:.2} is due on {next_date}.",
                    template.transaction_type, template.category, template.amount
                ),
            });
        }
    }

    for notice in goal_notices(goals, today) {
        let occurrence_date = match notice.kind {
            GoalNoticeKind::DueSoon => today,
            GoalNoticeKind::Completed => goals
                .iter()
                .find(|goal| goal.id == notice.goal_id)
                .map_or(today, |goal| goal.deadline),
        };

        notifications.push(NewNotification {
            user_id,
            notification_type: NotificationType::Goal,
            subject: notice.goal_id.to_string(),
            occurrence_date,
            message: notice.message,
        });
    }

    notifications
}

/// Generate and store the notifications for `user_id` on `today`.
///
/// Returns the number of notifications that were new.
pub fn generate_and_store(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<usize, Error> {
    let transactions = get_transactions(user_id, &TransactionFilter::default(), connection)?;
    let budgets = get_budgets(user_id, connection)?;
    let goals = get_goals(user_id, connection)?;

    let mut created = 0;
    for notification in generate_notifications(user_id, today, &transactions, &budgets, &goals) {
        if insert_notification(&notification, connection)? {
            created += 1;
        }
    }

    tracing::debug!("stored {created} new notifications for user {user_id}");

    Ok(created)
}
