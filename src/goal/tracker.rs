//! Goal progress updates, listing and due-soon/completed messages.

use std::cmp::Ordering;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    database_id::GoalId,
    goal::{
        Goal, GoalStatus,
        db::{get_goal, insert_milestone, set_goal_progress},
        status_for, validate_amount,
    },
};

/// The number of days before a deadline that a goal counts as due soon.
pub const DUE_SOON_DAYS: i64 = 7;

/// Set the amount saved towards a goal.
///
/// The goal is marked completed once the amount reaches the target and in
/// progress otherwise. Milestones are recomputed.
///
/// # Errors
///
/// Returns [Error::InvalidProgress] and leaves the goal unchanged if
/// `current_amount` exceeds the goal's target amount.
pub fn update_progress(
    goal_id: GoalId,
    user_id: UserID,
    current_amount: f64,
    connection: &Connection,
) -> Result<Goal, Error> {
    let goal = get_goal(goal_id, user_id, connection)?;
    let current_amount = validate_amount("current amount", current_amount)?;

    if current_amount > goal.target_amount {
        return Err(Error::InvalidProgress {
            current_amount,
            target_amount: goal.target_amount,
        });
    }

    set_goal_progress(
        goal_id,
        user_id,
        current_amount,
        status_for(current_amount, goal.target_amount),
        connection,
    )?;

    get_goal(goal_id, user_id, connection)
}

/// Mark a goal as completed, filling its current amount up to the target.
pub fn mark_complete(
    goal_id: GoalId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Goal, Error> {
    let goal = get_goal(goal_id, user_id, connection)?;

    set_goal_progress(
        goal_id,
        user_id,
        goal.target_amount,
        GoalStatus::Completed,
        connection,
    )?;

    get_goal(goal_id, user_id, connection)
}

/// Add a milestone to a goal.
pub fn add_milestone(
    goal_id: GoalId,
    user_id: UserID,
    amount: f64,
    connection: &Connection,
) -> Result<Goal, Error> {
    let goal = get_goal(goal_id, user_id, connection)?;
    let amount = validate_amount("milestone amount", amount)?;

    insert_milestone(goal_id, amount, goal.current_amount, connection)?;

    get_goal(goal_id, user_id, connection)
}

/// How to order a goal listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalSort {
    /// Furthest along first.
    Progress,
    /// Earliest deadline first.
    Deadline,
}

/// Which goals to include in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalFilter {
    Completed,
    Incomplete,
}

/// The query parameters for listing goals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GoalQuery {
    pub sort_by: Option<GoalSort>,
    pub filter_by: Option<GoalFilter>,
}

/// Filter then sort `goals`. Ties keep their original order.
pub fn select_goals(mut goals: Vec<Goal>, query: GoalQuery) -> Vec<Goal> {
    match query.filter_by {
        Some(GoalFilter::Completed) => goals.retain(|goal| goal.status == GoalStatus::Completed),
        Some(GoalFilter::Incomplete) => {
            goals.retain(|goal| goal.status == GoalStatus::InProgress)
        }
        None => {}
    }

    match query.sort_by {
        Some(GoalSort::Progress) => goals.sort_by(|a, b| {
            progress_ratio(b)
                .partial_cmp(&progress_ratio(a))
                .unwrap_or(Ordering::Equal)
        }),
        Some(GoalSort::Deadline) => goals.sort_by_key(|goal| goal.deadline),
        None => {}
    }

    goals
}

fn progress_ratio(goal: &Goal) -> f64 {
    if goal.target_amount <= 0.0 {
        0.0
    } else {
        goal.current_amount / goal.target_amount
    }
}

/// Why a goal needs the user's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalNoticeKind {
    DueSoon,
    Completed,
}

/// A message about a goal that needs the user's attention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalNotice {
    pub goal_id: GoalId,
    pub kind: GoalNoticeKind,
    pub message: String,
}

/// The due-soon and completed messages for `goals` on `today`.
///
/// A goal is due soon when its deadline is between one and
/// [DUE_SOON_DAYS] days away. A goal can have both messages.
pub fn goal_notices(goals: &[Goal], today: Date) -> Vec<GoalNotice> {
    let mut notices = Vec::new();

    for goal in goals {
        let days = goal.days_until_deadline(today);
        if 0 < days && days <= DUE_SOON_DAYS {
            let unit = if days == 1 { "day" } else { "days" };
            notices.push(GoalNotice {
                goal_id: goal.id,
                kind: GoalNoticeKind::DueSoon,
                message: format!("Goal \"{}\" is due in {days} {unit}.", goal.title),
            });
        }

        if goal.progress() >= 100.0 {
            notices.push(GoalNotice {
                goal_id: goal.id,
                kind: GoalNoticeKind::Completed,
                message: format!("Goal \"{}\" has been completed.", goal.title),
            });
        }
    }

    notices
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error, UserID,
        goal::{Goal, GoalStatus, Milestone, NewGoal, create_goal, get_goal},
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        GoalFilter, GoalQuery, GoalSort, add_milestone, goal_notices, mark_complete,
        select_goals, update_progress,
    };

    fn goal(id: i64, current_amount: f64, target_amount: f64, deadline: time::Date) -> Goal {
        Goal {
            id,
            user_id: UserID::new(1),
            title: format!("Goal {id}"),
            target_amount,
            current_amount,
            deadline,
            status: crate::goal::status_for(current_amount, target_amount),
            milestones: Vec::new(),
        }
    }

    fn stored_goal(connection: &rusqlite::Connection) -> (UserID, Goal) {
        let user_id = insert_test_user("foo@bar.baz", connection);
        let goal = create_goal(
            NewGoal {
                user_id,
                title: "Laptop".to_owned(),
                target_amount: 500.0,
                current_amount: 100.0,
                deadline: date!(2025 - 09 - 01),
                milestone_amounts: vec![250.0],
            },
            connection,
        )
        .unwrap();

        (user_id, goal)
    }

    #[test]
    fn progress_above_target_is_rejected_and_goal_unchanged() {
        let connection = get_test_connection();
        let (user_id, goal) = stored_goal(&connection);

        let result = update_progress(goal.id, user_id, 600.0, &connection);

        assert_eq!(
            result,
            Err(Error::InvalidProgress {
                current_amount: 600.0,
                target_amount: 500.0
            })
        );
        assert_eq!(get_goal(goal.id, user_id, &connection).unwrap(), goal);
    }

    #[test]
    fn reaching_target_completes_goal() {
        let connection = get_test_connection();
        let (user_id, goal) = stored_goal(&connection);

        let updated = update_progress(goal.id, user_id, 300.0, &connection).unwrap();
        assert_eq!(updated.status, GoalStatus::InProgress);
        assert_eq!(updated.milestones, vec![Milestone { amount: 250.0, achieved: true }]);

        let updated = update_progress(goal.id, user_id, 500.0, &connection).unwrap();
        assert_eq!(updated.status, GoalStatus::Completed);
        assert_eq!(updated.progress(), 100.0);

        let updated = update_progress(goal.id, user_id, 200.0, &connection).unwrap();
        assert_eq!(updated.status, GoalStatus::InProgress);
        assert_eq!(updated.milestones, vec![Milestone { amount: 250.0, achieved: false }]);
    }

    #[test]
    fn mark_complete_fills_goal_to_target() {
        let connection = get_test_connection();
        let (user_id, goal) = stored_goal(&connection);

        let completed = mark_complete(goal.id, user_id, &connection).unwrap();

        assert_eq!(completed.current_amount, 500.0);
        assert_eq!(completed.status, GoalStatus::Completed);
        assert!(completed.milestones.iter().all(|milestone| milestone.achieved));
    }

    #[test]
    fn add_milestone_sets_achieved_from_current_amount() {
        let connection = get_test_connection();
        let (user_id, goal) = stored_goal(&connection);

        let updated = add_milestone(goal.id, user_id, 50.0, &connection).unwrap();

        assert_eq!(
            updated.milestones,
            vec![
                Milestone { amount: 50.0, achieved: true },
                Milestone { amount: 250.0, achieved: false },
            ]
        );
    }

    #[test]
    fn filter_by_status_and_sort_by_progress() {
        let goals = vec![
            goal(1, 10.0, 100.0, date!(2025 - 05 - 01)),
            goal(2, 100.0, 100.0, date!(2025 - 04 - 01)),
            goal(3, 60.0, 100.0, date!(2025 - 03 - 01)),
        ];

        let incomplete = select_goals(
            goals.clone(),
            GoalQuery {
                sort_by: Some(GoalSort::Progress),
                filter_by: Some(GoalFilter::Incomplete),
            },
        );
        let completed = select_goals(
            goals.clone(),
            GoalQuery {
                sort_by: None,
                filter_by: Some(GoalFilter::Completed),
            },
        );
        let by_deadline = select_goals(
            goals,
            GoalQuery {
                sort_by: Some(GoalSort::Deadline),
                filter_by: None,
            },
        );

        let ids = |goals: &[Goal]| goals.iter().map(|goal| goal.id).collect::<Vec<_>>();
        assert_eq!(ids(&incomplete), vec![3, 1]);
        assert_eq!(ids(&completed), vec![2]);
        assert_eq!(ids(&by_deadline), vec![3, 2, 1]);
    }

    #[test]
    fn notices_for_due_soon_and_completed_goals() {
        let today = date!(2025 - 03 - 01);
        let goals = [
            goal(1, 10.0, 100.0, date!(2025 - 03 - 08)),
            goal(2, 10.0, 100.0, date!(2025 - 03 - 09)),
            goal(3, 10.0, 100.0, today),
            goal(4, 100.0, 100.0, date!(2025 - 03 - 02)),
        ];

        let notices = goal_notices(&goals, today);

        let summary: Vec<_> = notices
            .iter()
            .map(|notice| (notice.goal_id, notice.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Goal \"Goal 1\" is due in 7 days."),
                (4, "Goal \"Goal 4\" is due in 1 day."),
                (4, "Goal \"Goal 4\" has been completed."),
            ]
        );
    }
}
