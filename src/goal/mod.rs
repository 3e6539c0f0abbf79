//! Savings goals, their milestones and progress.

mod db;
mod domain;
mod endpoints;
mod tracker;

pub use db::{create_goal_tables, get_goals};
pub use domain::{Goal, GoalForm, GoalStatus, Milestone, NewGoal, status_for, validate_amount};
pub use endpoints::{
    add_milestone_endpoint, create_goal_endpoint, delete_goal_endpoint, get_goal_endpoint,
    goal_notifications_endpoint, list_goals_endpoint, mark_complete_endpoint,
    update_progress_endpoint,
};
pub use tracker::{
    GoalNotice, GoalNoticeKind, GoalQuery, add_milestone, goal_notices, mark_complete,
    select_goals, update_progress,
};

#[cfg(test)]
pub use db::{create_goal, get_goal};
