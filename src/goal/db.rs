//! Database operations for goals and their milestones.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    database_id::GoalId,
    goal::{Goal, GoalStatus, Milestone, NewGoal, status_for},
};

const GOAL_COLUMNS: &str = "id, user_id, title, target_amount, current_amount, deadline, status";

/// Store a goal and its initial milestones.
pub fn create_goal(new_goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    let transaction = connection.unchecked_transaction()?;

    let goal_id: GoalId = transaction.query_row(
        "INSERT INTO goal (user_id, title, target_amount, current_amount, deadline, status) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
        rusqlite::params![
            new_goal.user_id.as_i64(),
            new_goal.title,
            new_goal.target_amount,
            new_goal.current_amount,
            new_goal.deadline,
            status_for(new_goal.current_amount, new_goal.target_amount),
        ],
        |row| row.get(0),
    )?;

    for amount in new_goal.milestone_amounts {
        insert_milestone(goal_id, amount, new_goal.current_amount, &transaction)?;
    }

    transaction.commit()?;

    get_goal(goal_id, new_goal.user_id, connection)
}

/// Retrieve a goal owned by `user_id` along with its milestones.
pub fn get_goal(goal_id: GoalId, user_id: UserID, connection: &Connection) -> Result<Goal, Error> {
    let mut goal = connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((goal_id, user_id.as_i64()), map_goal_row)?;

    goal.milestones = get_milestones(goal.id, connection)?;

    Ok(goal)
}

/// Retrieve all of a user's goals in the order they were created.
pub fn get_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    let mut goals = connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal WHERE user_id = ?1 ORDER BY id ASC"
        ))?
        .query_map([user_id.as_i64()], map_goal_row)?
        .collect::<Result<Vec<_>, _>>()?;

    for goal in &mut goals {
        goal.milestones = get_milestones(goal.id, connection)?;
    }

    Ok(goals)
}

/// Set a goal's current amount and status and recompute its milestones.
///
/// The caller is responsible for checking the amount against the target.
pub fn set_goal_progress(
    goal_id: GoalId,
    user_id: UserID,
    current_amount: f64,
    status: GoalStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let rows_affected = transaction.execute(
        "UPDATE goal SET current_amount = ?3, status = ?4 WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![goal_id, user_id.as_i64(), current_amount, status],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    transaction.execute(
        "UPDATE goal_milestone SET achieved = (amount <= ?2) WHERE goal_id = ?1",
        rusqlite::params![goal_id, current_amount],
    )?;

    transaction.commit()?;

    Ok(())
}

/// Add a milestone to a goal, marking it achieved if `current_amount` has reached it.
pub fn insert_milestone(
    goal_id: GoalId,
    amount: f64,
    current_amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO goal_milestone (goal_id, amount, achieved) VALUES (?1, ?2, ?3)",
        rusqlite::params![goal_id, amount, current_amount >= amount],
    )?;

    Ok(())
}

/// Delete a goal and its milestones.
pub fn delete_goal(goal_id: GoalId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        (goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the goal and goal milestone tables.
pub fn create_goal_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            target_amount REAL NOT NULL CHECK (target_amount >= 0),
            current_amount REAL NOT NULL CHECK (current_amount >= 0),
            deadline TEXT NOT NULL,
            status TEXT NOT NULL,
            CHECK (current_amount <= target_amount),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_goal_user ON goal(user_id);

        CREATE TABLE IF NOT EXISTS goal_milestone (
            id INTEGER PRIMARY KEY,
            goal_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            achieved INTEGER NOT NULL,
            FOREIGN KEY(goal_id) REFERENCES goal(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_goal_milestone_goal ON goal_milestone(goal_id);",
    )?;

    Ok(())
}

fn get_milestones(goal_id: GoalId, connection: &Connection) -> Result<Vec<Milestone>, Error> {
    connection
        .prepare(
            "SELECT amount, achieved FROM goal_milestone WHERE goal_id = ?1 \
             ORDER BY amount ASC, id ASC",
        )?
        .query_map([goal_id], |row| {
            Ok(Milestone {
                amount: row.get(0)?,
                achieved: row.get(1)?,
            })
        })?
        .map(|maybe_milestone| maybe_milestone.map_err(|error| error.into()))
        .collect()
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        deadline: row.get(5)?,
        status: row.get(6)?,
        milestones: Vec::new(),
    })
}
