//! Database operations for budgets.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    budget::{Budget, BudgetPeriod, CustomPeriod, NewBudget},
    database_id::BudgetId,
};

const BUDGET_COLUMNS: &str = "id, user_id, category, amount, original_amount, currency, period, \
    custom_start_date, custom_end_date, recurrence, alert_threshold";

/// Create a budget and return it with its generated ID.
pub fn create_budget(budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let (custom_start_date, custom_end_date) = split_custom_period(budget.custom_period);

    connection
        .prepare(&format!(
            "INSERT INTO budget (user_id, category, amount, original_amount, currency, period, \
             custom_start_date, custom_end_date, recurrence, alert_threshold) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                budget.user_id.as_i64(),
                budget.category,
                budget.amount,
                budget.original_amount,
                budget.currency,
                budget.period,
                custom_start_date,
                custom_end_date,
                budget.recurrence,
                budget.alert_threshold,
            ],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a single budget owned by `user_id`.
pub fn get_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((budget_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's budgets ordered by category.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE user_id = ?1 ORDER BY category ASC, id ASC"
        ))?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Replace a budget's fields. Returns [Error::NotFound] if the user has no such budget.
pub fn update_budget(
    budget_id: BudgetId,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    let (custom_start_date, custom_end_date) = split_custom_period(budget.custom_period);

    connection
        .prepare(&format!(
            "UPDATE budget SET category = ?3, amount = ?4, original_amount = ?5, currency = ?6, \
             period = ?7, custom_start_date = ?8, custom_end_date = ?9, recurrence = ?10, \
             alert_threshold = ?11 \
             WHERE id = ?1 AND user_id = ?2 \
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                budget_id,
                budget.user_id.as_i64(),
                budget.category,
                budget.amount,
                budget.original_amount,
                budget.currency,
                budget.period,
                custom_start_date,
                custom_end_date,
                budget.recurrence,
                budget.alert_threshold,
            ],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Delete a budget. Returns [Error::NotFound] if the user has no such budget.
pub fn delete_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            original_amount REAL NOT NULL,
            currency TEXT NOT NULL,
            period TEXT NOT NULL,
            custom_start_date TEXT,
            custom_end_date TEXT,
            recurrence TEXT,
            alert_threshold REAL NOT NULL,
            CHECK (period != 'custom' OR custom_start_date < custom_end_date),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user ON budget(user_id);",
    )?;

    Ok(())
}

fn split_custom_period(
    custom_period: Option<CustomPeriod>,
) -> (Option<time::Date>, Option<time::Date>) {
    match custom_period {
        Some(CustomPeriod {
            start_date,
            end_date,
        }) => (Some(start_date), Some(end_date)),
        None => (None, None),
    }
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let period: BudgetPeriod = row.get(6)?;
    let custom_period = match (row.get(7)?, row.get(8)?) {
        (Some(start_date), Some(end_date)) if period == BudgetPeriod::Custom => {
            Some(CustomPeriod {
                start_date,
                end_date,
            })
        }
        _ => None,
    };

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        amount: row.get(3)?,
        original_amount: row.get(4)?,
        currency: row.get(5)?,
        period,
        custom_period,
        recurrence: row.get(9)?,
        alert_threshold: row.get(10)?,
    })
}

#[cfg(test)]
mod budget_query_tests {
    use time::macros::date;

    use crate::{
        CurrencyCode, Error, UserID,
        budget::{BudgetPeriod, CustomPeriod, NewBudget},
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{create_budget, delete_budget, get_budget, get_budgets, update_budget};

    fn new_budget(user_id: UserID, category: &str, period: BudgetPeriod) -> NewBudget {
        NewBudget {
            user_id,
            category: category.to_owned(),
            amount: 200.0,
            original_amount: 200.0,
            currency: CurrencyCode::canonical(),
            period,
            custom_period: None,
            recurrence: None,
            alert_threshold: 90.0,
        }
    }

    #[test]
    fn create_and_get_budget() {
        let connection = get_test_connection();
        let user_id = insert_test_user("foo@bar.baz", &connection);
        let mut budget = new_budget(user_id, "Holiday", BudgetPeriod::Custom);
        budget.custom_period = Some(CustomPeriod {
            start_date: date!(2025 - 12 - 20),
            end_date: date!(2026 - 01 - 05),
        });

        let created = create_budget(budget, &connection).unwrap();

        assert!(created.id > 0);
        assert_eq!(created.custom_period.unwrap().end_date, date!(2026 - 01 - 05));
        assert_eq!(get_budget(created.id, user_id, &connection).unwrap(), created);
    }

    #[test]
    fn custom_budget_without_valid_dates_is_rejected_by_the_database() {
        let connection = get_test_connection();
        let user_id = insert_test_user("foo@bar.baz", &connection);
        let mut budget = new_budget(user_id, "Holiday", BudgetPeriod::Custom);
        budget.custom_period = Some(CustomPeriod {
            start_date: date!(2026 - 01 - 05),
            end_date: date!(2025 - 12 - 20),
        });

        assert!(create_budget(budget, &connection).is_err());
    }

    #[test]
    fn list_is_scoped_to_user_and_sorted_by_category() {
        let connection = get_test_connection();
        let user_id = insert_test_user("foo@bar.baz", &connection);
        let other = insert_test_user("other@bar.baz", &connection);
        create_budget(new_budget(user_id, "Fuel", BudgetPeriod::Weekly), &connection).unwrap();
        create_budget(new_budget(user_id, "Food", BudgetPeriod::Monthly), &connection).unwrap();
        create_budget(new_budget(other, "Rent", BudgetPeriod::Monthly), &connection).unwrap();

        let categories: Vec<_> = get_budgets(user_id, &connection)
            .unwrap()
            .into_iter()
            .map(|budget| budget.category)
            .collect();

        assert_eq!(categories, vec!["Food", "Fuel"]);
    }

    #[test]
    fn update_and_delete_require_ownership() {
        let connection = get_test_connection();
        let user_id = insert_test_user("foo@bar.baz", &connection);
        let other = insert_test_user("other@bar.baz", &connection);
        let budget =
            create_budget(new_budget(user_id, "Food", BudgetPeriod::Weekly), &connection).unwrap();

        assert_eq!(
            update_budget(budget.id, new_budget(other, "Food", BudgetPeriod::Yearly), &connection),
            Err(Error::NotFound)
        );
        assert_eq!(delete_budget(budget.id, other, &connection), Err(Error::NotFound));

        let updated = update_budget(
            budget.id,
            new_budget(user_id, "Groceries", BudgetPeriod::Yearly),
            &connection,
        )
        .unwrap();
        assert_eq!(updated.category, "Groceries");
        assert_eq!(updated.period, BudgetPeriod::Yearly);

        delete_budget(budget.id, user_id, &connection).unwrap();
        assert_eq!(get_budget(budget.id, user_id, &connection), Err(Error::NotFound));
    }
}
