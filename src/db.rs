//! Creates the application's database tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, budget::create_budget_table, goal::create_goal_tables,
    notification::create_notification_table, transaction::create_transaction_table,
};

/// Create the tables for every model if they do not exist yet.
///
/// The tables are created in a single exclusive transaction, so either all of
/// them exist afterwards or none of the new ones do.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_goal_tables(&transaction)?;
    create_notification_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
