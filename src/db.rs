//! Database initialization.
//!
//! Each feature module owns its table schema; this module wires them together
//! so that the whole schema is created atomically.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, auth::create_user_table, category::create_category_table,
    category::seed_default_categories, goal::create_goal_table,
    transaction::create_transaction_table,
};

/// Create the application's tables if they do not exist.
///
/// Also seeds the default category pick-list on a fresh database.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_goal_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}
