//! Database queries for retrieving dashboard transaction data.
//!
//! This module provides a simplified transaction view optimized for dashboard
//! aggregations, containing only the fields the aggregation functions need
//! (amount, kind, category, date).

use rusqlite::Connection;
use time::Date;

use crate::{Error, auth::UserID, money::Cents, transaction::TransactionKind};

/// A simplified transaction view for dashboard aggregations.
///
/// This is separate from the main Transaction domain model because
/// the dashboard only needs amount, kind, category and date.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub amount: Cents,
    pub kind: TransactionKind,
    pub category: String,
    pub date: Date,
}

/// Gets every transaction owned by `user_id`, in insertion order.
///
/// The aggregation functions do their own windowing and grouping, so no
/// filtering or ordering is applied here.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub(super) fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT amount, kind, category, date
             FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            Ok(Transaction {
                amount: row.get(0)?,
                kind: row.get(1)?,
                category: row.get(2)?,
                date: row.get(3)?,
            })
        })?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}
