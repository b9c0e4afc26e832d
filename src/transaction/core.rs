//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID, money::Cents};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether a transaction brought money in or spent it.
///
/// The sign of a transaction is carried here; amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        TransactionKind::from_str(text)
            .map_err(|error| FromSqlError::Other(Box::new(std::io::Error::other(error.to_string()))))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned, always positive.
    pub amount: Cents,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category label of the transaction, e.g. "Food & Dining".
    ///
    /// Labels are matched exactly everywhere in the app, with no
    /// normalization or case-folding.
    pub category: String,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened, as a UTC calendar date.
    pub date: Date,
}

/// The data needed to record a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: UserID,
    pub amount: Cents,
    pub description: String,
    pub category: String,
    pub kind: TransactionKind,
    pub date: Date,
}

impl NewTransaction {
    /// Check the invariants the aggregation engine relies on: a strictly
    /// positive amount and a date no later than `today`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] for a non-positive amount, or an
    /// [Error::FutureDate] for a date after `today`.
    pub fn validate(self, today: Date) -> Result<Self, Error> {
        if !self.amount.is_positive() {
            return Err(Error::InvalidAmount(self.amount.to_decimal_string()));
        }

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// The caller is expected to have validated the transaction with
/// [NewTransaction::validate]; the table's CHECK constraint is a backstop.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not positive,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, description, category, kind, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, amount, description, category, kind, date",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                new_transaction.amount,
                &new_transaction.description,
                &new_transaction.category,
                new_transaction.kind,
                new_transaction.date,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_CHECK,
                },
                _,
            ) => Error::InvalidAmount(new_transaction.amount.to_decimal_string()),
            error => error.into(),
        })
}

/// Retrieve a transaction owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, description, category, kind, date
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve one page of the transactions owned by `user_id`, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions_page_for_user(
    user_id: UserID,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, description, category, kind, date
             FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY date DESC, id DESC
             LIMIT :limit OFFSET :offset",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64()),
                (":limit", &(limit as i64)),
                (":offset", &(offset as i64)),
            ],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
            |row| row.get::<_, i64>(0).map(|count| count as u64),
        )
        .map_err(|error| error.into())
}

/// Overwrite the stored transaction with `transaction`.
///
/// The update is scoped to the owner in `transaction.user_id`; a user cannot
/// update another user's transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if no matching transaction exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET amount = ?1, description = ?2, category = ?3, kind = ?4, date = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            transaction.amount,
            &transaction.description,
            &transaction.category,
            transaction.kind,
            transaction.date,
            transaction.id,
            transaction.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if no matching transaction exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Composite index used by the transactions page and the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        kind: row.get(5)?,
        date: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod test_utils {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::Date;

    use crate::{
        auth::{NewUser, PasswordHash, UserID, create_user},
        db::initialize,
        money::Cents,
    };

    use super::{NewTransaction, TransactionKind};

    /// An in-memory database with the full schema and one user.
    pub fn get_test_connection_and_user() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            NewUser {
                email: EmailAddress::from_str("test@example.com").unwrap(),
                name: None,
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &conn,
        )
        .unwrap();

        (conn, user.id)
    }

    pub fn new_transaction(
        user_id: UserID,
        amount: Cents,
        kind: TransactionKind,
        category: &str,
        date: Date,
    ) -> NewTransaction {
        NewTransaction {
            user_id,
            amount,
            description: String::new(),
            category: category.to_owned(),
            kind,
            date,
        }
    }
}

#[cfg(test)]
mod validation_tests {
    use time::macros::date;

    use crate::{Error, auth::UserID, money::Cents};

    use super::{NewTransaction, TransactionKind, test_utils::new_transaction};

    fn build(amount: Cents, date: time::Date) -> NewTransaction {
        new_transaction(UserID::new(1), amount, TransactionKind::Expense, "Food", date)
    }

    #[test]
    fn accepts_positive_amount_on_or_before_today() {
        let today = date!(2025 - 10 - 05);

        assert!(build(Cents::new(100), today).validate(today).is_ok());
        assert!(
            build(Cents::new(100), date!(2025 - 10 - 04))
                .validate(today)
                .is_ok()
        );
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let today = date!(2025 - 10 - 05);

        for amount in [Cents::ZERO, Cents::new(-100)] {
            let result = build(amount, today).validate(today);

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "{amount:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn rejects_future_dates() {
        let today = date!(2025 - 10 - 05);
        let tomorrow = date!(2025 - 10 - 06);

        let result = build(Cents::new(100), tomorrow).validate(today);

        assert_eq!(result, Err(Error::FutureDate(tomorrow)));
    }
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{Error, auth::UserID, money::Cents};

    use super::{
        TransactionKind, count_transactions_for_user, create_transaction, delete_transaction,
        get_transaction, get_transactions_page_for_user,
        test_utils::{get_test_connection_and_user, new_transaction},
        update_transaction,
    };

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_test_connection_and_user();
        let amount = Cents::new(1230);

        let transaction = create_transaction(
            new_transaction(
                user_id,
                amount,
                TransactionKind::Expense,
                "Food & Dining",
                date!(2025 - 10 - 05),
            ),
            &conn,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, amount);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.category, "Food & Dining");
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        // The CHECK constraint is the backstop behind NewTransaction::validate.
        let (conn, user_id) = get_test_connection_and_user();

        let result = create_transaction(
            new_transaction(
                user_id,
                Cents::ZERO,
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 05),
            ),
            &conn,
        );

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn get_transaction_is_owner_scoped() {
        let (conn, user_id) = get_test_connection_and_user();
        let transaction = create_transaction(
            new_transaction(
                user_id,
                Cents::new(100),
                TransactionKind::Income,
                "Salary",
                date!(2025 - 10 - 05),
            ),
            &conn,
        )
        .unwrap();

        let someone_else = UserID::new(user_id.as_i64() + 1);

        assert_eq!(
            get_transaction(transaction.id, someone_else, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_transaction(transaction.id, user_id, &conn),
            Ok(transaction)
        );
    }

    #[test]
    fn list_returns_most_recent_first() {
        let (conn, user_id) = get_test_connection_and_user();
        let older = create_transaction(
            new_transaction(
                user_id,
                Cents::new(100),
                TransactionKind::Expense,
                "Food",
                date!(2025 - 09 - 01),
            ),
            &conn,
        )
        .unwrap();
        let newer = create_transaction(
            new_transaction(
                user_id,
                Cents::new(200),
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 01),
            ),
            &conn,
        )
        .unwrap();

        let transactions = get_transactions_page_for_user(user_id, 10, 0, &conn).unwrap();

        assert_eq!(transactions, vec![newer, older]);
    }

    #[test]
    fn list_respects_limit_and_offset() {
        let (conn, user_id) = get_test_connection_and_user();
        for day in 1u8..=5 {
            create_transaction(
                new_transaction(
                    user_id,
                    Cents::new(i64::from(day) * 100),
                    TransactionKind::Expense,
                    "Food",
                    date!(2025 - 10 - 01).replace_day(day).unwrap(),
                ),
                &conn,
            )
            .unwrap();
        }

        let page = get_transactions_page_for_user(user_id, 2, 2, &conn).unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].date, date!(2025 - 10 - 03));
        assert_eq!(page[1].date, date!(2025 - 10 - 02));
    }

    #[test]
    fn count_is_owner_scoped() {
        let (conn, user_id) = get_test_connection_and_user();
        let want_count = 3;
        for _ in 0..want_count {
            create_transaction(
                new_transaction(
                    user_id,
                    Cents::new(100),
                    TransactionKind::Expense,
                    "Food",
                    date!(2025 - 10 - 05),
                ),
                &conn,
            )
            .unwrap();
        }

        assert_eq!(
            count_transactions_for_user(user_id, &conn),
            Ok(want_count)
        );
        assert_eq!(
            count_transactions_for_user(UserID::new(user_id.as_i64() + 1), &conn),
            Ok(0)
        );
    }

    #[test]
    fn update_overwrites_fields() {
        let (conn, user_id) = get_test_connection_and_user();
        let mut transaction = create_transaction(
            new_transaction(
                user_id,
                Cents::new(100),
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 05),
            ),
            &conn,
        )
        .unwrap();

        transaction.amount = Cents::new(250);
        transaction.category = "Transportation".to_owned();
        transaction.kind = TransactionKind::Income;
        update_transaction(&transaction, &conn).expect("Could not update transaction");

        let stored = get_transaction(transaction.id, user_id, &conn).unwrap();
        assert_eq!(stored, transaction);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (conn, user_id) = get_test_connection_and_user();
        let transaction = create_transaction(
            new_transaction(
                user_id,
                Cents::new(100),
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 05),
            ),
            &conn,
        )
        .unwrap();

        let mut missing = transaction.clone();
        missing.id += 1;

        assert_eq!(
            update_transaction(&missing, &conn),
            Err(Error::UpdateMissingTransaction)
        );
    }

    #[test]
    fn delete_removes_transaction() {
        let (conn, user_id) = get_test_connection_and_user();
        let transaction = create_transaction(
            new_transaction(
                user_id,
                Cents::new(100),
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 05),
            ),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, user_id, &conn).expect("Could not delete");

        assert_eq!(
            get_transaction(transaction.id, user_id, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(transaction.id, user_id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }
}
