//! Defines the core data model and database queries for savings goals.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID, money::Cents};

/// Database identifier for a savings goal.
pub type GoalId = i64;

/// The lifecycle state of a savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Cancelled,
}

impl GoalStatus {
    fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "cancelled" => Ok(GoalStatus::Cancelled),
            other => Err(Error::InvalidGoalStatus(other.to_owned())),
        }
    }
}

impl ToSql for GoalStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GoalStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        GoalStatus::from_str(text).map_err(|_| FromSqlError::InvalidType)
    }
}

/// A savings goal: an amount the user wants to put aside, optionally by a
/// target date.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user that owns the goal.
    pub user_id: UserID,
    /// What the user is saving for, e.g. "Emergency fund".
    pub title: String,
    /// The amount the user wants to reach.
    pub target_amount: Cents,
    /// The amount saved so far.
    pub current_amount: Cents,
    /// The date the user wants to reach the target by, if any.
    pub target_date: Option<Date>,
    /// Whether the goal is still being worked towards.
    pub status: GoalStatus,
}

impl Goal {
    /// How far along the goal is, as a percentage clamped to [0, 100].
    ///
    /// A goal with a zero target reports 100% once anything is saved.
    pub fn progress_percent(&self) -> f64 {
        if !self.target_amount.is_positive() {
            return if self.current_amount.is_positive() {
                100.0
            } else {
                0.0
            };
        }

        let ratio = self.current_amount.count() as f64 / self.target_amount.count() as f64;
        (ratio * 100.0).clamp(0.0, 100.0)
    }

    /// The number of whole days between `today` and the target date.
    ///
    /// Negative when the target date has passed; `None` for open-ended goals.
    pub fn days_remaining(&self, today: Date) -> Option<i64> {
        self.target_date
            .map(|target_date| (target_date - today).whole_days())
    }
}

/// The data needed to create a new savings goal.
///
/// New goals start active with nothing saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub user_id: UserID,
    pub title: String,
    pub target_amount: Cents,
    pub target_date: Option<Date>,
}

impl NewGoal {
    /// Check that the goal has a title and a positive target.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyGoalTitle] or [Error::InvalidAmount].
    pub fn validate(mut self) -> Result<Self, Error> {
        self.title = self.title.trim().to_owned();

        if self.title.is_empty() {
            return Err(Error::EmptyGoalTitle);
        }

        if !self.target_amount.is_positive() {
            return Err(Error::InvalidAmount(self.target_amount.to_decimal_string()));
        }

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new savings goal in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_goal(new_goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "INSERT INTO goal (user_id, title, target_amount, current_amount, target_date, status)
             VALUES (?1, ?2, ?3, 0, ?4, 'active')
             RETURNING id, user_id, title, target_amount, current_amount, target_date, status",
        )?
        .query_row(
            (
                new_goal.user_id.as_i64(),
                &new_goal.title,
                new_goal.target_amount,
                new_goal.target_date,
            ),
            map_goal_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a goal owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a goal owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_goal(id: GoalId, user_id: UserID, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, target_amount, current_amount, target_date, status
             FROM goal WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_goal_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all goals owned by `user_id`, most recently created first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_goals_for_user(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, target_amount, current_amount, target_date, status
             FROM goal WHERE user_id = :user_id ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the stored goal with `goal`, scoped to its owner.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingGoal] if no matching goal exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_goal(goal: &Goal, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal
         SET title = ?1, target_amount = ?2, current_amount = ?3, target_date = ?4, status = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            &goal.title,
            goal.target_amount,
            goal.current_amount,
            goal.target_date,
            goal.status,
            goal.id,
            goal.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Update only the saved amount of a goal, scoped to its owner.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingGoal] if no matching goal exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_goal_progress(
    id: GoalId,
    user_id: UserID,
    current_amount: Cents,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal SET current_amount = ?1 WHERE id = ?2 AND user_id = ?3",
        (current_amount, id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Delete the goal with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingGoal] if no matching goal exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_goal(id: GoalId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

/// Create the goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                target_amount INTEGER NOT NULL CHECK (target_amount > 0),
                current_amount INTEGER NOT NULL DEFAULT 0,
                target_date TEXT,
                status TEXT NOT NULL CHECK (status IN ('active', 'completed', 'cancelled')),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        target_date: row.get(5)?,
        status: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod progress_tests {
    use time::macros::date;

    use crate::{auth::UserID, money::Cents};

    use super::{Goal, GoalStatus};

    fn build_goal(current: Cents, target: Cents, target_date: Option<time::Date>) -> Goal {
        Goal {
            id: 1,
            user_id: UserID::new(1),
            title: "Emergency fund".to_owned(),
            target_amount: target,
            current_amount: current,
            target_date,
            status: GoalStatus::Active,
        }
    }

    #[test]
    fn progress_is_a_percentage_of_the_target() {
        let goal = build_goal(Cents::new(25_000), Cents::new(100_000), None);

        assert_eq!(goal.progress_percent(), 25.0);
    }

    #[test]
    fn progress_is_clamped_to_one_hundred() {
        let goal = build_goal(Cents::new(150_000), Cents::new(100_000), None);

        assert_eq!(goal.progress_percent(), 100.0);
    }

    #[test]
    fn progress_handles_zero_target() {
        assert_eq!(build_goal(Cents::ZERO, Cents::ZERO, None).progress_percent(), 0.0);
        assert_eq!(
            build_goal(Cents::new(1), Cents::ZERO, None).progress_percent(),
            100.0
        );
    }

    #[test]
    fn days_remaining_counts_down_to_the_target_date() {
        let goal = build_goal(
            Cents::ZERO,
            Cents::new(100),
            Some(date!(2025 - 12 - 25)),
        );

        assert_eq!(goal.days_remaining(date!(2025 - 12 - 20)), Some(5));
        assert_eq!(goal.days_remaining(date!(2025 - 12 - 31)), Some(-6));
    }

    #[test]
    fn days_remaining_is_none_for_open_ended_goals() {
        let goal = build_goal(Cents::ZERO, Cents::new(100), None);

        assert_eq!(goal.days_remaining(date!(2025 - 12 - 20)), None);
    }
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error, auth::UserID, money::Cents,
        transaction::test_utils::get_test_connection_and_user,
    };

    use super::{
        GoalStatus, NewGoal, create_goal, delete_goal, get_goal, get_goals_for_user, update_goal,
        update_goal_progress,
    };

    fn new_goal(user_id: UserID) -> NewGoal {
        NewGoal {
            user_id,
            title: "Emergency fund".to_owned(),
            target_amount: Cents::new(100_000),
            target_date: Some(date!(2026 - 06 - 01)),
        }
    }

    #[test]
    fn create_goal_starts_active_with_nothing_saved() {
        let (conn, user_id) = get_test_connection_and_user();

        let goal = create_goal(new_goal(user_id), &conn).expect("Could not create goal");

        assert!(goal.id > 0);
        assert_eq!(goal.status, GoalStatus::Active);
        assert_eq!(goal.current_amount, Cents::ZERO);
        assert_eq!(goal.target_date, Some(date!(2026 - 06 - 01)));
    }

    #[test]
    fn validate_rejects_blank_titles_and_zero_targets() {
        let goal = NewGoal {
            user_id: UserID::new(1),
            title: "  ".to_owned(),
            target_amount: Cents::new(100),
            target_date: None,
        };
        assert_eq!(goal.validate(), Err(Error::EmptyGoalTitle));

        let goal = NewGoal {
            user_id: UserID::new(1),
            title: "Emergency fund".to_owned(),
            target_amount: Cents::ZERO,
            target_date: None,
        };
        assert!(matches!(goal.validate(), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn get_goal_is_owner_scoped() {
        let (conn, user_id) = get_test_connection_and_user();
        let goal = create_goal(new_goal(user_id), &conn).unwrap();

        let someone_else = UserID::new(user_id.as_i64() + 1);

        assert_eq!(get_goal(goal.id, someone_else, &conn), Err(Error::NotFound));
        assert_eq!(get_goal(goal.id, user_id, &conn), Ok(goal));
    }

    #[test]
    fn list_returns_most_recently_created_first() {
        let (conn, user_id) = get_test_connection_and_user();
        let first = create_goal(new_goal(user_id), &conn).unwrap();
        let second = create_goal(
            NewGoal {
                title: "New car".to_owned(),
                ..new_goal(user_id)
            },
            &conn,
        )
        .unwrap();

        let goals = get_goals_for_user(user_id, &conn).unwrap();

        assert_eq!(goals, vec![second, first]);
    }

    #[test]
    fn update_goal_overwrites_fields() {
        let (conn, user_id) = get_test_connection_and_user();
        let mut goal = create_goal(new_goal(user_id), &conn).unwrap();

        goal.title = "Bigger emergency fund".to_owned();
        goal.target_amount = Cents::new(200_000);
        goal.status = GoalStatus::Completed;
        update_goal(&goal, &conn).expect("Could not update goal");

        assert_eq!(get_goal(goal.id, user_id, &conn), Ok(goal));
    }

    #[test]
    fn update_goal_progress_changes_only_the_saved_amount() {
        let (conn, user_id) = get_test_connection_and_user();
        let goal = create_goal(new_goal(user_id), &conn).unwrap();

        update_goal_progress(goal.id, user_id, Cents::new(42_000), &conn)
            .expect("Could not update progress");

        let stored = get_goal(goal.id, user_id, &conn).unwrap();
        assert_eq!(stored.current_amount, Cents::new(42_000));
        assert_eq!(stored.title, goal.title);
        assert_eq!(stored.target_amount, goal.target_amount);
    }

    #[test]
    fn update_goal_progress_is_owner_scoped() {
        let (conn, user_id) = get_test_connection_and_user();
        let goal = create_goal(new_goal(user_id), &conn).unwrap();

        let result = update_goal_progress(
            goal.id,
            UserID::new(user_id.as_i64() + 1),
            Cents::new(42_000),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingGoal));
    }

    #[test]
    fn delete_goal_removes_it() {
        let (conn, user_id) = get_test_connection_and_user();
        let goal = create_goal(new_goal(user_id), &conn).unwrap();

        delete_goal(goal.id, user_id, &conn).expect("Could not delete goal");

        assert_eq!(get_goal(goal.id, user_id, &conn), Err(Error::NotFound));
        assert_eq!(
            delete_goal(goal.id, user_id, &conn),
            Err(Error::DeleteMissingGoal)
        );
    }
}
