//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
};

/// The color assigned to categories created without an explicit color.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// The category pick-list seeded into a fresh database.
const DEFAULT_CATEGORIES: [(&str, &str); 11] = [
    ("Food & Dining", "#EF4444"),
    ("Transportation", "#3B82F6"),
    ("Entertainment", "#8B5CF6"),
    ("Shopping", "#F59E0B"),
    ("Healthcare", "#10B981"),
    ("Utilities", "#6B7280"),
    ("Housing", "#8B5CF6"),
    ("Salary", "#10B981"),
    ("Freelance", "#F59E0B"),
    ("Investment", "#3B82F6"),
    ("Other", "#6B7280"),
];

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if a category with the same name exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    color: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, color) VALUES (?1, ?2);",
            (name.as_ref(), color),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        color: color.to_owned(),
    })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, color FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, color FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name and color. Returns an error if the category doesn't exist.
pub fn update_category(
    category_id: CategoryId,
    new_name: CategoryName,
    new_color: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, color = ?2 WHERE id = ?3",
        (new_name.as_ref(), new_color, category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category by ID. Returns an error if the category doesn't exist.
///
/// Transactions keep their category label; only the pick-list entry is removed.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            color TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

/// Insert the default category pick-list into an empty category table.
///
/// Does nothing if any categories already exist, so user edits and deletions
/// of the defaults are never undone.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM category", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    let mut statement = connection.prepare("INSERT INTO category (name, color) VALUES (?1, ?2)")?;
    for (name, color) in DEFAULT_CATEGORIES {
        statement.execute((name, color))?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let color = row.get(2)?;

    Ok(Category { id, name, color })
}
