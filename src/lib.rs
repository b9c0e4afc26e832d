//! Centsible is a web app for tracking your personal finances: record income
//! and expenses, categorize them, set savings goals, and keep an eye on where
//! the money goes from a dashboard with charts and rule-based insights.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod goal;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod pagination;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, get_user_by_id};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use money::Cents;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::AlertTemplate, html::render, internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email and password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing a date or creating the new cookie expiry
    /// date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not parse or format date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string used to register a user could not be parsed as an email
    /// address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email used to register a user already belongs to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A transaction or goal amount could not be parsed as a positive number
    /// of dollars and cents.
    #[error("\"{0}\" is not a valid dollar amount")]
    InvalidAmount(String),

    /// A transaction kind other than income or expense was submitted.
    #[error("\"{0}\" is not a valid transaction kind")]
    InvalidTransactionKind(String),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The specified category name already exists in the database.
    #[error("the category \"{0}\" already exists in the database")]
    DuplicateCategoryName(String),

    /// An empty string was used as the title of a savings goal.
    #[error("Goal title cannot be empty")]
    EmptyGoalTitle,

    /// A goal status other than active, completed or cancelled was submitted.
    #[error("\"{0}\" is not a valid goal status")]
    InvalidGoalStatus(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::FutureDate(date) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid transaction date",
                    &format!(
                        "{date} is a date in the future, which is not allowed. \
                        Change the date to today or earlier."
                    ),
                )
                .into_markup(),
            ),
            Error::InvalidAmount(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid amount",
                    &format!(
                        "\"{raw}\" is not a valid dollar amount. \
                        Enter a positive number with at most two decimal places."
                    ),
                )
                .into_markup(),
            ),
            Error::InvalidTransactionKind(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid transaction kind",
                    &format!("\"{raw}\" is not a valid transaction kind. Choose income or expense."),
                )
                .into_markup(),
            ),
            Error::EmptyCategoryName => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error("Invalid category name", "The category name cannot be empty.")
                    .into_markup(),
            ),
            Error::DuplicateCategoryName(name) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Duplicate category",
                    &format!(
                        "The category {name} already exists. \
                        Choose a different name, or edit or delete the existing category.",
                    ),
                )
                .into_markup(),
            ),
            Error::EmptyGoalTitle => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error("Invalid goal title", "The goal title cannot be empty.")
                    .into_markup(),
            ),
            Error::InvalidGoalStatus(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid goal status",
                    &format!(
                        "\"{raw}\" is not a valid goal status. \
                        Choose active, completed or cancelled."
                    ),
                )
                .into_markup(),
            ),
            Error::InvalidDateFormat(error, raw) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid date",
                    &format!("Could not read the date \"{raw}\": {error}"),
                )
                .into_markup(),
            ),
            Error::UpdateMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update category",
                    "The category could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingGoal => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not update goal", "The goal could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingGoal => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete goal",
                    "The goal could not be found. \
                    Try refreshing the page to see if the goal has already been deleted.",
                )
                .into_markup(),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertTemplate::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_markup(),
            ),
        }
    }
}
