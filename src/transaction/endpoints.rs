//! The API endpoints for creating, updating and deleting transactions.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    endpoints,
    transaction::{
        core::{
            Transaction, TransactionId, create_transaction, delete_transaction, update_transaction,
        },
        form::{TransactionForm, parse_transaction_form},
        pages::TransactionsState,
    },
};

/// Create a new transaction from the submitted form.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    // All dates in the app are UTC calendar dates.
    let today = OffsetDateTime::now_utc().date();

    let new_transaction = match parse_transaction_form(user_id, &form, today) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Update an existing transaction from the submitted form.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();

    let parsed = match parse_transaction_form(user_id, &form, today) {
        Ok(parsed) => parsed,
        Err(error) => return error.into_alert_response(),
    };

    let transaction = Transaction {
        id: transaction_id,
        user_id,
        amount: parsed.amount,
        description: parsed.description,
        category: parsed.category,
        kind: parsed.kind,
        date: parsed.date,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(&transaction, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Delete a transaction.
///
/// Returns an empty OK response so that HTMX removes the transaction's table row.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => error.into_alert_response(),
    }
}
