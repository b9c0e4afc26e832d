//! The pages for creating and editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use maud::html;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    category::get_all_categories,
    endpoints::{self, format_endpoint},
    html::{PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    pagination::PaginationConfig,
    transaction::{
        core::{TransactionId, get_transaction},
        form::{TransactionFormValues, transaction_form},
    },
};

/// The state needed for the transaction pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Display the page for recording a new transaction.
pub async fn get_new_transaction_page(
    State(state): State<TransactionsState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    // All dates in the app are UTC calendar dates.
    let today = OffsetDateTime::now_utc().date();
    let values = TransactionFormValues::empty(today);

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New Transaction" }

            (transaction_form(endpoints::TRANSACTIONS_API, false, &values, &categories))
        }
    );

    Ok(base("New Transaction", &[dollar_input_styles()], &content).into_response())
}

/// Display the page for editing an existing transaction.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let values = TransactionFormValues::from(&transaction);
    let action_url = format_endpoint(endpoints::TRANSACTION, transaction.id);

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit Transaction" }

            (transaction_form(&action_url, true, &values, &categories))
        }
    );

    Ok(base("Edit Transaction", &[dollar_input_styles()], &content).into_response())
}

#[cfg(test)]
mod transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, body::Body, extract::{Path, State}, http::Response};
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        money::Cents,
        pagination::PaginationConfig,
        transaction::{
            core::{TransactionKind, create_transaction},
            test_utils::{get_test_connection_and_user, new_transaction},
        },
    };

    use super::{TransactionsState, get_edit_transaction_page, get_new_transaction_page};

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn new_transaction_page_shows_form_with_category_suggestions() {
        let (conn, _user_id) = get_test_connection_and_user();
        let state = TransactionsState {
            db_connection: Arc::new(Mutex::new(conn)),
            pagination_config: PaginationConfig::default(),
        };

        let response = get_new_transaction_page(State(state)).await.unwrap();
        let html = parse_html(response).await;

        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );

        let form_selector = Selector::parse("form").unwrap();
        assert!(html.select(&form_selector).next().is_some());

        let datalist_selector = Selector::parse("datalist#category-options option").unwrap();
        assert!(
            html.select(&datalist_selector).count() > 0,
            "expected seeded categories in the datalist"
        );
    }

    #[tokio::test]
    async fn edit_transaction_page_prefills_form() {
        let (conn, user_id) = get_test_connection_and_user();
        let transaction = create_transaction(
            new_transaction(
                user_id,
                Cents::new(1234),
                TransactionKind::Expense,
                "Food & Dining",
                date!(2025 - 10 - 04),
            ),
            &conn,
        )
        .unwrap();
        let state = TransactionsState {
            db_connection: Arc::new(Mutex::new(conn)),
            pagination_config: PaginationConfig::default(),
        };

        let response = get_edit_transaction_page(
            State(state),
            Extension(user_id),
            Path(transaction.id),
        )
        .await
        .unwrap();
        let html = parse_html(response).await;

        let amount_selector = Selector::parse("input#amount").unwrap();
        let amount_input = html.select(&amount_selector).next().unwrap();
        assert_eq!(amount_input.value().attr("value"), Some("12.34"));

        let category_selector = Selector::parse("input#category").unwrap();
        let category_input = html.select(&category_selector).next().unwrap();
        assert_eq!(category_input.value().attr("value"), Some("Food & Dining"));
    }

    #[tokio::test]
    async fn edit_transaction_page_is_owner_scoped() {
        let (conn, user_id) = get_test_connection_and_user();
        let transaction = create_transaction(
            new_transaction(
                user_id,
                Cents::new(1234),
                TransactionKind::Expense,
                "Food",
                date!(2025 - 10 - 04),
            ),
            &conn,
        )
        .unwrap();
        let state = TransactionsState {
            db_connection: Arc::new(Mutex::new(conn)),
            pagination_config: PaginationConfig::default(),
        };

        let someone_else = crate::auth::UserID::new(user_id.as_i64() + 1);
        let result = get_edit_transaction_page(
            State(state),
            Extension(someone_else),
            Path(transaction.id),
        )
        .await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
