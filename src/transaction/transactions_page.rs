//! The page listing a user's transactions with pagination.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, link,
    },
    navigation::NavBar,
    pagination::{PaginationIndicator, create_pagination_indicators},
    transaction::{
        core::{Transaction, TransactionKind, count_transactions_for_user,
            get_transactions_page_for_user},
        pages::TransactionsState,
    },
};

/// The query parameters accepted by the transactions page.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// The 1-based page number to display.
    pub page: Option<u64>,
}

/// Display a page of the user's transactions, most recent first.
pub async fn get_transactions_page(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let page_size = state.pagination_config.default_page_size;
    let transaction_count = count_transactions_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not count transactions: {error}"))?;
    let page_count = transaction_count.div_ceil(page_size).max(1);

    let curr_page = query
        .page
        .unwrap_or(state.pagination_config.default_page)
        .clamp(1, page_count);
    let offset = (curr_page - 1) * page_size;

    let transactions = get_transactions_page_for_user(user_id, page_size, offset, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h2 class="text-xl font-bold" { "Transactions" }

                    (link(endpoints::NEW_TRANSACTION_VIEW, "New transaction"))
                }

                @if transactions.is_empty() {
                    p
                    {
                        "Nothing here yet. Add your first transaction to get started."
                    }
                } @else {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in &transactions {
                                (transaction_row(transaction))
                            }
                        }
                    }

                    @if page_count > 1 {
                        (pagination_nav(curr_page, page_count, state.pagination_config.max_pages))
                    }
                }
            }
        }
    );

    Ok(base("Transactions", &[], &content).into_response())
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);

    let (amount_style, amount_prefix) = match transaction.kind {
        TransactionKind::Income => ("text-green-600 dark:text-green-400", "+"),
        TransactionKind::Expense => ("text-red-600 dark:text-red-400", "-"),
    };

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            td class=(TABLE_CELL_STYLE) { (transaction.description) }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
            }

            td class=(format!("{TABLE_CELL_STYLE} font-medium {amount_style}"))
            {
                (amount_prefix) (transaction.amount)
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (link(&edit_url, "Edit"))

                    button
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(delete_url)
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        hx-confirm="Delete this transaction?"
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn page_url(page: u64) -> String {
    format!("{}?page={page}", endpoints::TRANSACTIONS_VIEW)
}

fn pagination_nav(curr_page: u64, page_count: u64, max_pages: u64) -> Markup {
    let indicators = create_pagination_indicators(curr_page, page_count, max_pages);

    let link_style = "flex items-center justify-center px-3 h-8 leading-tight \
        text-gray-500 bg-white border border-gray-300 hover:bg-gray-100 \
        hover:text-gray-700 dark:bg-gray-800 dark:border-gray-700 \
        dark:text-gray-400 dark:hover:bg-gray-700 dark:hover:text-white";
    let current_style = "flex items-center justify-center px-3 h-8 \
        text-blue-600 border border-gray-300 bg-blue-50 hover:bg-blue-100 \
        hover:text-blue-700 dark:bg-gray-700 dark:border-gray-700 dark:text-white";

    html!(
        nav aria-label="Transaction pages" class="mt-4 flex justify-center"
        {
            ul class="inline-flex -space-x-px text-sm"
            {
                @for indicator in &indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(link_style) { "Previous" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                a href=(page_url(*page)) aria-current="page" class=(current_style) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(link_style) { "…" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(link_style) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    )
}
