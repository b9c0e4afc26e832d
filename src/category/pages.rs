//! The category list, create and edit pages.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        Category, CategoryId,
        db::{DEFAULT_CATEGORY_COLOR, get_all_categories, get_category},
    },
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, link,
    },
    navigation::NavBar,
};

/// The state needed for the category pages and endpoints.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display all categories in the pick-list.
pub async fn get_categories_page(State(state): State<CategoriesState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-2xl"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h2 class="text-xl font-bold" { "Categories" }

                    (link(endpoints::NEW_CATEGORY_VIEW, "New category"))
                }

                @if categories.is_empty() {
                    p
                    {
                        "No categories yet. Add some to organize your transactions."
                    }
                } @else {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for category in &categories {
                                (category_row(category))
                            }
                        }
                    }
                }
            }
        }
    );

    Ok(base("Categories", &[], &content).into_response())
}

fn category_row(category: &Category) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
    let delete_url = format_endpoint(endpoints::CATEGORY, category.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) style=(format!("background-color: {}20", category.color))
                {
                    span
                        class="w-2 h-2 rounded-full mr-1.5"
                        style=(format!("background-color: {}", category.color))
                    {}
                    (category.name)
                }
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
                        hx-confirm=(format!("Delete the category {}? Existing transactions keep their label.", category.name))
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

/// The shared form for creating and editing a category.
///
/// `is_edit` controls whether the form issues an HTMX POST (create) or
/// PUT (edit) to `action_url`.
fn category_form(action_url: &str, is_edit: bool, name: &str, color: &str) -> Markup {
    html!(
        form
            hx-post=[(!is_edit).then_some(action_url)]
            hx-put=[is_edit.then_some(action_url)]
            hx-target-error="#alert-container"
            class="space-y-4 w-full max-w-md"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="text"
                    name="name"
                    id="name"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(name);
            }

            div
            {
                label for="color" class=(FORM_LABEL_STYLE) { "Color" }

                input
                    type="color"
                    name="color"
                    id="color"
                    class="h-10 w-20 cursor-pointer rounded border border-gray-300 dark:border-gray-600"
                    value=(color);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                @if is_edit { "Save Category" } @else { "Create Category" }
            }
        }
    )
}

/// Display the page for creating a new category.
pub async fn get_new_category_page() -> Response {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New Category" }

            (category_form(endpoints::CATEGORIES_API, false, "", DEFAULT_CATEGORY_COLOR))
        }
    );

    base("New Category", &[], &content).into_response()
}

/// Display the page for editing an existing category.
pub async fn get_edit_category_page(
    State(state): State<CategoriesState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let action_url = format_endpoint(endpoints::CATEGORY, category.id);

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit Category" }

            (category_form(&action_url, true, category.name.as_ref(), &category.color))
        }
    );

    Ok(base("Edit Category", &[], &content).into_response())
}

#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{body::Body, extract::State, http::Response};
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::db::initialize;

    use super::{CategoriesState, get_categories_page};

    fn get_test_state() -> CategoriesState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CategoriesState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn lists_seeded_categories() {
        let state = get_test_state();

        let response = get_categories_page(State(state)).await.unwrap();
        let html = parse_html(response).await;

        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<_> = html.select(&row_selector).collect();
        assert!(!rows.is_empty(), "expected seeded category rows");

        let text = html.html();
        assert!(text.contains("Food &amp; Dining"));
    }
}
