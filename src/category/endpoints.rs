//! The API endpoints for creating, updating and deleting categories.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::{
        CategoryId, CategoryName,
        db::{DEFAULT_CATEGORY_COLOR, create_category, delete_category, update_category},
        pages::CategoriesState,
    },
    endpoints,
};

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl CategoryForm {
    fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR)
    }
}

/// Create a new category from the submitted form.
pub async fn create_category_endpoint(
    State(state): State<CategoriesState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, form.color(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Update an existing category from the submitted form.
pub async fn update_category_endpoint(
    State(state): State<CategoriesState>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, name, form.color(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Delete a category.
///
/// Returns an empty OK response so that HTMX removes the category's table row.
pub async fn delete_category_endpoint(
    State(state): State<CategoriesState>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, &connection) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        routing::{delete, post, put},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        category::{
            CategoryName,
            db::{DEFAULT_CATEGORY_COLOR, create_category, get_all_categories, get_category},
            pages::CategoriesState,
        },
        endpoints::{self, format_endpoint},
    };

    use super::{
        CategoryForm, create_category_endpoint, delete_category_endpoint, update_category_endpoint,
    };

    fn get_test_state() -> CategoriesState {
        let conn = Connection::open_in_memory().unwrap();
        crate::category::create_category_table(&conn).unwrap();

        CategoriesState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn get_test_server(state: CategoriesState) -> TestServer {
        let app = Router::new()
            .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
            .route(endpoints::CATEGORY, put(update_category_endpoint))
            .route(endpoints::CATEGORY, delete(delete_category_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn create_category_succeeds() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::CATEGORIES_API)
            .form(&CategoryForm {
                name: "Groceries".to_owned(),
                color: Some("#10B981".to_owned()),
            })
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::CATEGORIES_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let categories = get_all_categories(&connection).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Groceries");
        assert_eq!(categories[0].color, "#10B981");
    }

    #[tokio::test]
    async fn create_category_rejects_empty_name() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::CATEGORIES_API)
            .form(&CategoryForm {
                name: "   ".to_owned(),
                color: None,
            })
            .await;

        response.assert_status_bad_request();
        response.assert_text_contains("cannot be empty");
    }

    #[tokio::test]
    async fn update_category_succeeds() {
        let state = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                CategoryName::new_unchecked("Old"),
                DEFAULT_CATEGORY_COLOR,
                &connection,
            )
            .unwrap()
        };
        let server = get_test_server(state.clone());

        let response = server
            .put(&format_endpoint(endpoints::CATEGORY, category.id))
            .form(&CategoryForm {
                name: "New".to_owned(),
                color: Some("#EF4444".to_owned()),
            })
            .await;

        response.assert_status_see_other();

        let connection = state.db_connection.lock().unwrap();
        let updated = get_category(category.id, &connection).unwrap();
        assert_eq!(updated.name.as_ref(), "New");
        assert_eq!(updated.color, "#EF4444");
    }

    #[tokio::test]
    async fn delete_category_succeeds() {
        let state = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                CategoryName::new_unchecked("Doomed"),
                DEFAULT_CATEGORY_COLOR,
                &connection,
            )
            .unwrap()
        };
        let server = get_test_server(state.clone());

        server
            .delete(&format_endpoint(endpoints::CATEGORY, category.id))
            .await
            .assert_status_ok();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_category(category.id, &connection),
            Err(crate::Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_missing_category_returns_not_found() {
        let server = get_test_server(get_test_state());

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY, 999))
            .await;

        response.assert_status_not_found();
    }
}
