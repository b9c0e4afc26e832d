//! The 404 not found page.

use axum::{
    http::StatusCode,
    response::Response,
};

use crate::html::{error_view, render};

/// The fallback handler for requests that match no route.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    render(
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Sorry, we can't find that page.",
            "Check the URL for typos, or head back to the dashboard.",
        ),
    )
}
