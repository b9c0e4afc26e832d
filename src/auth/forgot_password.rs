//! The forgot password page.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base, link},
};

/// Renders a page describing how the user's password can be reset.
///
/// There is no self-service reset flow; password resets are done by whoever
/// operates the server, directly against the database.
pub async fn get_forgot_password_page() -> Response {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Forgot your password?" }

            p class="max-w-md text-center"
            {
                "Password resets are not self-service. Ask the person running \
                this server to reset your password, then "
                (link(endpoints::LOG_IN_VIEW, "log in"))
                " with the new one."
            }
        }
    );

    base("Forgot Password", &[], &content).into_response()
}
