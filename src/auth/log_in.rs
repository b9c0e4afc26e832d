//! The log in page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, endpoints,
    auth::{cookie::set_auth_cookie, redirect::normalize_redirect_url, user::get_user_by_email},
    html::{base, email_input, log_in_register, loading_spinner, password_input},
    internal_server_error::get_internal_server_error_redirect,
};

/// The state needed for logging in a user.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The query parameters accepted by the log in page.
#[derive(Deserialize)]
pub struct LogInQuery {
    /// Where to send the user after a successful log in.
    pub redirect_url: Option<String>,
}

/// The form data for logging in.
#[derive(Serialize, Deserialize)]
pub struct LogInForm {
    pub email: String,
    pub password: String,
    /// Carried through the form so the post-log-in redirect survives the round trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

fn log_in_form(email: &str, redirect_url: Option<&str>, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, None))
            (password_input(1, error_message))

            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log In"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account yet? "

                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                a
                    href=(endpoints::FORGOT_PASSWORD_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Forgot your password?"
                }
            }
        }
    }
}

/// Display the log in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    let form = log_in_form("", redirect_url.as_deref(), None);
    let content = log_in_register("Sign in to your account", &form);

    base("Log In", &[], &content).into_response()
}

/// Handler for log in requests.
///
/// Checks the submitted email and password against the user table and sets
/// the auth cookie on success. Invalid credentials re-render the form with a
/// generic error message that does not reveal whether the email is registered.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        get_user_by_email(form.email.trim(), &connection)
    };

    let invalid_credentials = || {
        log_in_form(
            &form.email,
            form.redirect_url.as_deref(),
            Some("Invalid email or password."),
        )
        .into_response()
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => {
            // Hash the submitted password anyway so that response times do not
            // reveal whether the email is registered.
            let _ = bcrypt::hash(&form.password, 4);
            return invalid_credentials();
        }
        Err(error) => {
            tracing::error!("could not look up user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    if user.password_hash.verify(&form.password).is_err() {
        return invalid_credentials();
    }
    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let redirect_url = form
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url)
        .unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    (StatusCode::SEE_OTHER, HxRedirect(redirect_url), jar).into_response()
}
