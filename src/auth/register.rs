//! The registration page and endpoint for creating a new account.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, endpoints,
    auth::{
        PasswordHash, ValidatedPassword,
        cookie::set_auth_cookie,
        user::{NewUser, create_user},
    },
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input, loading_spinner,
        log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the
/// client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// The field-level error messages for the registration form.
#[derive(Default)]
struct RegistrationErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(email: &str, name: &str, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #name, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))

            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name (optional)"
                }

                input
                    type="text"
                    name="name"
                    id="name"
                    placeholder="Your name"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(name);
            }

            (password_input(PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", RegistrationErrors::default());
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for registering a new account.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Handler for registration requests.
///
/// Validates the email address and password strength, creates the user, logs
/// them in by setting the auth cookie, and redirects to the dashboard.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = match EmailAddress::from_str(form.email.trim()) {
        Ok(email) => email,
        Err(_) => {
            return registration_form(
                &form.email,
                &form.name,
                RegistrationErrors {
                    email: Some("Enter a valid email address."),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                &form.email,
                &form.name,
                RegistrationErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if form.password != form.confirm_password {
        return registration_form(
            &form.email,
            &form.name,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");

            return get_internal_server_error_redirect();
        }
    };

    let name = match form.name.trim() {
        "" => None,
        name => Some(name.to_owned()),
    };

    let new_user = NewUser {
        email,
        name,
        password_hash,
    };

    let created = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        create_user(new_user, &connection)
    };

    match created {
        Ok(user) => match set_auth_cookie(jar, user.id, state.cookie_duration) {
            Ok(jar) => (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                jar,
            )
                .into_response(),
            Err(error) => {
                tracing::error!("An error occurred while setting the auth cookie: {error}");

                get_internal_server_error_redirect()
            }
        },
        Err(Error::DuplicateEmail) => registration_form(
            &form.email,
            &form.name,
            RegistrationErrors {
                email: Some("This email address is already registered, please log in instead."),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_register_page_tests {
    use axum::{
        body::Body,
        http::{Response, StatusCode, header::CONTENT_TYPE},
    };
    use scraper::Html;

    use crate::endpoints;

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html(response).await;
        assert_valid_html(&document);

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::USERS));

        for selector_string in [
            "input[type=email]#email",
            "input[type=text]#name",
            "input[type=password]#password",
            "input[type=password]#confirm-password",
        ] {
            let input_selector = scraper::Selector::parse(selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(
                inputs.len(),
                1,
                "want 1 input matching {selector_string}, got {}",
                inputs.len()
            );
        }

        let log_in_link_selector =
            scraper::Selector::parse(&format!("a[href=\"{}\"]", endpoints::LOG_IN_VIEW)).unwrap();
        assert!(
            form.select(&log_in_link_selector).next().is_some(),
            "want link to {}",
            endpoints::LOG_IN_VIEW
        );
    }

    async fn parse_html(response: Response<Body>) -> scraper::Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        scraper::Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::{TestResponse, TestServer};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::{auth::user::create_user_table, endpoints};

    use super::{RegisterForm, RegistrationState, register_user};

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState {
            cookie_key: Key::from(&Sha512::digest("42")),
            cookie_duration: Duration::minutes(30),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route(endpoints::USERS, post(register_user))
            .with_state(get_test_state());

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            email: "foo@bar.baz".to_owned(),
            name: "Foo".to_owned(),
            password: "iamtestingwhethericancreateanewuser".to_owned(),
            confirm_password: "iamtestingwhethericancreateanewuser".to_owned(),
        }
    }

    async fn assert_form_error(response: TestResponse, expected_fragment: &str) {
        response.assert_status_ok();

        let fragment = scraper::Html::parse_fragment(&response.text());
        let p_selector = scraper::Selector::parse("p.text-red-500").unwrap();
        let paragraphs = fragment.select(&p_selector).collect::<Vec<_>>();
        assert_eq!(paragraphs.len(), 1, "want 1 p, got {}", paragraphs.len());
        let paragraph_text = paragraphs
            .first()
            .unwrap()
            .text()
            .collect::<String>()
            .to_lowercase();
        assert!(
            paragraph_text.contains(expected_fragment),
            "'{paragraph_text}' does not contain the text '{expected_fragment}'"
        );
    }

    #[tokio::test]
    async fn create_user_succeeds() {
        let server = get_test_server();

        let response = server.post(endpoints::USERS).form(&valid_form()).await;

        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn create_user_fails_with_duplicate_email() {
        let server = get_test_server();
        server
            .post(endpoints::USERS)
            .form(&valid_form())
            .await
            .assert_status_see_other();

        let response = server.post(endpoints::USERS).form(&valid_form()).await;

        assert_form_error(response, "already registered").await;
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_email() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                email: "not-an-email".to_owned(),
                ..valid_form()
            })
            .await;

        assert_form_error(response, "valid email").await;
    }

    #[tokio::test]
    async fn create_user_fails_when_password_is_weak() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                password: "foo".to_owned(),
                confirm_password: "foo".to_owned(),
                ..valid_form()
            })
            .await;

        assert_form_error(response, "password is too weak").await;
    }

    #[tokio::test]
    async fn create_user_fails_when_passwords_do_not_match() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                confirm_password: "thisisadifferentpassword".to_owned(),
                ..valid_form()
            })
            .await;

        assert_form_error(response, "passwords do not match").await;
    }
}
