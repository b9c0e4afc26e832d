//! User accounts and cookie-session authentication.
//!
//! This module contains everything related to identity:
//! - The `User` model and user table
//! - Password validation and hashing
//! - The private auth cookie and its token payload
//! - Middleware that guards routes and extends sessions
//! - The log in, log out, registration and forgot-password pages

mod cookie;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod token;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use forgot_password::get_forgot_password_page;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{get_register_page, register_user};
pub use user::{User, UserID, create_user_table, get_user_by_id};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
#[cfg(test)]
pub(crate) use user::{NewUser, create_user};
