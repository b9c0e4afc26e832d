//! Category management for the finance tracker.
//!
//! Categories are a pick-list of free-text labels with display colors.
//! Transactions store the label itself, so category matching is exact string
//! comparison and editing the pick-list never rewrites transaction history.

mod db;
mod domain;
mod endpoints;
mod pages;

pub use db::{create_category_table, get_all_categories, seed_default_categories};
pub use domain::{Category, CategoryId, CategoryName};
pub use endpoints::{create_category_endpoint, delete_category_endpoint, update_category_endpoint};
pub use pages::{get_categories_page, get_edit_category_page, get_new_category_page};
