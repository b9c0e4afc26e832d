//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and database functions
//! - The shared transaction form and its parsing
//! - View handlers for the transaction pages
//! - API endpoints for creating, updating and deleting transactions

mod core;
mod endpoints;
mod form;
mod pages;
mod transactions_page;

pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, update_transaction_endpoint,
};
pub use pages::{get_edit_transaction_page, get_new_transaction_page};
pub use self::core::{TransactionKind, create_transaction_table};
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub(crate) use self::core::{create_transaction, test_utils};
