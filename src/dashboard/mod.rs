//! Dashboard module
//!
//! Provides an overview page showing financial summaries, charts and
//! rule-based insights. The aggregation itself is pure and lives in
//! [aggregation] and [insights]; the handler wires it to the database and
//! the maud views.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod insights;
mod query;

pub use handlers::get_dashboard_page;
