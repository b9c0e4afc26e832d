//! Savings goals for the finance tracker.
//!
//! This module contains everything related to goals:
//! - The `Goal` model, progress calculations and database functions
//! - View handlers for the goals pages
//! - API endpoints for creating, updating and deleting goals

mod core;
mod endpoints;
mod pages;

pub use self::core::create_goal_table;
pub use endpoints::{
    create_goal_endpoint, delete_goal_endpoint, update_goal_endpoint,
    update_goal_progress_endpoint,
};
pub use pages::{get_edit_goal_page, get_goals_page, get_new_goal_page};
