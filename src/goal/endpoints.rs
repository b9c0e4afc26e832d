//! The API endpoints for creating, updating and deleting savings goals.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    endpoints,
    goal::{
        core::{
            GoalId, GoalStatus, NewGoal, create_goal, delete_goal, get_goal, update_goal,
            update_goal_progress,
        },
        pages::GoalsState,
    },
    money::Cents,
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Form data for goal creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalForm {
    pub title: String,
    pub target_amount: String,
    /// Empty when the goal is open-ended.
    #[serde(default)]
    pub target_date: String,
    /// Only present on the edit form.
    #[serde(default)]
    pub status: Option<String>,
}

/// Form data for updating the saved amount of a goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalProgressForm {
    pub current_amount: String,
}

fn parse_target_date(raw: &str) -> Result<Option<Date>, Error> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Ok(None);
    }

    Date::parse(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), raw.to_owned()))
}

fn parse_new_goal(user_id: UserID, form: &GoalForm) -> Result<NewGoal, Error> {
    let target_amount: Cents = form.target_amount.parse()?;
    let target_date = parse_target_date(&form.target_date)?;

    NewGoal {
        user_id,
        title: form.title.clone(),
        target_amount,
        target_date,
    }
    .validate()
}

/// Create a new savings goal from the submitted form.
pub async fn create_goal_endpoint(
    State(state): State<GoalsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let new_goal = match parse_new_goal(user_id, &form) {
        Ok(new_goal) => new_goal,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_goal(new_goal, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Update an existing goal from the submitted form.
pub async fn update_goal_endpoint(
    State(state): State<GoalsState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Form(form): Form<GoalForm>,
) -> Response {
    let parsed = match parse_new_goal(user_id, &form) {
        Ok(parsed) => parsed,
        Err(error) => return error.into_alert_response(),
    };

    let status = match form.status.as_deref() {
        Some(raw) => match raw.parse::<GoalStatus>() {
            Ok(status) => status,
            Err(error) => return error.into_alert_response(),
        },
        None => GoalStatus::Active,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut goal = match get_goal(goal_id, user_id, &connection) {
        Ok(goal) => goal,
        Err(Error::NotFound) => return Error::UpdateMissingGoal.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    goal.title = parsed.title;
    goal.target_amount = parsed.target_amount;
    goal.target_date = parsed.target_date;
    goal.status = status;

    match update_goal(&goal, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Update the saved amount of a goal.
pub async fn update_goal_progress_endpoint(
    State(state): State<GoalsState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Form(form): Form<GoalProgressForm>,
) -> Response {
    let current_amount: Cents = match form.current_amount.parse() {
        Ok(amount) => amount,
        Err(error) => return error.into_alert_response(),
    };

    if current_amount < Cents::ZERO {
        return Error::InvalidAmount(form.current_amount).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_goal_progress(goal_id, user_id, current_amount, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Delete a savings goal.
pub async fn delete_goal_endpoint(
    State(state): State<GoalsState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_goal(goal_id, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
