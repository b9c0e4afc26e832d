//! The goals list, create and edit pages.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    goal::core::{Goal, GoalId, GoalStatus, get_goal, get_goals_for_user},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, dollar_input_styles, link,
    },
    navigation::NavBar,
};

/// The state needed for the goal pages and endpoints.
#[derive(Debug, Clone)]
pub struct GoalsState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the user's savings goals.
pub async fn get_goals_page(
    State(state): State<GoalsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goals_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get goals: {error}"))?;

    // All dates in the app are UTC calendar dates.
    let today = OffsetDateTime::now_utc().date();

    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h2 class="text-xl font-bold" { "Savings Goals" }

                    (link(endpoints::NEW_GOAL_VIEW, "New goal"))
                }

                @if goals.is_empty() {
                    p
                    {
                        "No goals yet. Set one to start tracking your savings."
                    }
                } @else {
                    div class="grid grid-cols-1 md:grid-cols-2 gap-4"
                    {
                        @for goal in &goals {
                            (goal_card(goal, today))
                        }
                    }
                }
            }
        }
    );

    Ok(base("Goals", &[dollar_input_styles()], &content).into_response())
}

fn status_badge(status: GoalStatus) -> Markup {
    let style = match status {
        GoalStatus::Active => {
            "bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300"
        }
        GoalStatus::Completed => {
            "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300"
        }
        GoalStatus::Cancelled => {
            "bg-gray-100 text-gray-800 dark:bg-gray-700 dark:text-gray-300"
        }
    };

    html!(
        span class=(format!(
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full {style}"
        ))
        {
            (status)
        }
    )
}

fn goal_card(goal: &Goal, today: Date) -> Markup {
    let progress = goal.progress_percent();
    let edit_url = format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id);
    let delete_url = format_endpoint(endpoints::GOAL, goal.id);
    let progress_url = format_endpoint(endpoints::GOAL_PROGRESS, goal.id);

    html!(
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md
                flex flex-col justify-between"
        {
            div
            {
                div class="flex justify-between items-start mb-2"
                {
                    h4 class="text-lg font-semibold truncate" title=(goal.title) { (goal.title) }
                    (status_badge(goal.status))
                }

                div class="text-2xl font-bold mb-1"
                {
                    (goal.current_amount)
                    span class="text-sm font-normal text-gray-600 dark:text-gray-400"
                    {
                        " of " (goal.target_amount)
                    }
                }

                div
                    class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5 mb-2"
                    role="progressbar"
                    aria-valuenow=(format!("{progress:.0}"))
                    aria-valuemin="0"
                    aria-valuemax="100"
                {
                    @if progress > 0.0 {
                        div
                            class="bg-blue-600 dark:bg-blue-500 h-2.5 rounded-full transition-all"
                            style=(format!("width: {progress:.1}%"))
                        {}
                    }
                }

                @match goal.days_remaining(today) {
                    Some(days) if days >= 0 => {
                        p class="text-sm text-gray-600 dark:text-gray-400" { (days) " days left" }
                    }
                    Some(_) => {
                        p class="text-sm text-red-600 dark:text-red-400" { "Target date passed" }
                    }
                    None => {}
                }
            }

            div class="mt-3 space-y-2"
            {
                form
                    hx-post=(progress_url)
                    hx-target-error="#alert-container"
                    class="flex gap-2 items-center"
                {
                    div class="input-wrapper flex-1"
                    {
                        input
                            type="number"
                            name="current_amount"
                            step="0.01"
                            min="0"
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=(goal.current_amount.to_decimal_string())
                            aria-label=(format!("Amount saved towards {}", goal.title));
                    }

                    button
                        type="submit"
                        class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                            hover:dark:bg-blue-700 text-white rounded text-sm"
                    {
                        "Update"
                    }
                }

                div class="flex gap-4"
                {
                    (link(&edit_url, "Edit"))

                    button
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(delete_url)
                        hx-target-error="#alert-container"
                        hx-confirm=(format!("Delete the goal {}?", goal.title))
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

/// The shared form for creating and editing a goal.
fn goal_form(action_url: &str, goal: Option<&Goal>) -> Markup {
    let title = goal.map(|goal| goal.title.as_str()).unwrap_or("");
    let target_amount = goal
        .map(|goal| goal.target_amount.to_decimal_string())
        .unwrap_or_default();
    let target_date = goal
        .and_then(|goal| goal.target_date)
        .map(|date| date.to_string())
        .unwrap_or_default();
    let is_edit = goal.is_some();

    html!(
        form
            hx-post=[(!is_edit).then_some(action_url)]
            hx-put=[is_edit.then_some(action_url)]
            hx-target-error="#alert-container"
            class="space-y-4 w-full max-w-md"
        {
            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "Title" }

                input
                    type="text"
                    name="title"
                    id="title"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    placeholder="Emergency fund"
                    value=(title);
            }

            div
            {
                label for="target-amount" class=(FORM_LABEL_STYLE) { "Target amount" }

                div class="input-wrapper"
                {
                    input
                        type="number"
                        name="target_amount"
                        id="target-amount"
                        step="0.01"
                        min="0.01"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                        value=(target_amount);
                }
            }

            div
            {
                label for="target-date" class=(FORM_LABEL_STYLE) { "Target date (optional)" }

                input
                    type="date"
                    name="target_date"
                    id="target-date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(target_date);
            }

            @if let Some(goal) = goal {
                div
                {
                    label for="status" class=(FORM_LABEL_STYLE) { "Status" }

                    select name="status" id="status" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for status in [GoalStatus::Active, GoalStatus::Completed, GoalStatus::Cancelled] {
                            option value=(status) selected[goal.status == status] { (status) }
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                @if is_edit { "Save Goal" } @else { "Create Goal" }
            }
        }
    )
}

/// Display the page for creating a new savings goal.
pub async fn get_new_goal_page() -> Response {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New Goal" }

            (goal_form(endpoints::GOALS_API, None))
        }
    );

    base("New Goal", &[dollar_input_styles()], &content).into_response()
}

/// Display the page for editing an existing savings goal.
pub async fn get_edit_goal_page(
    State(state): State<GoalsState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = get_goal(goal_id, user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();
    let action_url = format_endpoint(endpoints::GOAL, goal.id);

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit Goal" }

            (goal_form(&action_url, Some(&goal)))
        }
    );

    Ok(base("Edit Goal", &[dollar_input_styles()], &content).into_response())
}

#[cfg(test)]
mod goals_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, body::Body, extract::State, http::Response};
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        goal::core::{NewGoal, create_goal},
        money::Cents,
        transaction::test_utils::get_test_connection_and_user,
    };

    use super::{GoalsState, get_goals_page};

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn shows_empty_state_without_goals() {
        let (conn, user_id) = get_test_connection_and_user();
        let state = GoalsState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_goals_page(State(state), Extension(user_id)).await.unwrap();
        let html = parse_html(response).await;

        assert!(html.html().contains("No goals yet"));
    }

    #[tokio::test]
    async fn shows_goal_cards_with_progress() {
        let (conn, user_id) = get_test_connection_and_user();
        create_goal(
            NewGoal {
                user_id,
                title: "Emergency fund".to_owned(),
                target_amount: Cents::new(100_000),
                target_date: Some(date!(2099 - 01 - 01)),
            },
            &conn,
        )
        .unwrap();
        let state = GoalsState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_goals_page(State(state), Extension(user_id)).await.unwrap();
        let html = parse_html(response).await;

        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
        assert!(html.html().contains("Emergency fund"));

        let progress_selector = Selector::parse("div[role='progressbar']").unwrap();
        assert!(html.select(&progress_selector).next().is_some());
    }
}
