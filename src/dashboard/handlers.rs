//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{
        aggregation::{MONTH_COUNT, category_breakdown, monthly_series, summarize_totals},
        cards::{SummaryFigures, insights_view, summary_cards_view},
        charts::{DashboardChart, breakdown_chart, charts_script, trends_chart},
        insights::{derive_insights, savings_rate},
        query::get_transactions_for_user,
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    figures: SummaryFigures,
    charts: [DashboardChart; 2],
    insights: Markup,
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(user_id, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, &data).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar).into_response()),
    }
}

/// Fetches and aggregates all data needed for the dashboard display.
///
/// The reference date for the monthly series is the current UTC calendar
/// date, computed once here so the aggregation itself stays deterministic.
///
/// # Returns
/// All dashboard data ready for rendering, or `None` if the user has no
/// transactions.
///
/// # Errors
/// Returns an error if the database query fails.
fn build_dashboard_data(
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let transactions = get_transactions_for_user(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    if transactions.is_empty() {
        return Ok(None);
    }

    let today = OffsetDateTime::now_utc().date();

    let totals = summarize_totals(&transactions);
    let series = monthly_series(&transactions, today, MONTH_COUNT);
    let breakdown = category_breakdown(&transactions);
    let insights = derive_insights(&totals, &series, &breakdown);

    let figures = SummaryFigures::new(totals, savings_rate(&totals), &series);

    let charts = [
        DashboardChart {
            id: "trends-chart",
            options: trends_chart(&series).to_string(),
        },
        DashboardChart {
            id: "breakdown-chart",
            options: breakdown_chart(&breakdown).to_string(),
        },
    ];

    Ok(Some(DashboardData {
        figures,
        charts,
        insights: insights_view(&insights),
    }))
}

/// Renders the dashboard page when no transaction data exists.
///
/// Displays a helpful message with a link to add the first transaction.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts and insights will show up here once you add some
                transactions. Start by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with summary cards, charts and insights.
fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&data.figures))

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in &data.charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }
                }
            }

            (data.insights)
        }
    );

    let scripts = [
        HeadElement::ScriptLink(
            "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js".to_owned(),
        ),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}
