//! Card components for the dashboard summary figures and insights.

use maud::{Markup, html};

use crate::{
    dashboard::{
        aggregation::{MonthBucket, Totals},
        insights::{Insight, Severity},
    },
    money::Cents,
};

/// The headline figures shown at the top of the dashboard.
pub(super) struct SummaryFigures {
    pub totals: Totals,
    /// The savings rate as a fraction of income.
    pub savings_rate: f64,
    /// This month's net, from the last bucket of the monthly series.
    pub current_month_net: Cents,
}

impl SummaryFigures {
    pub fn new(totals: Totals, savings_rate: f64, monthly_series: &[MonthBucket]) -> Self {
        Self {
            totals,
            savings_rate,
            current_month_net: monthly_series
                .last()
                .map(MonthBucket::net)
                .unwrap_or(Cents::ZERO),
        }
    }
}

fn amount_style(amount: Cents) -> &'static str {
    if amount < Cents::ZERO {
        "text-3xl font-bold text-red-600 dark:text-red-400"
    } else {
        "text-3xl font-bold text-green-600 dark:text-green-400"
    }
}

fn stat_card(label: &str, value: Markup) -> Markup {
    html!(
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            div class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (label) }
            (value)
        }
    )
}

/// The grid of headline figure cards.
pub(super) fn summary_cards_view(figures: &SummaryFigures) -> Markup {
    let savings_rate_style = if figures.savings_rate >= 0.20 {
        "text-3xl font-bold text-green-600 dark:text-green-400"
    } else if figures.savings_rate >= 0.10 {
        "text-3xl font-bold text-yellow-600 dark:text-yellow-400"
    } else {
        "text-3xl font-bold text-red-600 dark:text-red-400"
    };

    html!(
        section class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 sm:grid-cols-2 xl:grid-cols-5 gap-4"
            {
                (stat_card("Current Balance", html!(
                    div class=(amount_style(figures.totals.net())) { (figures.totals.net()) }
                )))

                (stat_card("Total Income", html!(
                    div class="text-3xl font-bold text-green-600 dark:text-green-400"
                    {
                        (figures.totals.income)
                    }
                )))

                (stat_card("Total Expenses", html!(
                    div class="text-3xl font-bold text-red-600 dark:text-red-400"
                    {
                        (figures.totals.expense)
                    }
                )))

                (stat_card("Savings Rate", html!(
                    div class=(savings_rate_style)
                    {
                        (format!("{:.1}%", figures.savings_rate * 100.0))
                    }
                )))

                (stat_card("Monthly Net", html!(
                    div class=(amount_style(figures.current_month_net))
                    {
                        (figures.current_month_net)
                    }
                )))
            }
        }
    )
}

fn insight_styles(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::Warning => (
            "p-3 rounded-lg border bg-red-50 border-red-200 dark:bg-red-900/20 dark:border-red-800",
            "text-sm font-medium text-red-600 dark:text-red-400",
        ),
        Severity::Positive => (
            "p-3 rounded-lg border bg-green-50 border-green-200 dark:bg-green-900/20 dark:border-green-800",
            "text-sm font-medium text-green-600 dark:text-green-400",
        ),
        Severity::Info => (
            "p-3 rounded-lg border bg-blue-50 border-blue-200 dark:bg-blue-900/20 dark:border-blue-800",
            "text-sm font-medium text-blue-600 dark:text-blue-400",
        ),
    }
}

/// The "Smart Insights" panel.
pub(super) fn insights_view(insights: &[Insight]) -> Markup {
    html!(
        section class="w-full mx-auto mb-4"
        {
            h3 class="text-xl font-semibold mb-4" { "Smart Insights" }

            @if insights.is_empty() {
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Nothing noteworthy this month."
                }
            } @else {
                div class="space-y-2"
                {
                    @for insight in insights {
                        @let (container_style, title_style) = insight_styles(insight.severity);
                        div class=(container_style)
                        {
                            p class=(title_style) { (insight.title) }
                            p class="text-xs text-gray-600 dark:text-gray-400 mt-1"
                            {
                                (insight.message)
                            }
                        }
                    }
                }
            }
        }
    )
}
