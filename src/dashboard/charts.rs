//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for financial data:
//! - **Monthly Trends Chart**: Income, expenses and net per month over the
//!   last six months
//! - **Spending Breakdown Chart**: A pie chart of expenses grouped by category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, JsFunction, Tooltip, Trigger,
    },
    series::{Line, Pie},
};
use maud::PreEscaped;

use crate::{
    dashboard::aggregation::{CategoryBucket, MonthBucket},
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// The monthly income/expense/net line chart.
///
/// Chart values are dollars; this is the presentation edge where cent-exact
/// amounts become floats.
pub(super) fn trends_chart(monthly_series: &[MonthBucket]) -> Chart {
    let labels: Vec<String> = monthly_series
        .iter()
        .map(|bucket| bucket.label.clone())
        .collect();
    let income: Vec<f64> = monthly_series
        .iter()
        .map(|bucket| bucket.income.as_dollars())
        .collect();
    let expenses: Vec<f64> = monthly_series
        .iter()
        .map(|bucket| bucket.expense.as_dollars())
        .collect();
    let net: Vec<f64> = monthly_series
        .iter()
        .map(|bucket| bucket.net().as_dollars())
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Monthly Trends")
                .subtext("Last six months"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("8%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Line::new()
                .name("Income")
                .item_style(ItemStyle::new().color("#10B981"))
                .data(income),
        )
        .series(
            Line::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color("#EF4444"))
                .data(expenses),
        )
        .series(
            Line::new()
                .name("Net")
                .item_style(ItemStyle::new().color("#3B82F6"))
                .data(net),
        )
}

/// The spending-by-category pie chart.
pub(super) fn breakdown_chart(category_breakdown: &[CategoryBucket]) -> Chart {
    let data: Vec<(f64, &str)> = category_breakdown
        .iter()
        .map(|bucket| (bucket.total.as_dollars(), bucket.category.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Spending by Category")
                .subtext("All recorded expenses"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Spending").radius("65%").data(data))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
