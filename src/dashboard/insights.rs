//! Rule-based financial insights for the dashboard.
//!
//! A small fixed table of rules evaluated over the aggregated figures. Each
//! rule fires independently, several can fire at once, and the output order
//! is always the rule order, never data-dependent.

use crate::dashboard::aggregation::{CategoryBucket, MonthBucket, Totals};

/// A savings rate at or above this fraction earns the "Great Savings!" insight.
const GOOD_SAVINGS_RATE: f64 = 0.20;

/// A savings rate below this fraction triggers the "Low Savings Rate" warning.
const LOW_SAVINGS_RATE: f64 = 0.10;

/// A top category above this share of all expenses triggers the
/// "Category Focus" insight.
const CATEGORY_CONCENTRATION_SHARE: f64 = 0.40;

/// How prominently an insight should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Severity {
    Info,
    Warning,
    Positive,
}

/// Which rule produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum InsightKind {
    /// This month's expenses exceed this month's income.
    Overspending,
    /// The overall savings rate cleared the good-savings threshold.
    HighSavingsRate,
    /// The overall savings rate fell below the low-savings threshold.
    LowSavingsRate,
    /// One category dominates total spending.
    CategoryConcentration,
}

/// An advisory message derived from the aggregated figures.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: &'static str,
    pub message: String,
}

/// The fraction of total income that was not spent.
///
/// Zero when there is no income, so the ratio is always well-defined.
pub(super) fn savings_rate(totals: &Totals) -> f64 {
    if !totals.income.is_positive() {
        return 0.0;
    }

    totals.net().count() as f64 / totals.income.count() as f64
}

/// Evaluate the insight rules over the aggregated figures.
///
/// `monthly_series` is the series ending at the current month, as produced by
/// [super::aggregation::monthly_series]; its last bucket is "this month".
/// `category_breakdown` is expected to be sorted largest-first.
pub(super) fn derive_insights(
    totals: &Totals,
    monthly_series: &[MonthBucket],
    category_breakdown: &[CategoryBucket],
) -> Vec<Insight> {
    let mut insights = Vec::new();

    // Rule 1: spending alert for the current month.
    if let Some(current_month) = monthly_series.last() {
        if current_month.expense > current_month.income {
            insights.push(Insight {
                kind: InsightKind::Overspending,
                severity: Severity::Warning,
                title: "Spending Alert",
                message: "Your expenses exceed your income this month".to_owned(),
            });
        }
    }

    // Rule 2: savings rate, as a percentage of all recorded income.
    let rate = savings_rate(totals);
    if rate >= GOOD_SAVINGS_RATE {
        insights.push(Insight {
            kind: InsightKind::HighSavingsRate,
            severity: Severity::Positive,
            title: "Great Savings!",
            message: format!("You're saving {:.1}% of your income", rate * 100.0),
        });
    } else if rate < LOW_SAVINGS_RATE {
        insights.push(Insight {
            kind: InsightKind::LowSavingsRate,
            severity: Severity::Warning,
            title: "Low Savings Rate",
            message: format!(
                "Consider increasing your savings rate (currently {:.1}%)",
                rate * 100.0
            ),
        });
    }

    // Rule 3: one category dominating total spending.
    if let Some(top_category) = category_breakdown.first() {
        if top_category.share > CATEGORY_CONCENTRATION_SHARE {
            insights.push(Insight {
                kind: InsightKind::CategoryConcentration,
                severity: Severity::Info,
                title: "Category Focus",
                message: format!(
                    "{} represents {:.1}% of your spending",
                    top_category.category,
                    top_category.share * 100.0
                ),
            });
        }
    }

    insights
}
