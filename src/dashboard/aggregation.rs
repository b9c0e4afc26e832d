//! Transaction data aggregation for the dashboard.
//!
//! Pure functions that take an owner's transactions and an explicit reference
//! date and produce the derived figures the dashboard displays: overall
//! totals, a monthly income/expense series, and a spending-by-category
//! breakdown.
//!
//! Everything here is deterministic and side-effect free. The reference date
//! is always passed in rather than read from the process clock, and all dates
//! are treated as UTC calendar dates. Monetary sums use [Cents] throughout,
//! so no amount ever touches binary floating point; the only floats produced
//! are ratios.

use std::collections::HashMap;

use time::{Date, Month};

use crate::{dashboard::query::Transaction, money::Cents, transaction::TransactionKind};

/// How many months of history the dashboard charts cover, including the
/// month containing the reference date.
pub(super) const MONTH_COUNT: usize = 6;

/// Overall income and expense totals for a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Totals {
    pub income: Cents,
    pub expense: Cents,
}

impl Totals {
    /// The net balance: income minus expenses. Negative when spending
    /// exceeds earnings.
    pub fn net(&self) -> Cents {
        self.income - self.expense
    }
}

/// Sum income and expense amounts over `transactions`.
///
/// The input order does not matter. An empty input yields zero totals.
pub(super) fn summarize_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => totals.income += transaction.amount,
            TransactionKind::Expense => totals.expense += transaction.amount,
        }
    }

    totals
}

/// Income and expense totals for a single calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct MonthBucket {
    /// The first day of the month.
    pub month: Date,
    /// The month formatted for chart labels, e.g. "Jan 2024".
    pub label: String,
    pub income: Cents,
    pub expense: Cents,
}

impl MonthBucket {
    pub fn net(&self) -> Cents {
        self.income - self.expense
    }
}

/// Aggregate `transactions` into one bucket per calendar month for the
/// `month_count` months ending at the month containing `today`, oldest first.
///
/// The output always has exactly `month_count` buckets; months with no
/// transactions get zero totals rather than being omitted. A transaction
/// falls in a bucket when its date lies in that calendar month (UTC).
pub(super) fn monthly_series(
    transactions: &[Transaction],
    today: Date,
    month_count: usize,
) -> Vec<MonthBucket> {
    let current_month = month_of(today);

    let mut buckets: Vec<MonthBucket> = (0..month_count)
        .rev()
        .map(|months_ago| {
            let month = months_back(current_month, months_ago);
            MonthBucket {
                month,
                label: month_label(month),
                income: Cents::ZERO,
                expense: Cents::ZERO,
            }
        })
        .collect();

    let index_by_month: HashMap<Date, usize> = buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| (bucket.month, index))
        .collect();

    for transaction in transactions {
        let Some(&index) = index_by_month.get(&month_of(transaction.date)) else {
            continue;
        };

        match transaction.kind {
            TransactionKind::Income => buckets[index].income += transaction.amount,
            TransactionKind::Expense => buckets[index].expense += transaction.amount,
        }
    }

    buckets
}

/// Expense total and share for a single category.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryBucket {
    pub category: String,
    pub total: Cents,
    /// This category's fraction of all expenses, in [0, 1].
    /// Zero when there are no expenses at all.
    pub share: f64,
}

/// Group expense transactions by category label and total them.
///
/// Categories are matched by exact string comparison. Buckets are sorted by
/// total, largest first; categories with equal totals keep the order they
/// first appeared in the input (the sort is stable).
pub(super) fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryBucket> {
    let mut totals: Vec<(String, Cents)> = Vec::new();
    let mut index_by_category: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        match index_by_category.get(transaction.category.as_str()) {
            Some(&index) => totals[index].1 += transaction.amount,
            None => {
                totals.push((transaction.category.clone(), transaction.amount));
                // The key borrows from the transaction, not the Vec, so
                // pushing more entries later does not invalidate it.
                index_by_category.insert(transaction.category.as_str(), totals.len() - 1);
            }
        }
    }

    let total_expense: Cents = totals.iter().map(|(_, total)| total).sum();

    let mut buckets: Vec<CategoryBucket> = totals
        .into_iter()
        .map(|(category, total)| CategoryBucket {
            category,
            total,
            share: if total_expense.is_positive() {
                total.count() as f64 / total_expense.count() as f64
            } else {
                0.0
            },
        })
        .collect();

    buckets.sort_by(|a, b| b.total.cmp(&a.total));

    buckets
}

fn month_of(date: Date) -> Date {
    date.replace_day(1).unwrap()
}

/// The first day of the month `months_ago` months before `month`.
fn months_back(month: Date, months_ago: usize) -> Date {
    let mut year = month.year();
    let mut current = month.month();

    for _ in 0..months_ago {
        if current == Month::January {
            year -= 1;
        }
        current = current.previous();
    }

    Date::from_calendar_date(year, current, 1).unwrap()
}

fn month_label(month: Date) -> String {
    let name = match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{name} {}", month.year())
}
