//! The shared transaction form: markup, form data and parsing.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    category::Category,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    money::Cents,
    transaction::core::{NewTransaction, Transaction, TransactionKind},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The form data for creating or editing a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionForm {
    pub amount: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub kind: String,
    pub date: String,
}

/// Parse and validate the submitted form into a [NewTransaction].
///
/// `today` is the UTC calendar date the request arrived on; dates after it
/// are rejected.
///
/// # Errors
///
/// Returns an [Error::InvalidAmount], [Error::InvalidTransactionKind],
/// [Error::InvalidDateFormat] or [Error::FutureDate] describing the first
/// invalid field.
pub fn parse_transaction_form(
    user_id: UserID,
    form: &TransactionForm,
    today: Date,
) -> Result<NewTransaction, Error> {
    let amount: Cents = form.amount.parse()?;
    let kind: TransactionKind = form.kind.parse()?;
    let date = Date::parse(form.date.trim(), DATE_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), form.date.clone()))?;

    NewTransaction {
        user_id,
        amount,
        description: form.description.trim().to_owned(),
        category: form.category.trim().to_owned(),
        kind,
        date,
    }
    .validate(today)
}

/// The values used to pre-fill the transaction form.
pub struct TransactionFormValues {
    pub amount: String,
    pub description: String,
    pub category: String,
    pub kind: TransactionKind,
    pub date: Date,
}

impl TransactionFormValues {
    /// An empty form dated `today`, for creating a new transaction.
    pub fn empty(today: Date) -> Self {
        Self {
            amount: String::new(),
            description: String::new(),
            category: String::new(),
            kind: TransactionKind::Expense,
            date: today,
        }
    }
}

impl From<&Transaction> for TransactionFormValues {
    fn from(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount.to_decimal_string(),
            description: transaction.description.clone(),
            category: transaction.category.clone(),
            kind: transaction.kind,
            date: transaction.date,
        }
    }
}

fn kind_radio(kind: TransactionKind, label: &str, checked: bool) -> Markup {
    let id = format!("kind-{kind}");

    html!(
        label class="flex items-center gap-2"
        {
            input
                type="radio"
                name="kind"
                id=(id)
                value=(kind)
                class=(FORM_RADIO_INPUT_STYLE)
                checked[checked];

            span class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    )
}

/// The form for creating and editing a transaction.
///
/// `categories` fills the datalist of suggestions; free-text labels are still
/// allowed, matching the exact-string category model.
pub fn transaction_form(
    action_url: &str,
    is_edit: bool,
    values: &TransactionFormValues,
    categories: &[Category],
) -> Markup {
    html!(
        form
            hx-post=[(!is_edit).then_some(action_url)]
            hx-put=[is_edit.then_some(action_url)]
            hx-target-error="#alert-container"
            class="space-y-4 w-full max-w-md"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper"
                {
                    input
                        type="number"
                        name="amount"
                        id="amount"
                        step="0.01"
                        min="0.01"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                        autofocus
                        value=(values.amount);
                }
            }

            div
            {
                span class=(FORM_LABEL_STYLE) { "Kind" }

                div class="flex gap-4"
                {
                    (kind_radio(
                        TransactionKind::Expense,
                        "Expense",
                        values.kind == TransactionKind::Expense,
                    ))
                    (kind_radio(
                        TransactionKind::Income,
                        "Income",
                        values.kind == TransactionKind::Income,
                    ))
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    placeholder="Lunch at the corner cafe"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(values.description);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    type="text"
                    name="category"
                    id="category"
                    list="category-options"
                    placeholder="Food & Dining"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(values.category);

                datalist id="category-options"
                {
                    @for category in categories {
                        option value=(category.name) {}
                    }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(values.date);
            }

            button
                type="submit"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                @if is_edit { "Save Transaction" } @else { "Add Transaction" }
            }
        }
    )
}
