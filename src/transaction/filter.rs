//! The filter pipeline that narrows the uploaded transactions before they are aggregated.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use time::{Date, UtcOffset, macros::format_description};

use crate::transaction::Transaction;

/// The criteria for narrowing down the transaction list.
///
/// An empty criterion (blank search, empty set, missing bound) accepts every
/// transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive text matched against the record's string fields.
    pub search: String,
    /// The statuses to keep.
    pub statuses: BTreeSet<String>,
    /// The recipients to keep.
    pub recipients: BTreeSet<String>,
    /// Inclusive lower bound on the effective amount.
    pub min_amount: Option<f64>,
    /// Inclusive upper bound on the effective amount.
    pub max_amount: Option<f64>,
    /// Inclusive lower bound on the local date of `finished`.
    pub date_from: Option<Date>,
    /// Inclusive upper bound on the local date of `finished`.
    pub date_to: Option<Date>,
}

impl TransactionFilter {
    /// Whether every criterion is inactive.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Return the transactions that pass the filter, in their original order.
    pub fn apply<'a>(
        &self,
        transactions: &'a [Transaction],
        offset: UtcOffset,
    ) -> Vec<&'a Transaction> {
        let needle = self.search.trim().to_lowercase();

        transactions
            .iter()
            .filter(|transaction| self.matches(transaction, &needle, offset))
            .collect()
    }

    fn matches(&self, transaction: &Transaction, needle: &str, offset: UtcOffset) -> bool {
        if !needle.is_empty() && !matches_search(transaction, needle) {
            return false;
        }

        if !self.statuses.is_empty() && !self.statuses.contains(transaction.status.trim()) {
            return false;
        }

        if !self.recipients.is_empty()
            && !transaction
                .recipient()
                .is_some_and(|recipient| self.recipients.contains(recipient))
        {
            return false;
        }

        let amount = transaction.amount();
        if self.min_amount.is_some_and(|min| amount < min)
            || self.max_amount.is_some_and(|max| amount > max)
        {
            return false;
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = transaction.finished_date(offset) else {
                return false;
            };

            if self.date_from.is_some_and(|from| date < from)
                || self.date_to.is_some_and(|to| date > to)
            {
                return false;
            }
        }

        true
    }
}

fn matches_search(transaction: &Transaction, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(&transaction.reci_full_name)
        || contains(&transaction.status)
        || contains(&transaction.send)
        || transaction.extra.values().any(|value| match value {
            Value::String(text) => contains(text),
            Value::Number(number) => contains(&number.to_string()),
            _ => false,
        })
}

/// Form data for the dashboard's filter controls.
///
/// Values arrive as raw strings from HTML inputs, so blank or unparseable
/// values are treated as "no constraint".
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    /// Free text search.
    #[serde(default)]
    pub search: String,
    /// Checked statuses.
    #[serde(default)]
    pub statuses: Vec<String>,
    /// Checked recipients.
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Minimum amount.
    #[serde(default)]
    pub min_amount: String,
    /// Maximum amount.
    #[serde(default)]
    pub max_amount: String,
    /// Start date as YYYY-MM-DD.
    #[serde(default)]
    pub date_from: String,
    /// End date as YYYY-MM-DD.
    #[serde(default)]
    pub date_to: String,
}

impl From<FilterForm> for TransactionFilter {
    fn from(form: FilterForm) -> Self {
        let parse_amount = |text: &str| text.trim().parse::<f64>().ok().filter(|n| n.is_finite());
        let parse_date = |text: &str| {
            Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).ok()
        };
        let to_set = |values: Vec<String>| -> BTreeSet<String> {
            values
                .into_iter()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .collect()
        };

        Self {
            search: form.search.trim().to_owned(),
            statuses: to_set(form.statuses),
            recipients: to_set(form.recipients),
            min_amount: parse_amount(form.min_amount.as_str()),
            max_amount: parse_amount(form.max_amount.as_str()),
            date_from: parse_date(form.date_from.as_str()),
            date_to: parse_date(form.date_to.as_str()),
        }
    }
}
