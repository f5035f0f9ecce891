//! The aggregation unit and the structured keys that address pivot cells.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// The number of month columns in every pivot table.
pub const MONTHS_IN_YEAR: usize = 12;

/// A transaction count and the sum of their amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CellData {
    /// How many transactions were accumulated.
    pub count: u64,
    /// The sum of their amounts.
    pub amount: f64,
}

impl CellData {
    /// Accumulate a single transaction amount.
    pub fn record(&mut self, amount: f64) {
        self.count += 1;
        self.amount += amount;
    }

    /// Whether the cell should render as a placeholder.
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.amount == 0.0
    }
}

impl AddAssign for CellData {
    fn add_assign(&mut self, other: Self) {
        self.count += other.count;
        self.amount += other.amount;
    }
}

/// One body cell of the year × month pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    /// The calendar year.
    pub year: i32,
    /// The month, 1 to 12.
    pub month: u8,
}

impl YearMonth {
    /// Create a key, returning `None` if `month` is outside 1..=12.
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

/// A year row of one recipient in the recipient pivot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipientYear {
    /// The trimmed recipient name.
    pub recipient: String,
    /// The calendar year.
    pub year: i32,
}

/// One body cell of the recipient × year × month pivot.
///
/// The key is structured rather than a formatted string so that recipient
/// names containing dashes or digits can never be confused with the year or
/// month parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipientCell {
    /// The row the cell belongs to.
    pub row: RecipientYear,
    /// The month, 1 to 12.
    pub month: u8,
}

impl RecipientCell {
    /// Create a key, returning `None` if `month` is outside 1..=12.
    pub fn new(recipient: impl Into<String>, year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then(|| Self {
            row: RecipientYear {
                recipient: recipient.into(),
                year,
            },
            month,
        })
    }
}

/// The months in column order.
pub fn months() -> impl Iterator<Item = u8> {
    1..=MONTHS_IN_YEAR as u8
}

/// The row header for a year, e.g. "2023년".
pub fn year_label(year: i32) -> String {
    format!("{year}년")
}

/// The column header for a month, e.g. "3월".
pub fn month_label(month: u8) -> String {
    format!("{month}월")
}
