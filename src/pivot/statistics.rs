//! Live statistics over the selected pivot cells.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pivot::cell::CellData;

/// Resolves a structured cell key `C` to its aggregated data.
pub trait CellLookup<C> {
    /// The data for `cell`, or `None` if the key does not resolve in this grid.
    fn cell_data(&self, cell: &C) -> Option<CellData>;
}

/// The statistic shown for the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// The sum of the selected amounts.
    #[default]
    Sum,
    /// The rounded mean of the selected amounts.
    #[serde(rename = "avg", alias = "average")]
    Average,
    /// The largest selected amount.
    Max,
    /// The smallest selected amount.
    Min,
    /// The number of transactions in the selected cells.
    Count,
}

impl Statistic {
    /// Every statistic in menu order.
    pub const ALL: [Statistic; 5] = [
        Statistic::Sum,
        Statistic::Average,
        Statistic::Max,
        Statistic::Min,
        Statistic::Count,
    ];

    /// The form value for this statistic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Sum => "sum",
            Statistic::Average => "avg",
            Statistic::Max => "max",
            Statistic::Min => "min",
            Statistic::Count => "count",
        }
    }

    /// The human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Sum => "Sum",
            Statistic::Average => "Average",
            Statistic::Max => "Max",
            Statistic::Min => "Min",
            Statistic::Count => "Count",
        }
    }
}

/// Reduce the selected cells of `grid` to a single number.
///
/// Keys that no longer resolve are skipped. Amount statistics only consider
/// cells with a positive amount, while [Statistic::Count] sums the counts of
/// every resolved cell. An empty candidate list yields zero.
pub fn compute_statistic<C, G: CellLookup<C>>(
    grid: &G,
    selection: &BTreeSet<C>,
    statistic: Statistic,
) -> f64 {
    let cells: Vec<CellData> = selection
        .iter()
        .filter_map(|cell| grid.cell_data(cell))
        .collect();

    let amounts: Vec<f64> = cells
        .iter()
        .map(|cell| cell.amount)
        .filter(|amount| *amount > 0.0)
        .collect();

    match statistic {
        Statistic::Count => cells.iter().map(|cell| cell.count).sum::<u64>() as f64,
        _ if amounts.is_empty() => 0.0,
        Statistic::Sum => amounts.iter().sum(),
        Statistic::Average => (amounts.iter().sum::<f64>() / amounts.len() as f64).round(),
        Statistic::Max => amounts.iter().copied().fold(f64::MIN, f64::max),
        Statistic::Min => amounts.iter().copied().fold(f64::MAX, f64::min),
    }
}
