//! The recipient pivot with per-recipient expand/collapse state.

use std::collections::BTreeSet;

use crate::pivot::{
    aggregation::RecipientPivot,
    cell::{CellData, MONTHS_IN_YEAR, RecipientCell, RecipientYear},
    geometry::{AxisIndex, GridGeometry},
    statistics::CellLookup,
    view::PivotTotals,
};

/// A row of the recipient table that carries a total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientRow {
    /// The roll-up row of a recipient.
    Group(String),
    /// One year of a recipient.
    Year(RecipientYear),
}

/// A [RecipientPivot] plus which recipient groups are expanded.
///
/// Only the year rows of expanded groups take part in drag geometry, so a
/// drag across a collapsed group cannot select its hidden rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientGrid {
    pivot: RecipientPivot,
    expanded: BTreeSet<String>,
    visible_rows: AxisIndex<RecipientYear>,
}

impl RecipientGrid {
    /// Wrap `pivot` with every group expanded.
    pub fn new(pivot: RecipientPivot) -> Self {
        let expanded = pivot
            .groups()
            .iter()
            .map(|group| group.recipient.clone())
            .collect();

        let mut grid = Self {
            pivot,
            expanded,
            visible_rows: AxisIndex::default(),
        };
        grid.rebuild_visible_rows();
        grid
    }

    /// The underlying aggregation.
    pub fn pivot(&self) -> &RecipientPivot {
        &self.pivot
    }

    /// Whether the year rows of `recipient` are shown.
    pub fn is_expanded(&self, recipient: &str) -> bool {
        self.expanded.contains(recipient)
    }

    /// Flip the expanded state of `recipient`.
    ///
    /// Returns `false` if the recipient has no group.
    pub fn toggle(&mut self, recipient: &str) -> bool {
        if self.pivot.group(recipient).is_none() {
            return false;
        }

        if !self.expanded.remove(recipient) {
            self.expanded.insert(recipient.to_owned());
        }

        self.rebuild_visible_rows();
        true
    }

    /// The year rows currently shown, in display order.
    pub fn visible_rows(&self) -> &AxisIndex<RecipientYear> {
        &self.visible_rows
    }

    fn rebuild_visible_rows(&mut self) {
        self.visible_rows = self
            .pivot
            .flat_rows()
            .keys()
            .iter()
            .filter(|row| self.expanded.contains(&row.recipient))
            .cloned()
            .collect();
    }
}

impl GridGeometry for RecipientGrid {
    type Cell = RecipientCell;

    fn position(&self, cell: &RecipientCell) -> Option<(usize, usize)> {
        let row = self.visible_rows.position(&cell.row)?;
        let column = usize::from(cell.month).checked_sub(1)?;
        (column < MONTHS_IN_YEAR).then_some((row, column))
    }

    fn cell_at(&self, row: usize, column: usize) -> Option<RecipientCell> {
        let row = self.visible_rows.get(row)?;
        let month = u8::try_from(column + 1).ok()?;
        RecipientCell::new(row.recipient.clone(), row.year, month)
    }
}

impl CellLookup<RecipientCell> for RecipientGrid {
    fn cell_data(&self, cell: &RecipientCell) -> Option<CellData> {
        self.pivot.cell(cell)
    }
}

impl PivotTotals for RecipientGrid {
    type Row = RecipientRow;

    fn row_total(&self, row: &RecipientRow) -> Option<CellData> {
        match row {
            RecipientRow::Group(recipient) => self.pivot.group(recipient).map(|group| group.total),
            RecipientRow::Year(key) => self.pivot.year_row(key).map(|row| row.total),
        }
    }

    fn row_month(&self, row: &RecipientRow, month: u8) -> Option<CellData> {
        if !(1..=12).contains(&month) {
            return None;
        }

        match row {
            RecipientRow::Group(recipient) => {
                self.pivot.group(recipient).map(|group| group.month(month))
            }
            RecipientRow::Year(key) => self.pivot.year_row(key).map(|row| row.month(month)),
        }
    }

    fn column_total(&self, month: u8) -> CellData {
        self.pivot.column_total(month)
    }

    fn grand_total(&self) -> CellData {
        self.pivot.grand_total()
    }
}
