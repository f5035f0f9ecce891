//! One interactive pivot table: a grid, its selection and the chosen statistic.

use std::time::{Duration, Instant};

use crate::{
    html::format_amount,
    pivot::{
        cell::CellData,
        geometry::{CellBorders, GridGeometry},
        selection::Selection,
        statistics::{CellLookup, Statistic, compute_statistic},
        throttle::Throttle,
    },
};

/// Row, column and grand totals of a pivot grid.
pub trait PivotTotals {
    /// The key of a row with a total.
    type Row;

    /// The total of `row`, or `None` if the row does not exist.
    fn row_total(&self, row: &Self::Row) -> Option<CellData>;

    /// The `month` (1 to 12) of `row`, or `None` if the row does not exist.
    fn row_month(&self, row: &Self::Row, month: u8) -> Option<CellData>;

    /// The total of `month` (1 to 12) over every row.
    fn column_total(&self, month: u8) -> CellData;

    /// The total over every row and month.
    fn grand_total(&self) -> CellData;
}

/// A pointer event on a pivot table.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent<C> {
    /// The button went down on `cell`.
    Down {
        /// The cell under the pointer.
        cell: C,
        /// Whether ctrl or cmd was held.
        additive: bool,
    },
    /// The pointer moved onto `cell`.
    Enter {
        /// The cell under the pointer.
        cell: C,
    },
    /// The button was released.
    Up,
    /// The pointer left the table.
    Leave,
    /// The browser reported a click on `cell`.
    Click {
        /// The cell under the pointer.
        cell: C,
        /// Whether ctrl or cmd was held.
        additive: bool,
    },
}

/// What a copy action from the context menu refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyTarget<C, R> {
    /// A body cell.
    Cell(C),
    /// The total at the end of a row.
    Row(R),
    /// One month of a row, e.g. a collapsed recipient's roll-up.
    RowMonth(R, u8),
    /// The total at the bottom of a month column.
    Column(u8),
    /// The bottom right total.
    Grand,
}

/// A pivot grid together with its own selection state.
///
/// Each table on the dashboard owns one of these, so selections and drags
/// in one table never affect another.
#[derive(Debug, Clone)]
pub struct PivotView<G: GridGeometry> {
    grid: G,
    selection: Selection<G::Cell>,
    statistic: Statistic,
    throttle: Option<Throttle<G::Cell>>,
}

impl<G> PivotView<G>
where
    G: GridGeometry + CellLookup<G::Cell> + PivotTotals,
{
    /// Create a view that recomputes the drag rectangle on every move.
    pub fn new(grid: G) -> Self {
        Self {
            grid,
            selection: Selection::new(),
            statistic: Statistic::default(),
            throttle: None,
        }
    }

    /// Create a view that recomputes the drag rectangle at most once per `interval`.
    pub fn throttled(grid: G, interval: Duration) -> Self {
        Self {
            throttle: Some(Throttle::new(interval)),
            ..Self::new(grid)
        }
    }

    /// The grid being shown.
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Change the grid layout without touching the selection.
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// Show a newly aggregated grid.
    ///
    /// Any selection refers to the old data, so it is cleared.
    pub fn replace_grid(&mut self, grid: G) {
        self.grid = grid;
        self.selection.clear();

        if let Some(throttle) = &mut self.throttle {
            throttle.reset();
        }
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection<G::Cell> {
        &self.selection
    }

    /// Whether `cell` is selected.
    pub fn is_selected(&self, cell: &G::Cell) -> bool {
        self.selection.contains(cell)
    }

    /// The statistic shown for the selection.
    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    /// Choose the statistic shown for the selection.
    pub fn set_statistic(&mut self, statistic: Statistic) {
        self.statistic = statistic;
    }

    /// The chosen statistic over the selected cells.
    pub fn statistic_value(&self) -> f64 {
        compute_statistic(&self.grid, self.selection.cells(), self.statistic)
    }

    /// Feed a pointer event to the selection.
    ///
    /// `now` drives the drag throttle. Releasing the button or leaving the
    /// table first applies any move the throttle held back, so the final
    /// selection always reflects the last cell the pointer entered.
    pub fn handle(&mut self, event: PointerEvent<G::Cell>, now: Instant) {
        match event {
            PointerEvent::Down { cell, additive } => {
                if let Some(throttle) = &mut self.throttle {
                    throttle.reset();
                }
                self.selection.mouse_down(cell, additive);
            }
            PointerEvent::Enter { cell } => {
                if !self.selection.is_dragging() {
                    return;
                }

                let cell = match &mut self.throttle {
                    Some(throttle) => throttle.offer(now, cell),
                    None => Some(cell),
                };

                if let Some(cell) = cell {
                    self.selection.mouse_enter(&self.grid, &cell);
                }
            }
            PointerEvent::Up | PointerEvent::Leave => {
                if let Some(cell) = self.throttle.as_mut().and_then(Throttle::flush) {
                    self.selection.mouse_enter(&self.grid, &cell);
                }
                self.selection.mouse_up();
            }
            PointerEvent::Click { cell, additive } => self.selection.click(cell, additive),
        }
    }

    /// Which sides of `cell` are outlined.
    pub fn borders(&self, cell: &G::Cell) -> CellBorders {
        self.grid.borders(cell, self.selection.cells())
    }

    /// The amount that a copy of `target` would put on the clipboard.
    pub fn copy_amount(&self, target: &CopyTarget<G::Cell, G::Row>) -> Option<f64> {
        let data = match target {
            CopyTarget::Cell(cell) => self.grid.cell_data(cell)?,
            CopyTarget::Row(row) => self.grid.row_total(row)?,
            CopyTarget::RowMonth(row, month) => self.grid.row_month(row, *month)?,
            CopyTarget::Column(month) => self.grid.column_total(*month),
            CopyTarget::Grand => self.grid.grand_total(),
        };

        Some(data.amount)
    }

    /// The clipboard text for `target`, or `None` if the amount is zero or
    /// the target does not exist.
    pub fn copy_text(&self, target: &CopyTarget<G::Cell, G::Row>) -> Option<String> {
        self.copy_amount(target)
            .filter(|amount| amount.round() != 0.0)
            .map(format_amount)
    }
}
