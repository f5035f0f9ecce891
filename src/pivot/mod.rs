//! The interactive pivot-table engine.
//!
//! This module contains:
//! - The aggregation of transactions into year × month and recipient × year × month grids
//! - Grid geometry for mapping structured cell keys to row and column indices
//! - The drag-selection state machine and its throttle
//! - The statistic reducer over selected cells
//! - The per-table view state and its HTML rendering

mod aggregation;
mod cell;
mod geometry;
mod recipient_grid;
mod selection;
mod statistics;
mod tables;
mod throttle;
mod view;

pub use aggregation::{
    RecipientGroup, RecipientPivot, YearMonthGrid, YearRow, aggregate, aggregate_by_recipient,
};
pub use cell::{CellData, RecipientCell, RecipientYear, YearMonth, month_label, year_label};
pub use geometry::{AxisIndex, CellBorders, GridGeometry};
pub use recipient_grid::{RecipientGrid, RecipientRow};
pub use selection::{DragMode, DragState, Gesture, Selection};
pub use statistics::{CellLookup, Statistic, compute_statistic};
pub use tables::{
    MONTHLY_PIVOT_ID, RECIPIENT_PIVOT_ID, monthly_pivot, pivot_script, pivot_styles,
    recipient_pivot,
};
pub use throttle::{DRAG_THROTTLE_INTERVAL, Throttle};
pub use view::{CopyTarget, PivotTotals, PivotView, PointerEvent};
