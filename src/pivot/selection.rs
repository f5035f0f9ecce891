//! The drag-selection state machine shared by both pivot tables.
//!
//! A gesture starts with a mouse-down on a cell, optionally extends into a
//! rectangle as the pointer enters other cells, and finishes on mouse-up (or
//! when the pointer leaves the table). A click that follows a real drag is
//! swallowed so that finishing a drag never also toggles the last cell.

use std::collections::BTreeSet;

use crate::pivot::geometry::GridGeometry;

/// What an additive drag does to the cells it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Add the rectangle to the selection the drag started from.
    Add,
    /// Remove the rectangle from the selection the drag started from.
    Remove,
}

/// How a drag combines its rectangle with the existing selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture<C> {
    /// The rectangle replaces the selection.
    Replace,
    /// The rectangle is merged into or cut out of `base`.
    Additive {
        /// Whether the rectangle is added or removed.
        mode: DragMode,
        /// The selection as it was at mouse-down.
        base: BTreeSet<C>,
    },
}

/// Where the pointer is in the current gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState<C> {
    /// No button is held.
    Idle,
    /// The button went down on `start` and has not been released.
    Dragging {
        /// The cell the gesture started on.
        start: C,
        /// How the rectangle is applied.
        gesture: Gesture<C>,
        /// Whether the rectangle has ever grown beyond `start`.
        moved: bool,
    },
}

/// A set of selected cells plus the in-progress drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<C> {
    selected: BTreeSet<C>,
    drag: DragState<C>,
    suppress_click: bool,
}

impl<C> Default for Selection<C> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
            drag: DragState::Idle,
            suppress_click: false,
        }
    }
}

impl<C: Clone + Ord> Selection<C> {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected cells.
    pub fn cells(&self) -> &BTreeSet<C> {
        &self.selected
    }

    /// Whether `cell` is selected.
    pub fn contains(&self, cell: &C) -> bool {
        self.selected.contains(cell)
    }

    /// The number of selected cells.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// The current drag state.
    pub fn drag_state(&self) -> &DragState<C> {
        &self.drag
    }

    /// Start a gesture on `cell`.
    ///
    /// A plain mouse-down selects just `cell`. With the additive modifier the
    /// selection is left alone and the drag will remove cells if `cell` was
    /// already selected, or add them otherwise.
    pub fn mouse_down(&mut self, cell: C, additive: bool) {
        self.suppress_click = false;

        let gesture = if additive {
            let mode = if self.selected.contains(&cell) {
                DragMode::Remove
            } else {
                DragMode::Add
            };

            Gesture::Additive {
                mode,
                base: self.selected.clone(),
            }
        } else {
            self.selected = BTreeSet::from([cell.clone()]);
            Gesture::Replace
        };

        self.drag = DragState::Dragging {
            start: cell,
            gesture,
            moved: false,
        };
    }

    /// Extend the gesture to `cell`.
    ///
    /// Does nothing when no button is held or when either corner is not part
    /// of `geometry`.
    pub fn mouse_enter<G>(&mut self, geometry: &G, cell: &C)
    where
        G: GridGeometry<Cell = C>,
    {
        let DragState::Dragging {
            start,
            gesture,
            moved,
        } = &mut self.drag
        else {
            return;
        };

        let Some(rectangle) = geometry.rectangle(start, cell) else {
            return;
        };

        if rectangle.len() != 1 || !rectangle.contains(&*start) {
            *moved = true;
        }

        if !*moved {
            return;
        }

        self.selected = match gesture {
            Gesture::Replace => rectangle,
            Gesture::Additive {
                mode: DragMode::Add,
                base,
            } => base.union(&rectangle).cloned().collect(),
            Gesture::Additive {
                mode: DragMode::Remove,
                base,
            } => base.difference(&rectangle).cloned().collect(),
        };
    }

    /// Finish the gesture, keeping the selection as it is.
    ///
    /// If the gesture was a drag, the click that the browser fires next is
    /// ignored.
    pub fn mouse_up(&mut self) {
        let drag = std::mem::replace(&mut self.drag, DragState::Idle);

        if let DragState::Dragging { moved, .. } = drag {
            self.suppress_click = moved;
        }
    }

    /// Apply a click on `cell`.
    ///
    /// An additive click toggles `cell`, a plain click selects only `cell`.
    /// A click that ends a drag is ignored.
    pub fn click(&mut self, cell: C, additive: bool) {
        if std::mem::take(&mut self.suppress_click) {
            return;
        }

        if additive {
            if !self.selected.remove(&cell) {
                self.selected.insert(cell);
            }
        } else {
            self.selected = BTreeSet::from([cell]);
        }
    }

    /// Drop every selected cell and any gesture in progress.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.drag = DragState::Idle;
        self.suppress_click = false;
    }
}
