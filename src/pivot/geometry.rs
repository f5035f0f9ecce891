//! Grid geometry: mapping structured cell keys to row/column indices and back.
//!
//! Drag selection recomputes a rectangle on every pointer move, so index
//! lookups go through precomputed hash maps instead of scanning the rows.

use std::{
    borrow::Borrow,
    collections::{BTreeSet, HashMap},
    hash::Hash,
};

/// An ordered sequence of axis keys with O(1) key-to-index lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisIndex<K: Eq + Hash> {
    keys: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> AxisIndex<K> {
    /// Index `keys` in the given order. If a key repeats, the first occurrence wins.
    pub fn new(keys: Vec<K>) -> Self {
        let mut positions = HashMap::with_capacity(keys.len());

        for (index, key) in keys.iter().enumerate() {
            positions.entry(key.clone()).or_insert(index);
        }

        Self { keys, positions }
    }

    /// The index of `key`, if it is on this axis.
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.get(key).copied()
    }

    /// The key at `index`.
    pub fn get(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    /// The keys in axis order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// The number of keys on the axis.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the axis has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Clone + Eq + Hash> Default for AxisIndex<K> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<K: Clone + Eq + Hash> FromIterator<K> for AxisIndex<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Which sides of a selected cell get an outline.
///
/// A side is outlined when the neighbouring cell on that side is not
/// selected, so a contiguous selection shows a single outline around the
/// whole region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellBorders {
    /// Outline the top edge.
    pub top: bool,
    /// Outline the right edge.
    pub right: bool,
    /// Outline the bottom edge.
    pub bottom: bool,
    /// Outline the left edge.
    pub left: bool,
}

/// A two-dimensional grid of selectable cells.
pub trait GridGeometry {
    /// The structured key of a body cell.
    type Cell: Clone + Ord;

    /// The (row, column) index of `cell`, or `None` if it is not in the grid.
    fn position(&self, cell: &Self::Cell) -> Option<(usize, usize)>;

    /// The cell at (`row`, `column`), or `None` if out of bounds.
    fn cell_at(&self, row: usize, column: usize) -> Option<Self::Cell>;

    /// The cells spanned by `from` and `to`, inclusive on both axes.
    ///
    /// Returns `None` if either corner is not in the grid.
    fn rectangle(&self, from: &Self::Cell, to: &Self::Cell) -> Option<BTreeSet<Self::Cell>> {
        let (from_row, from_column) = self.position(from)?;
        let (to_row, to_column) = self.position(to)?;

        let rows = from_row.min(to_row)..=from_row.max(to_row);
        let columns = from_column.min(to_column)..=from_column.max(to_column);

        let cells = rows
            .flat_map(|row| columns.clone().map(move |column| (row, column)))
            .filter_map(|(row, column)| self.cell_at(row, column))
            .collect();

        Some(cells)
    }

    /// The outline of `cell` given the current selection.
    fn borders(&self, cell: &Self::Cell, selection: &BTreeSet<Self::Cell>) -> CellBorders {
        if !selection.contains(cell) {
            return CellBorders::default();
        }

        let Some((row, column)) = self.position(cell) else {
            return CellBorders::default();
        };

        let is_selected = |row: Option<usize>, column: Option<usize>| match (row, column) {
            (Some(row), Some(column)) => self
                .cell_at(row, column)
                .is_some_and(|neighbour| selection.contains(&neighbour)),
            _ => false,
        };

        CellBorders {
            top: !is_selected(row.checked_sub(1), Some(column)),
            right: !is_selected(Some(row), column.checked_add(1)),
            bottom: !is_selected(row.checked_add(1), Some(column)),
            left: !is_selected(Some(row), column.checked_sub(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{AxisIndex, CellBorders, GridGeometry};

    /// A plain rows × columns grid of (row, column) pairs.
    struct Plain {
        rows: usize,
        columns: usize,
    }

    impl GridGeometry for Plain {
        type Cell = (usize, usize);

        fn position(&self, cell: &Self::Cell) -> Option<(usize, usize)> {
            (cell.0 < self.rows && cell.1 < self.columns).then_some(*cell)
        }

        fn cell_at(&self, row: usize, column: usize) -> Option<Self::Cell> {
            self.position(&(row, column))
        }
    }

    #[test]
    fn axis_index_looks_up_positions() {
        let axis: AxisIndex<String> = ["b", "a", "c"].iter().map(|s| s.to_string()).collect();

        assert_eq!(axis.position("a"), Some(1));
        assert_eq!(axis.position("z"), None);
        assert_eq!(axis.get(2).map(String::as_str), Some("c"));
        assert_eq!(axis.len(), 3);
    }

    #[test]
    fn rectangle_is_inclusive_in_any_drag_direction() {
        let grid = Plain {
            rows: 4,
            columns: 4,
        };

        let forward = grid.rectangle(&(1, 1), &(2, 3)).unwrap();
        let backward = grid.rectangle(&(2, 3), &(1, 1)).unwrap();

        let want: BTreeSet<_> = [(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)].into();
        assert_eq!(forward, want);
        assert_eq!(backward, want);
    }

    #[test]
    fn rectangle_with_unknown_corner_is_none() {
        let grid = Plain {
            rows: 2,
            columns: 2,
        };

        assert_eq!(grid.rectangle(&(0, 0), &(5, 5)), None);
    }

    #[test]
    fn borders_outline_the_selected_region_only() {
        let grid = Plain {
            rows: 3,
            columns: 3,
        };
        let selection: BTreeSet<_> = [(0, 0), (0, 1), (1, 0), (1, 1)].into();

        assert_eq!(
            grid.borders(&(0, 0), &selection),
            CellBorders {
                top: true,
                right: false,
                bottom: false,
                left: true
            }
        );
        assert_eq!(
            grid.borders(&(1, 1), &selection),
            CellBorders {
                top: false,
                right: true,
                bottom: true,
                left: false
            }
        );
        assert_eq!(grid.borders(&(2, 2), &selection), CellBorders::default());
    }

    #[test]
    fn single_selected_cell_is_fully_outlined() {
        let grid = Plain {
            rows: 3,
            columns: 3,
        };
        let selection: BTreeSet<_> = [(1, 1)].into();

        assert_eq!(
            grid.borders(&(1, 1), &selection),
            CellBorders {
                top: true,
                right: true,
                bottom: true,
                left: true
            }
        );
    }
}
