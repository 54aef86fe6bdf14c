//! Sparse per-lane grid of node ranks.
//!
//! Rank assignment over-allocates rows while walking the process graph and
//! compacts them afterwards with [`Grid::simplify`]. The grid tracks its own
//! extent so that placements inside the established bounds can be checked
//! for conflicts while placements on the frontier grow it.

use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use log::trace;

use laneflow_core::identifier::Id;

use crate::error::LayoutError;

/// A discrete (column, row) position inside a lane's grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rank {
    column: usize,
    row: usize,
}

impl Rank {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    pub fn column(self) -> usize {
        self.column
    }

    pub fn row(self) -> usize {
        self.row
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Number of columns and rows a grid spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSize {
    columns: usize,
    rows: usize,
}

impl GridSize {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    pub fn columns(self) -> usize {
        self.columns
    }

    pub fn rows(self) -> usize {
        self.rows
    }
}

/// Element ids mapped to their rank, plus the grid extent.
///
/// No two elements share a cell at any point where a method returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    cells: IndexMap<Id, Rank>,
    size: GridSize,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current extent.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the rank of `id`, if it has been placed.
    pub fn rank(&self, id: Id) -> Option<Rank> {
        self.cells.get(&id).copied()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.cells.contains_key(&id)
    }

    /// Returns the element placed at `rank`, if any.
    pub fn occupant(&self, rank: Rank) -> Option<Id> {
        self.cells
            .iter()
            .find(|(_, placed)| **placed == rank)
            .map(|(id, _)| *id)
    }

    /// Iterates over placed elements in placement order.
    pub fn elements(&self) -> impl Iterator<Item = (Id, Rank)> + '_ {
        self.cells.iter().map(|(id, rank)| (*id, *rank))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Places `id` at `rank`.
    ///
    /// A rank outside the current extent is always accepted and grows the
    /// extent to include it. Inside the extent the cell must be free.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::GridConflict`] when the cell inside the
    /// extent is already taken by another element.
    pub fn add_element(&mut self, id: Id, rank: Rank) -> Result<(), LayoutError> {
        let in_bounds = rank.column < self.size.columns && rank.row < self.size.rows;

        if in_bounds {
            if let Some(occupant) = self.occupant(rank).filter(|occupant| *occupant != id) {
                return Err(LayoutError::GridConflict {
                    element: id,
                    occupant,
                    column: rank.column,
                    row: rank.row,
                });
            }
        } else {
            self.size.columns = self.size.columns.max(rank.column + 1);
            self.size.rows = self.size.rows.max(rank.row + 1);
        }

        trace!(element:% = id, rank:% = rank; "Placing element");
        self.cells.insert(id, rank);
        Ok(())
    }

    /// Inserts an empty row below `row`.
    ///
    /// Every element in a row greater than `row` moves down by one and the
    /// row count grows by one.
    pub fn add_row_after(&mut self, row: usize) {
        for rank in self.cells.values_mut() {
            if rank.row > row {
                rank.row += 1;
            }
        }
        self.size.rows += 1;
    }

    /// Folds row `row + 1` into `row` when no column is occupied in both.
    ///
    /// On success the occupants of `row + 1` move up into `row`, every later
    /// row shifts up by one, and the row count shrinks by one. Returns
    /// `false` and leaves the grid unchanged when any column collides or when
    /// there is no row below `row`.
    pub fn merge_row_below(&mut self, row: usize) -> bool {
        if row + 1 >= self.size.rows {
            return false;
        }

        let upper: HashSet<usize> = self
            .cells
            .values()
            .filter(|rank| rank.row == row)
            .map(|rank| rank.column)
            .collect();
        let collides = self
            .cells
            .values()
            .any(|rank| rank.row == row + 1 && upper.contains(&rank.column));
        if collides {
            return false;
        }

        for rank in self.cells.values_mut() {
            if rank.row > row {
                rank.row -= 1;
            }
        }
        self.size.rows -= 1;
        true
    }

    /// Compacts the grid with a single forward sweep.
    ///
    /// Starting at row 0, merges the row below into the current one until
    /// that fails, then advances. Running it twice gives the same grid.
    pub fn simplify(&mut self) {
        let mut row = 0;
        while row + 1 < self.size.rows {
            if !self.merge_row_below(row) {
                row += 1;
            }
        }
    }
}
