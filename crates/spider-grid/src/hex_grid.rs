//! The hex grid: cells as nodes, neighbour slots as directed edges.
//!
//! A [`HexGrid`] stores every [`Cell`] in a `Vec` whose position equals the
//! cell's [`CellIndex`], so lookups during propagation are O(1). Neighbour
//! slots that are sentinels or point outside the grid are skipped by every
//! graph query here; callers never see them.

use std::collections::BTreeMap;

use spider_types::{Cell, CellIndex};

use crate::error::GridError;

/// The cell collection shared by the propagator and the evaluator sweep.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HexGrid {
    /// Cells in index order. `cells[i].index == i` always holds.
    cells: Vec<Cell>,
}

impl HexGrid {
    /// Build a grid from cells already in index order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::IndexMismatch`] if any cell's index differs from
    /// its position, or [`GridError::TooManyCells`] if the collection cannot
    /// be addressed by [`CellIndex`].
    pub fn new(cells: Vec<Cell>) -> Result<Self, GridError> {
        if CellIndex::from_position(cells.len()).is_none() {
            return Err(GridError::TooManyCells(cells.len()));
        }
        for (position, cell) in cells.iter().enumerate() {
            if cell.index.position() != position {
                return Err(GridError::IndexMismatch {
                    position,
                    index: cell.index,
                });
            }
        }
        Ok(Self { cells })
    }

    /// Build a grid from cells in any order.
    ///
    /// Cells are sorted by index; the indices must then form the dense range
    /// `0..n`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateIndex`] when two cells share an index,
    /// or the errors of [`HexGrid::new`] when the range has gaps.
    pub fn from_unordered(cells: Vec<Cell>) -> Result<Self, GridError> {
        let mut by_index: BTreeMap<CellIndex, Cell> = BTreeMap::new();
        for cell in cells {
            let index = cell.index;
            if by_index.insert(index, cell).is_some() {
                return Err(GridError::DuplicateIndex(index));
            }
        }
        Self::new(by_index.into_values().collect())
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `index` addresses a cell in this grid.
    pub fn contains(&self, index: CellIndex) -> bool {
        index.position() < self.cells.len()
    }

    /// Get an immutable reference to a cell.
    pub fn get(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index.position())
    }

    /// Get a mutable reference to a cell.
    pub fn get_mut(&mut self, index: CellIndex) -> Option<&mut Cell> {
        self.cells.get_mut(index.position())
    }

    /// All cells in index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over all cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Valid neighbours of a cell: sentinels and out-of-range slots removed.
    ///
    /// Returns an empty list for an unknown cell.
    pub fn neighbors(&self, index: CellIndex) -> Vec<CellIndex> {
        let Some(cell) = self.get(index) else {
            return Vec::new();
        };
        cell.neighbor_indices()
            .filter(|n| self.contains(*n))
            .collect()
    }

    /// Read a numeric attribute of one cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CellNotFound`] or [`GridError::MissingAttribute`].
    pub fn number(&self, index: CellIndex, attribute: &str) -> Result<f64, GridError> {
        let cell = self.get(index).ok_or(GridError::CellNotFound(index))?;
        cell.number(attribute)
            .ok_or_else(|| GridError::MissingAttribute {
                cell: index,
                attribute: attribute.to_owned(),
            })
    }

    /// Read one numeric attribute across every cell, in index order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAttribute`] for the first cell lacking a
    /// numeric value.
    pub fn column(&self, attribute: &str) -> Result<Vec<f64>, GridError> {
        self.cells
            .iter()
            .map(|cell| {
                cell.number(attribute)
                    .ok_or_else(|| GridError::MissingAttribute {
                        cell: cell.index,
                        attribute: attribute.to_owned(),
                    })
            })
            .collect()
    }

    /// Overwrite one numeric attribute across every cell.
    ///
    /// Returns the number of cells whose value changed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::BaselineMismatch`] if `values` does not hold one
    /// value per cell. Nothing is written in that case.
    pub fn set_column(&mut self, attribute: &str, values: &[f64]) -> Result<usize, GridError> {
        if values.len() != self.cells.len() {
            return Err(GridError::BaselineMismatch {
                expected: values.len(),
                found: self.cells.len(),
            });
        }
        let mut changed: usize = 0;
        for (cell, &value) in self.cells.iter_mut().zip(values) {
            let differs = cell
                .number(attribute)
                .is_none_or(|current| current.to_bits() != value.to_bits());
            if differs {
                cell.set_number(attribute, value);
                changed = changed.saturating_add(1);
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use spider_types::NEIGHBOR_COUNT;

    use super::*;

    /// Seven-cell cluster: centre 0 surrounded by 1..=6. Ring cells point
    /// back at the centre and at their two ring neighbours; the rest of
    /// their slots are sentinels (map edge).
    pub(crate) fn seven_cell_cluster(attribute: &str, initial: f64) -> HexGrid {
        let mut cells = Vec::with_capacity(7);
        let centre = [1, 2, 3, 4, 5, 6].map(|i| Some(CellIndex(i)));
        cells.push(Cell::new(CellIndex(0), centre).with_attribute(attribute, initial));
        for i in 1..=6_u32 {
            let prev = if i == 1 { 6 } else { i - 1 };
            let next = if i == 6 { 1 } else { i + 1 };
            let neighbors = [
                Some(CellIndex(0)),
                Some(CellIndex(prev)),
                Some(CellIndex(next)),
                None,
                None,
                None,
            ];
            cells.push(Cell::new(CellIndex(i), neighbors).with_attribute(attribute, initial));
        }
        HexGrid::new(cells).unwrap_or_default()
    }

    /// Hop count from the nearest of `seeds` to every cell, following
    /// neighbour slots. Unreachable cells (and every cell when no seed is in
    /// the grid) get `None`.
    pub(crate) fn hop_distances(
        grid: &HexGrid,
        seeds: impl IntoIterator<Item = CellIndex>,
    ) -> Vec<Option<usize>> {
        let mut hops: Vec<Option<usize>> = vec![None; grid.len()];
        let mut queue = VecDeque::new();

        for seed in seeds {
            if let Some(slot) = hops.get_mut(seed.position())
                && slot.is_none()
            {
                *slot = Some(0);
                queue.push_back((seed, 0_usize));
            }
        }

        while let Some((current, depth)) = queue.pop_front() {
            let next_depth = depth.saturating_add(1);
            for neighbor in grid.neighbors(current) {
                if let Some(slot) = hops.get_mut(neighbor.position())
                    && slot.is_none()
                {
                    *slot = Some(next_depth);
                    queue.push_back((neighbor, next_depth));
                }
            }
        }

        hops
    }

    /// A straight chain `0 - 1 - ... - (n-1)` with symmetric links.
    pub(crate) fn chain(n: u32, attribute: &str, initial: f64) -> HexGrid {
        let cells = (0..n)
            .map(|i| {
                let mut neighbors = [None; NEIGHBOR_COUNT];
                if i > 0 {
                    neighbors[0] = Some(CellIndex(i - 1));
                }
                if i + 1 < n {
                    neighbors[1] = Some(CellIndex(i + 1));
                }
                Cell::new(CellIndex(i), neighbors).with_attribute(attribute, initial)
            })
            .collect();
        HexGrid::new(cells).unwrap_or_default()
    }

    #[test]
    fn new_rejects_index_mismatch() {
        let cells = vec![Cell::new(CellIndex(1), [None; NEIGHBOR_COUNT])];
        assert!(matches!(
            HexGrid::new(cells),
            Err(GridError::IndexMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn from_unordered_sorts_and_rejects_duplicates() {
        let cells = vec![
            Cell::new(CellIndex(1), [None; NEIGHBOR_COUNT]),
            Cell::new(CellIndex(0), [None; NEIGHBOR_COUNT]),
        ];
        let grid = HexGrid::from_unordered(cells);
        assert!(grid.is_ok());
        assert_eq!(grid.map(|g| g.len()).unwrap_or_default(), 2);

        let dup = vec![
            Cell::new(CellIndex(0), [None; NEIGHBOR_COUNT]),
            Cell::new(CellIndex(0), [None; NEIGHBOR_COUNT]),
        ];
        assert!(matches!(
            HexGrid::from_unordered(dup),
            Err(GridError::DuplicateIndex(CellIndex(0)))
        ));
    }

    #[test]
    fn from_unordered_rejects_gaps() {
        let cells = vec![
            Cell::new(CellIndex(0), [None; NEIGHBOR_COUNT]),
            Cell::new(CellIndex(2), [None; NEIGHBOR_COUNT]),
        ];
        assert!(HexGrid::from_unordered(cells).is_err());
    }

    #[test]
    fn neighbors_skip_out_of_range_slots() {
        let cells = vec![
            Cell::new(
                CellIndex(0),
                [Some(CellIndex(1)), Some(CellIndex(99)), None, None, None, None],
            ),
            Cell::new(CellIndex(1), [None; NEIGHBOR_COUNT]),
        ];
        let grid = HexGrid::new(cells).unwrap_or_default();
        assert_eq!(grid.neighbors(CellIndex(0)), vec![CellIndex(1)]);
        assert!(grid.neighbors(CellIndex(42)).is_empty());
    }

    #[test]
    fn neighbors_are_directed() {
        let cells = vec![
            Cell::new(CellIndex(0), [Some(CellIndex(1)), None, None, None, None, None]),
            Cell::new(CellIndex(1), [None; NEIGHBOR_COUNT]),
        ];
        let grid = HexGrid::new(cells).unwrap_or_default();
        assert_eq!(grid.neighbors(CellIndex(0)), vec![CellIndex(1)]);
        assert!(grid.neighbors(CellIndex(1)).is_empty());
    }

    #[test]
    fn column_reports_missing_attribute() {
        let grid = seven_cell_cluster("grid_dist", 50.0);
        assert_eq!(grid.column("grid_dist").map(|c| c.len()).unwrap_or_default(), 7);
        assert!(matches!(
            grid.column("road_dist"),
            Err(GridError::MissingAttribute { cell: CellIndex(0), .. })
        ));
    }

    #[test]
    fn set_column_counts_changes_and_checks_length() {
        let mut grid = chain(3, "d", 5.0);
        let changed = grid.set_column("d", &[5.0, 1.0, 2.0]);
        assert_eq!(changed.ok(), Some(2));
        assert!(grid.set_column("d", &[1.0]).is_err());
    }

    #[test]
    fn hop_distances_on_chain() {
        let grid = chain(4, "d", 0.0);
        assert_eq!(
            hop_distances(&grid, [CellIndex(1)]),
            vec![Some(1), Some(0), Some(1), Some(2)]
        );
    }

    #[test]
    fn hop_distances_ignore_unknown_seeds() {
        let grid = chain(2, "d", 0.0);
        assert_eq!(hop_distances(&grid, [CellIndex(7)]), vec![None, None]);
    }
}
