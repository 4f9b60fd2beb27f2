//! Adjacency propagation: breadth-first relaxation of a distance attribute.
//!
//! Drawing a grid line or road onto the map identifies a set of seed cells.
//! [`propagate`] writes the start distance onto those seeds and then walks
//! outward ring by ring, adding one step per ring, lowering the attribute on
//! every cell where the new distance is strictly smaller than the current
//! value.
//!
//! # Termination
//!
//! Distances grow monotonically from one frontier to the next, so a cell
//! accepted at distance `d` can never be improved again within the same
//! call. Cells relaxed earlier in the call are therefore excluded from later
//! frontiers, and each cell is relaxed at most once. The loop runs at most
//! `N` steps for a grid of `N` cells.

use std::collections::{BTreeSet, HashSet};

use spider_types::{CellIndex, PropagationRequest};
use tracing::debug;

use crate::error::GridError;
use crate::hex_grid::HexGrid;

/// Outcome of one propagation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropagationReport {
    /// Number of cells whose attribute was lowered.
    pub relaxed: usize,
    /// Number of frontier steps taken.
    pub steps: usize,
    /// Largest distance written, or `None` if nothing was relaxed.
    pub max_distance: Option<f64>,
}

/// Check a request against a grid without mutating anything.
///
/// # Errors
///
/// - [`GridError::InvalidStepSize`] unless the step is finite and `> 0`.
/// - [`GridError::InvalidStartDistance`] unless the start is finite and `>= 0`.
/// - [`GridError::CellNotFound`] for a seed outside the grid.
/// - [`GridError::MissingAttribute`] for the first cell without a numeric
///   value for the attribute.
pub fn validate(grid: &HexGrid, request: &PropagationRequest) -> Result<(), GridError> {
    if !request.step_size.is_finite() || request.step_size <= 0.0 {
        return Err(GridError::InvalidStepSize(request.step_size));
    }
    if !request.start_distance.is_finite() || request.start_distance < 0.0 {
        return Err(GridError::InvalidStartDistance(request.start_distance));
    }
    if let Some(&missing) = request.seeds.iter().find(|s| !grid.contains(**s)) {
        return Err(GridError::CellNotFound(missing));
    }
    if let Some(cell) = grid
        .iter()
        .find(|cell| cell.number(&request.attribute).is_none())
    {
        return Err(GridError::MissingAttribute {
            cell: cell.index,
            attribute: request.attribute.clone(),
        });
    }
    Ok(())
}

/// Relax `request.attribute` outward from `request.seeds`, in place.
///
/// The request is validated first; on error the grid is untouched.
///
/// # Errors
///
/// See [`validate`].
pub fn propagate(
    grid: &mut HexGrid,
    request: &PropagationRequest,
) -> Result<PropagationReport, GridError> {
    validate(grid, request)?;

    let attribute = request.attribute.as_str();
    let mut report = PropagationReport::default();
    let mut relaxed_this_call: HashSet<CellIndex> = HashSet::new();
    let mut frontier: Vec<CellIndex> = request.seeds.iter().copied().collect();
    let mut distance = request.start_distance;

    while !frontier.is_empty() {
        report.steps = report.steps.saturating_add(1);
        let mut candidates: BTreeSet<CellIndex> = BTreeSet::new();

        for &index in &frontier {
            let Some(cell) = grid.get_mut(index) else {
                continue;
            };
            let Some(current) = cell.number(attribute) else {
                continue;
            };
            if current > distance {
                cell.set_number(attribute, distance);
                candidates.extend(cell.neighbor_indices());
                relaxed_this_call.insert(index);
                report.relaxed = report.relaxed.saturating_add(1);
                report.max_distance = Some(distance);
            }
        }

        let processed: HashSet<CellIndex> = frontier.iter().copied().collect();
        frontier = candidates
            .into_iter()
            .filter(|n| {
                grid.contains(*n) && !processed.contains(n) && !relaxed_this_call.contains(n)
            })
            .collect();
        distance += request.step_size;
    }

    debug!(
        attribute,
        seeds = request.seeds.len(),
        relaxed = report.relaxed,
        steps = report.steps,
        "propagation finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use spider_types::{Cell, NEIGHBOR_COUNT};

    use super::*;
    use crate::hex_grid::tests::{chain, hop_distances, seven_cell_cluster};

    fn value(grid: &HexGrid, i: u32, attribute: &str) -> f64 {
        grid.number(CellIndex(i), attribute).unwrap_or(f64::NAN)
    }

    #[test]
    fn seven_cell_cluster_from_centre() {
        let mut grid = seven_cell_cluster("grid_dist", 50.0);
        let req = PropagationRequest::new([CellIndex(0)], "grid_dist", 0.0, 10.0);
        let report = propagate(&mut grid, &req);
        assert!(report.is_ok());

        assert_relative_eq!(value(&grid, 0, "grid_dist"), 0.0);
        for i in 1..=6 {
            assert_relative_eq!(value(&grid, i, "grid_dist"), 10.0);
        }
        let report = report.unwrap_or_default();
        assert_eq!(report.relaxed, 7);
        assert_eq!(report.max_distance, Some(10.0));
    }

    #[test]
    fn seed_keeps_smaller_existing_value() {
        let mut grid = chain(3, "road_dist", 50.0);
        if let Some(c) = grid.get_mut(CellIndex(0)) {
            c.set_number("road_dist", 2.0);
        }
        let req = PropagationRequest::new([CellIndex(0)], "road_dist", 5.0, 10.0);
        assert!(propagate(&mut grid, &req).is_ok());
        assert_relative_eq!(value(&grid, 0, "road_dist"), 2.0);
        // The seed did not relax, so nothing spread from it.
        assert_relative_eq!(value(&grid, 1, "road_dist"), 50.0);
    }

    #[test]
    fn stops_where_existing_values_are_already_smaller() {
        let mut grid = chain(5, "d", 100.0);
        if let Some(c) = grid.get_mut(CellIndex(2)) {
            c.set_number("d", 1.0);
        }
        let req = PropagationRequest::new([CellIndex(0)], "d", 0.0, 10.0);
        assert!(propagate(&mut grid, &req).is_ok());
        assert_relative_eq!(value(&grid, 0, "d"), 0.0);
        assert_relative_eq!(value(&grid, 1, "d"), 10.0);
        assert_relative_eq!(value(&grid, 2, "d"), 1.0);
        // Beyond the barrier the old values survive.
        assert_relative_eq!(value(&grid, 3, "d"), 100.0);
        assert_relative_eq!(value(&grid, 4, "d"), 100.0);
    }

    #[test]
    fn values_never_increase_and_respect_hop_bound() {
        let mut grid = chain(12, "d", 35.0);
        if let Some(c) = grid.get_mut(CellIndex(9)) {
            c.set_number("d", 0.5);
        }
        let before = grid.column("d").unwrap_or_default();
        let seeds = [CellIndex(0), CellIndex(5)];
        let req = PropagationRequest::new(seeds, "d", 3.0, 7.0);
        assert!(propagate(&mut grid, &req).is_ok());
        let after = grid.column("d").unwrap_or_default();
        let hops = hop_distances(&grid, seeds);

        for ((b, a), h) in before.iter().zip(&after).zip(&hops) {
            assert!(a <= b);
            let relaxed = a < b;
            if relaxed && let Some(h) = h {
                let hops = f64::from(u32::try_from(*h).unwrap_or(u32::MAX));
                assert!(*a <= 7.0_f64.mul_add(hops, 3.0));
            }
        }
        // Cell 9 held a smaller value and shields 10 and 11.
        assert_relative_eq!(after.get(9).copied().unwrap_or_default(), 0.5);
        assert_relative_eq!(after.get(11).copied().unwrap_or_default(), 35.0);
    }

    #[test]
    fn steps_bounded_by_cell_count() {
        let mut grid = chain(30, "d", 1_000.0);
        let req = PropagationRequest::new([CellIndex(0)], "d", 0.0, 1.0);
        let report = propagate(&mut grid, &req).unwrap_or_default();
        assert!(report.steps <= grid.len());
        assert_eq!(report.relaxed, 30);
        assert_relative_eq!(value(&grid, 29, "d"), 29.0);
    }

    #[test]
    fn asymmetric_links_are_followed_one_way() {
        // 0 -> 1 only; 1 has no way back and 2 is unreachable.
        let cells = vec![
            Cell::new(CellIndex(0), [Some(CellIndex(1)), None, None, None, None, None]),
            Cell::new(CellIndex(1), [None; NEIGHBOR_COUNT]),
            Cell::new(CellIndex(2), [Some(CellIndex(0)), None, None, None, None, None]),
        ]
        .into_iter()
        .map(|c| c.with_attribute("d", 9.0))
        .collect();
        let mut grid = HexGrid::new(cells).unwrap_or_default();
        let req = PropagationRequest::new([CellIndex(0)], "d", 0.0, 4.0);
        assert!(propagate(&mut grid, &req).is_ok());
        assert_relative_eq!(value(&grid, 1, "d"), 4.0);
        assert_relative_eq!(value(&grid, 2, "d"), 9.0);
    }

    #[test]
    fn sentinel_and_out_of_range_neighbors_are_skipped() {
        let cells = vec![
            Cell::new(
                CellIndex(0),
                [Some(CellIndex(500)), None, Some(CellIndex(1)), None, None, None],
            )
            .with_attribute("d", 9.0),
            Cell::new(CellIndex(1), [Some(CellIndex(u32::MAX)); NEIGHBOR_COUNT])
                .with_attribute("d", 9.0),
        ];
        let mut grid = HexGrid::new(cells).unwrap_or_default();
        let req = PropagationRequest::new([CellIndex(0)], "d", 0.0, 1.0);
        assert!(propagate(&mut grid, &req).is_ok());
        assert_relative_eq!(value(&grid, 1, "d"), 1.0);
    }

    #[test]
    fn empty_seed_set_is_a_no_op() {
        let mut grid = chain(3, "d", 4.0);
        let req = PropagationRequest::new([], "d", 0.0, 1.0);
        let report = propagate(&mut grid, &req).unwrap_or_default();
        assert_eq!(report.relaxed, 0);
        assert_eq!(report.steps, 0);
        assert!(report.max_distance.is_none());
    }

    #[test]
    fn invalid_requests_fail_without_mutation() {
        let mut grid = chain(3, "d", 4.0);
        let original = grid.clone();

        let bad_step = PropagationRequest::new([CellIndex(0)], "d", 0.0, -1.0);
        assert!(matches!(
            propagate(&mut grid, &bad_step),
            Err(GridError::InvalidStepSize(_))
        ));

        let zero_step = PropagationRequest::new([CellIndex(0)], "d", 0.0, 0.0);
        assert!(matches!(
            propagate(&mut grid, &zero_step),
            Err(GridError::InvalidStepSize(_))
        ));

        let bad_start = PropagationRequest::new([CellIndex(0)], "d", -2.0, 1.0);
        assert!(matches!(
            propagate(&mut grid, &bad_start),
            Err(GridError::InvalidStartDistance(_))
        ));

        let missing = PropagationRequest::new([CellIndex(0)], "nope", 0.0, 1.0);
        assert!(matches!(
            propagate(&mut grid, &missing),
            Err(GridError::MissingAttribute { .. })
        ));

        let unknown_seed = PropagationRequest::new([CellIndex(7)], "d", 0.0, 1.0);
        assert!(matches!(
            propagate(&mut grid, &unknown_seed),
            Err(GridError::CellNotFound(CellIndex(7)))
        ));

        assert_eq!(grid, original);
    }

    #[test]
    fn repeated_draws_are_cumulative() {
        let mut grid = chain(6, "d", 100.0);
        let first = PropagationRequest::new([CellIndex(0)], "d", 0.0, 10.0);
        let second = PropagationRequest::new([CellIndex(5)], "d", 0.0, 10.0);
        assert!(propagate(&mut grid, &first).is_ok());
        assert!(propagate(&mut grid, &second).is_ok());
        let got = grid.column("d").unwrap_or_default();
        let want = [0.0, 10.0, 20.0, 20.0, 10.0, 0.0];
        for (g, w) in got.iter().zip(want) {
            assert_relative_eq!(*g, w);
        }
    }
}
