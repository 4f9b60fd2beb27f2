//! Seed selection: map a drawn point or line onto the cells it touches.
//!
//! Lines are sampled every [`SAMPLE_SPACING_KM`] along their length and each
//! sample is tagged with the cell whose footprint contains it. Samples that
//! fall outside every footprint are dropped.

use std::collections::BTreeSet;

use spider_types::{Cell, CellIndex, Coord};

use crate::error::GridError;
use crate::geometry::{Geometry, ring_contains, sample_line};
use crate::hex_grid::HexGrid;

/// Spacing of sample points along a drawn line, in kilometres.
pub const SAMPLE_SPACING_KM: f64 = 5.0;

/// Axis-aligned bounds of a footprint, for a cheap pre-check.
fn bounds(ring: &[Coord]) -> Option<(Coord, Coord)> {
    let first = *ring.first()?;
    Some(ring.iter().fold((first, first), |(lo, hi), c| {
        (
            Coord::new(lo.lon.min(c.lon), lo.lat.min(c.lat)),
            Coord::new(hi.lon.max(c.lon), hi.lat.max(c.lat)),
        )
    }))
}

fn footprint_contains(cell: &Cell, point: Coord) -> bool {
    let Some((lo, hi)) = bounds(&cell.footprint) else {
        return false;
    };
    point.lon >= lo.lon
        && point.lon <= hi.lon
        && point.lat >= lo.lat
        && point.lat <= hi.lat
        && ring_contains(&cell.footprint, point)
}

/// The cell whose footprint contains `point`, if any.
///
/// When footprints overlap on a shared edge the lowest index wins.
pub fn cell_at(grid: &HexGrid, point: Coord) -> Option<CellIndex> {
    grid.iter()
        .find(|cell| footprint_contains(cell, point))
        .map(|cell| cell.index)
}

/// The positions a drawn geometry is tested at.
///
/// # Errors
///
/// Returns [`GridError::UnsupportedGeometry`] for polygons; only points and
/// lines can be drawn.
pub fn sample_points(geometry: &Geometry) -> Result<Vec<Coord>, GridError> {
    match geometry {
        Geometry::Point { coordinates } => Ok(vec![*coordinates]),
        Geometry::MultiPoint { coordinates } => Ok(coordinates.clone()),
        Geometry::LineString { coordinates } => Ok(sample_line(coordinates, SAMPLE_SPACING_KM)),
        Geometry::MultiLineString { coordinates } => Ok(coordinates
            .iter()
            .flat_map(|line| sample_line(line, SAMPLE_SPACING_KM))
            .collect()),
        Geometry::Polygon { .. } | Geometry::MultiPolygon { .. } => {
            Err(GridError::UnsupportedGeometry(geometry.kind().to_owned()))
        }
    }
}

/// The set of cells touched by a drawn geometry.
///
/// # Errors
///
/// See [`sample_points`].
pub fn select_seeds(grid: &HexGrid, geometry: &Geometry) -> Result<BTreeSet<CellIndex>, GridError> {
    Ok(sample_points(geometry)?
        .into_iter()
        .filter_map(|p| cell_at(grid, p))
        .collect())
}

#[cfg(test)]
mod tests {
    use spider_types::NEIGHBOR_COUNT;

    use super::*;

    /// Three 0.1-degree squares side by side along the equator.
    fn strip() -> HexGrid {
        let cells = (0..3_u32)
            .map(|i| {
                let x0 = f64::from(i) * 0.1;
                let x1 = x0 + 0.1;
                let mut cell = Cell::new(CellIndex(i), [None; NEIGHBOR_COUNT]);
                cell.footprint = vec![
                    Coord::new(x0, -0.05),
                    Coord::new(x1, -0.05),
                    Coord::new(x1, 0.05),
                    Coord::new(x0, 0.05),
                    Coord::new(x0, -0.05),
                ];
                cell
            })
            .collect();
        HexGrid::new(cells).unwrap_or_default()
    }

    #[test]
    fn point_maps_to_containing_cell() {
        let grid = strip();
        assert_eq!(cell_at(&grid, Coord::new(0.15, 0.0)), Some(CellIndex(1)));
        assert_eq!(cell_at(&grid, Coord::new(0.15, 0.5)), None);
    }

    #[test]
    fn cell_zero_is_a_valid_seed() {
        let grid = strip();
        let g = Geometry::Point { coordinates: Coord::new(0.05, 0.0) };
        let seeds = select_seeds(&grid, &g).unwrap_or_default();
        assert_eq!(seeds.into_iter().collect::<Vec<_>>(), vec![CellIndex(0)]);
    }

    #[test]
    fn line_touches_every_cell_it_crosses() {
        let grid = strip();
        // ~31 km across all three cells, sampled every 5 km.
        let g = Geometry::LineString {
            coordinates: vec![Coord::new(0.01, 0.0), Coord::new(0.29, 0.0)],
        };
        let seeds = select_seeds(&grid, &g).unwrap_or_default();
        assert_eq!(
            seeds.into_iter().collect::<Vec<_>>(),
            vec![CellIndex(0), CellIndex(1), CellIndex(2)]
        );
    }

    #[test]
    fn samples_outside_the_grid_are_dropped() {
        let grid = strip();
        let g = Geometry::LineString {
            coordinates: vec![Coord::new(5.0, 5.0), Coord::new(5.1, 5.0)],
        };
        assert!(select_seeds(&grid, &g).unwrap_or_default().is_empty());
    }

    #[test]
    fn polygons_cannot_be_drawn() {
        let grid = strip();
        let g = Geometry::Polygon { coordinates: vec![] };
        assert!(matches!(
            select_seeds(&grid, &g),
            Err(GridError::UnsupportedGeometry(_))
        ));
    }
}
