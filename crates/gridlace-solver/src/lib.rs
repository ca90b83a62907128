//! gridlace-solver: pure chain-cover search over an N×M grid of points
//! (sans-IO).
//!
//! Covers every grid point with simple, non-crossing chains through
//! four cooperating pieces: grid model -> constraint engine -> chain
//! model -> greedy cover builder.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! state and returns structured data. Presentation concerns (drawing,
//! input handling, animation pacing) belong to the caller, which can
//! drive the solver incrementally via
//! [`ChainBuilder::build_step`] and read back grid state between
//! steps.
//!
//! ```
//! let result = gridlace_solver::cover(3, 3, 5)?;
//! assert_eq!(result.stats.total_points, 9);
//! assert!((result.stats.coverage_percentage - 100.0).abs() < 1e-9);
//! # Ok::<(), gridlace_solver::CoverError>(())
//! ```

pub mod builder;
pub mod chain;
pub mod constraint;
pub mod distance;
pub mod grid;
pub mod non_crossing;
pub mod stats;
pub mod types;

pub use builder::ChainBuilder;
pub use chain::Chain;
pub use constraint::{
    Constraint, ConstraintError, ConstraintSet, ConstraintStatus, ValidationResult,
};
pub use distance::{MaxDistance, MinDistance};
pub use grid::{Grid, PointState};
pub use non_crossing::NonCrossing;
pub use stats::CoverageStats;
pub use types::{ChainId, Coord, CoverError, CoverResult, GridSize, PointId, Polyline};

/// Cover a grid in one call.
///
/// Builds a `rows × cols` grid with the default constraints
/// (non-crossing enabled, distance constraints registered but
/// disabled), runs the batch cover with the given per-chain connection
/// cap, and returns the finished paths plus a coverage snapshot.
///
/// # Errors
///
/// Returns [`CoverError::InvalidDimensions`] if either dimension is
/// zero, and [`CoverError::Incomplete`] if the search exhausts its
/// attempt budget with points still unconnected.
pub fn cover(rows: u32, cols: u32, max_connections: usize) -> Result<CoverResult, CoverError> {
    let grid = Grid::new(rows, cols)?;
    let mut builder = ChainBuilder::new(grid, max_connections);
    builder.build_chains()?;

    let polylines = builder
        .chains()
        .iter()
        .map(|chain| chain.to_polyline(builder.grid()))
        .collect();
    let stats = builder.coverage_stats();
    let size = builder.grid().size();

    Ok(CoverResult {
        polylines,
        size,
        stats,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cover_rejects_zero_dimensions() {
        assert!(matches!(
            cover(0, 3, 5),
            Err(CoverError::InvalidDimensions { .. }),
        ));
    }

    #[test]
    fn cover_single_point_grid() {
        let result = cover(1, 1, 0).unwrap();
        assert_eq!(result.polylines.len(), 1);
        assert_eq!(result.polylines[0].len(), 1);
        assert_eq!(result.size, GridSize { rows: 1, cols: 1 });
        assert_eq!(result.stats.unconnected_points, 0);
    }

    #[test]
    fn cover_reaches_every_point() {
        let result = cover(4, 5, 6).unwrap();
        let covered: usize = result.polylines.iter().map(Polyline::len).sum();
        assert_eq!(covered, 20);
        assert!((result.stats.coverage_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cover_polylines_step_between_adjacent_points() {
        let result = cover(4, 4, 5).unwrap();
        for polyline in &result.polylines {
            for pair in polyline.points().windows(2) {
                assert!(
                    pair[0].is_adjacent_to(pair[1]),
                    "consecutive path points must be adjacent: {pair:?}",
                );
            }
        }
    }
}
