//! Shared types for the gridlace chain-cover solver.

use serde::{Deserialize, Serialize};

use crate::stats::CoverageStats;

/// A position on the grid, in integer grid coordinates.
///
/// `x` is the row index and `y` the column index, matching the grid's
/// row-major scan order. Coordinates are the identity of a point:
/// equality and hashing use them and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Row index.
    pub x: u32,
    /// Column index.
    pub y: u32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Whether another coordinate is 8-directionally adjacent to this one.
    ///
    /// Adjacency is Chebyshev distance 1: both axis deltas at most one,
    /// and the two coordinates are not the same cell.
    #[must_use]
    pub const fn is_adjacent_to(self, other: Self) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && dx + dy > 0
    }
}

/// Stable index of a point within a grid's arena.
///
/// Ids are issued by [`Grid`](crate::Grid) queries and are valid for the
/// lifetime of the grid that produced them. They carry no meaning across
/// grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointId(pub(crate) usize);

impl PointId {
    /// The raw arena index.
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// Identifier of a chain, issued monotonically by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub(crate) u32);

impl ChainId {
    /// The numeric value of this id.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Grid dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
}

impl GridSize {
    /// Total number of points on a grid of this size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn total(self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// A sequence of connected grid coordinates forming one chain's path.
///
/// This is the exported, grid-independent rendering of a finalized
/// chain: consecutive coordinates are realized connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polyline(Vec<Coord>);

impl Polyline {
    /// Create a new polyline from a vector of coordinates.
    #[must_use]
    pub const fn new(points: Vec<Coord>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Coord> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Coord> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Coord] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying coordinates.
    #[must_use]
    pub fn into_points(self) -> Vec<Coord> {
        self.0
    }
}

/// Result of a successful batch cover.
///
/// Contains the chain paths as grid-independent polylines plus the grid
/// dimensions and a coverage snapshot, everything a presentation layer
/// needs to draw the finished cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverResult {
    /// One polyline per finalized chain, in build order.
    pub polylines: Vec<Polyline>,
    /// Dimensions of the covered grid.
    pub size: GridSize,
    /// Coverage statistics at completion.
    pub stats: CoverageStats,
}

/// Errors reported by grid construction, chain mutation, and the batch
/// build path.
///
/// Frequent, expected search outcomes (a candidate that fails a
/// constraint, a point a chain cannot take) are **not** errors -- they
/// are `bool`/`Option` returns on the normal control path. This enum
/// covers caller mistakes and the one fatal systemic failure.
#[derive(Debug, thiserror::Error)]
pub enum CoverError {
    /// Grid constructed with a zero dimension.
    #[error("grid dimensions must be at least 1x1, got {rows}x{cols}")]
    InvalidDimensions {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        cols: u32,
    },

    /// A constraint with this name is already registered.
    #[error("constraint '{0}' is already registered")]
    DuplicateConstraint(String),

    /// The point failed the chain's structural acceptance check.
    #[error("point ({x}, {y}) cannot be added to chain {chain}")]
    ChainRejectedPoint {
        /// Row of the rejected point.
        x: u32,
        /// Column of the rejected point.
        y: u32,
        /// Id of the chain that rejected it.
        chain: u32,
    },

    /// No open endpoint of the chain could realize a connection to the
    /// point (adjacency, degree, or constraint validation failed at
    /// commit time).
    #[error("no endpoint of chain {chain} can accept point ({x}, {y})")]
    NoConnectableEndpoint {
        /// Row of the point.
        x: u32,
        /// Column of the point.
        y: u32,
        /// Id of the chain.
        chain: u32,
    },

    /// The batch build exhausted its attempt budget with points still
    /// unconnected. This signals a configuration problem (constraints
    /// too strict, chain capacity too small), not a retriable condition.
    #[error("cover incomplete: {unconnected} points remain unconnected")]
    Incomplete {
        /// Number of points left unconnected.
        unconnected: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Coord tests ---

    #[test]
    fn coord_equality_and_hash_key() {
        assert_eq!(Coord::new(1, 2), Coord::new(1, 2));
        assert_ne!(Coord::new(1, 2), Coord::new(2, 1));
    }

    #[test]
    fn coord_adjacency_eight_directions() {
        let center = Coord::new(5, 5);
        for dx in 0..3u32 {
            for dy in 0..3u32 {
                let other = Coord::new(4 + dx, 4 + dy);
                if other == center {
                    assert!(!center.is_adjacent_to(other), "self is not adjacent");
                } else {
                    assert!(center.is_adjacent_to(other), "{other:?} should be adjacent");
                }
            }
        }
    }

    #[test]
    fn coord_not_adjacent_beyond_chebyshev_one() {
        let origin = Coord::new(0, 0);
        assert!(!origin.is_adjacent_to(Coord::new(0, 2)));
        assert!(!origin.is_adjacent_to(Coord::new(2, 2)));
        assert!(!origin.is_adjacent_to(Coord::new(3, 0)));
    }

    #[test]
    fn coord_adjacency_is_symmetric() {
        let a = Coord::new(2, 3);
        let b = Coord::new(3, 4);
        assert_eq!(a.is_adjacent_to(b), b.is_adjacent_to(a));
    }

    // --- GridSize tests ---

    #[test]
    fn grid_size_total() {
        assert_eq!(GridSize { rows: 3, cols: 4 }.total(), 12);
        assert_eq!(GridSize { rows: 1, cols: 1 }.total(), 1);
    }

    // --- Polyline tests ---

    #[test]
    fn polyline_new_and_len() {
        let pl = Polyline::new(vec![Coord::new(0, 0), Coord::new(1, 1)]);
        assert_eq!(pl.len(), 2);
        assert!(!pl.is_empty());
    }

    #[test]
    fn polyline_empty() {
        let pl = Polyline::new(vec![]);
        assert!(pl.is_empty());
        assert_eq!(pl.len(), 0);
        assert!(pl.first().is_none());
        assert!(pl.last().is_none());
    }

    #[test]
    fn polyline_first_and_last() {
        let pl = Polyline::new(vec![Coord::new(1, 2), Coord::new(3, 4), Coord::new(5, 6)]);
        assert_eq!(pl.first(), Some(&Coord::new(1, 2)));
        assert_eq!(pl.last(), Some(&Coord::new(5, 6)));
    }

    #[test]
    fn polyline_into_points_returns_owned_vec() {
        let points = vec![Coord::new(0, 0), Coord::new(1, 1)];
        let pl = Polyline::new(points.clone());
        assert_eq!(pl.into_points(), points);
    }

    // --- CoverError tests ---

    #[test]
    fn error_invalid_dimensions_display() {
        let err = CoverError::InvalidDimensions { rows: 0, cols: 5 };
        assert_eq!(err.to_string(), "grid dimensions must be at least 1x1, got 0x5");
    }

    #[test]
    fn error_duplicate_constraint_display() {
        let err = CoverError::DuplicateConstraint("non-crossing".to_string());
        assert_eq!(err.to_string(), "constraint 'non-crossing' is already registered");
    }

    #[test]
    fn error_incomplete_display() {
        let err = CoverError::Incomplete { unconnected: 7 };
        assert_eq!(err.to_string(), "cover incomplete: 7 points remain unconnected");
    }

    // --- Serde round-trip tests ---

    #[test]
    fn coord_serde_round_trip() {
        let c = Coord::new(3, 9);
        let json = serde_json::to_string(&c).unwrap();
        let deserialized: Coord = serde_json::from_str(&json).unwrap();
        assert_eq!(c, deserialized);
    }

    #[test]
    fn polyline_serde_round_trip() {
        let pl = Polyline::new(vec![Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 1)]);
        let json = serde_json::to_string(&pl).unwrap();
        let deserialized: Polyline = serde_json::from_str(&json).unwrap();
        assert_eq!(pl, deserialized);
    }

    #[test]
    fn grid_size_serde_round_trip() {
        let size = GridSize { rows: 6, cols: 8 };
        let json = serde_json::to_string(&size).unwrap();
        let deserialized: GridSize = serde_json::from_str(&json).unwrap();
        assert_eq!(size, deserialized);
    }
}
