//! Distance constraints: Euclidean bounds on the length of a proposed
//! connection.
//!
//! Both constraints are stateless -- the distance is recomputed on
//! every check -- and registered disabled by default. Thresholds are
//! fixed at construction; to change one, remove the constraint and
//! register a replacement.

use geo::line_measures::Distance;
use geo::{Euclidean, Point};

use crate::constraint::{Constraint, ConstraintError};
use crate::grid::Grid;
use crate::types::{Coord, PointId};

/// Convert a grid coordinate to a `geo::Point`.
fn coord_to_point(c: Coord) -> Point<f64> {
    Point::new(f64::from(c.x), f64::from(c.y))
}

fn euclidean(a: Coord, b: Coord) -> f64 {
    Euclidean.distance(coord_to_point(a), coord_to_point(b))
}

/// Rejects connections longer than a fixed Euclidean distance.
#[derive(Debug, Clone, Copy)]
pub struct MaxDistance {
    limit: f64,
}

impl MaxDistance {
    /// Registration name of this constraint.
    pub const NAME: &'static str = "max-distance";

    /// Default distance limit.
    pub const DEFAULT_LIMIT: f64 = 2.0;

    /// Create the constraint with the given distance limit.
    #[must_use]
    pub const fn new(limit: f64) -> Self {
        Self { limit }
    }

    /// The configured distance limit.
    #[must_use]
    pub const fn limit(self) -> f64 {
        self.limit
    }
}

impl Default for MaxDistance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

impl Constraint for MaxDistance {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> String {
        format!("limits connections to a maximum distance of {}", self.limit)
    }

    fn check(&self, grid: &Grid, a: PointId, b: PointId) -> Result<bool, ConstraintError> {
        Ok(euclidean(grid.coord(a), grid.coord(b)) <= self.limit)
    }
}

/// Rejects connections shorter than a fixed Euclidean distance.
#[derive(Debug, Clone, Copy)]
pub struct MinDistance {
    limit: f64,
}

impl MinDistance {
    /// Registration name of this constraint.
    pub const NAME: &'static str = "min-distance";

    /// Default distance requirement.
    pub const DEFAULT_LIMIT: f64 = 1.0;

    /// Create the constraint with the given distance requirement.
    #[must_use]
    pub const fn new(limit: f64) -> Self {
        Self { limit }
    }

    /// The configured distance requirement.
    #[must_use]
    pub const fn limit(self) -> f64 {
        self.limit
    }
}

impl Default for MinDistance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

impl Constraint for MinDistance {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> String {
        format!(
            "requires connections to span at least distance {}",
            self.limit
        )
    }

    fn check(&self, grid: &Grid, a: PointId, b: PointId) -> Result<bool, ConstraintError> {
        Ok(euclidean(grid.coord(a), grid.coord(b)) >= self.limit)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pair(grid: &Grid, a: (u32, u32), b: (u32, u32)) -> (PointId, PointId) {
        (
            grid.point_id(a.0, a.1).unwrap(),
            grid.point_id(b.0, b.1).unwrap(),
        )
    }

    #[test]
    fn euclidean_distance_of_unit_steps() {
        assert!((euclidean(Coord::new(0, 0), Coord::new(0, 1)) - 1.0).abs() < 1e-12);
        assert!((euclidean(Coord::new(0, 0), Coord::new(1, 1)) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn max_distance_accepts_within_limit() {
        let grid = Grid::new(2, 2).unwrap();
        let (a, b) = pair(&grid, (0, 0), (1, 1));
        let constraint = MaxDistance::new(2.0);
        assert!(constraint.check(&grid, a, b).unwrap());
    }

    #[test]
    fn max_distance_rejects_beyond_limit() {
        let grid = Grid::new(2, 2).unwrap();
        let (a, b) = pair(&grid, (0, 0), (1, 1));
        let constraint = MaxDistance::new(1.0);
        assert!(!constraint.check(&grid, a, b).unwrap());
    }

    #[test]
    fn min_distance_rejects_short_connection() {
        let grid = Grid::new(2, 2).unwrap();
        let (a, b) = pair(&grid, (0, 0), (0, 1));
        let constraint = MinDistance::new(1.5);
        assert!(!constraint.check(&grid, a, b).unwrap());
    }

    #[test]
    fn min_distance_accepts_diagonal_above_threshold() {
        let grid = Grid::new(2, 2).unwrap();
        let (a, b) = pair(&grid, (0, 0), (1, 1));
        let constraint = MinDistance::new(1.2);
        assert!(constraint.check(&grid, a, b).unwrap());
    }

    #[test]
    fn limit_at_exact_distance_is_inclusive() {
        let grid = Grid::new(1, 2).unwrap();
        let (a, b) = pair(&grid, (0, 0), (0, 1));
        assert!(MaxDistance::new(1.0).check(&grid, a, b).unwrap());
        assert!(MinDistance::new(1.0).check(&grid, a, b).unwrap());
    }

    #[test]
    fn enabled_min_distance_blocks_grid_connection() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.enable_constraint(MinDistance::NAME);
        let (a, b) = pair(&grid, (0, 0), (0, 1));
        // Default requirement is 1.0, inclusive: the unit step passes.
        assert!(grid.add_connection(a, b));

        let mut strict = Grid::new(2, 2).unwrap();
        strict.remove_constraint(MinDistance::NAME);
        strict
            .add_constraint(Box::new(MinDistance::new(1.5)), true)
            .unwrap();
        let (a, b) = pair(&strict, (0, 0), (0, 1));
        assert!(!strict.add_connection(a, b));
        let result = strict.explain_connection(a, b);
        assert_eq!(result.failed_constraint(), Some(MinDistance::NAME));
    }
}
