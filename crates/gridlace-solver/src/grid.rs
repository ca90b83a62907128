//! Grid model: a fixed arena of points with 8-directional adjacency
//! queries and constraint-checked connection mutation.
//!
//! Points live in a row-major arena and are addressed by stable
//! [`PointId`] indices; a point's up-to-two realized links are stored as
//! neighbor ids, so the connection graph carries no ownership at all.
//! The grid owns one [`ConstraintSet`]; every connection added or
//! removed through the grid is validated by it and reported to its
//! observer hooks.

use crate::constraint::{Constraint, ConstraintSet, ConstraintStatus, ValidationResult};
use crate::distance::{MaxDistance, MinDistance};
use crate::non_crossing::NonCrossing;
use crate::types::{ChainId, Coord, CoverError, GridSize, PointId};

/// Connection state of a single grid point.
///
/// A point with zero links is unconnected, one link is a chain
/// endpoint, two links is a chain interior point. The two-slot array
/// makes a third link unrepresentable.
#[derive(Debug, Clone)]
pub struct PointState {
    coord: Coord,
    chain: Option<ChainId>,
    links: [Option<PointId>; 2],
}

impl PointState {
    const fn new(coord: Coord) -> Self {
        Self {
            coord,
            chain: None,
            links: [None, None],
        }
    }

    /// The point's grid coordinate.
    #[must_use]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// The chain this point belongs to, if any.
    #[must_use]
    pub const fn chain(&self) -> Option<ChainId> {
        self.chain
    }

    /// Whether this point has been claimed by a chain.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.chain.is_some()
    }

    /// Number of realized links (0, 1, or 2).
    #[must_use]
    pub fn degree(&self) -> usize {
        self.links.iter().flatten().count()
    }

    /// The ids this point is directly linked to.
    pub fn links(&self) -> impl Iterator<Item = PointId> + '_ {
        self.links.iter().flatten().copied()
    }

    /// Whether this point can take another direct link.
    #[must_use]
    pub fn can_accept_link(&self) -> bool {
        self.degree() < 2
    }

    /// Whether this point is a chain endpoint (exactly one link).
    #[must_use]
    pub fn is_endpoint(&self) -> bool {
        self.degree() == 1
    }

    /// Whether this point is interior to a chain (exactly two links).
    #[must_use]
    pub fn is_interior(&self) -> bool {
        self.degree() == 2
    }

    fn has_link(&self, other: PointId) -> bool {
        self.links.contains(&Some(other))
    }

    fn push_link(&mut self, other: PointId) {
        if let Some(slot) = self.links.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(other);
        }
    }

    fn remove_link(&mut self, other: PointId) -> bool {
        let Some(idx) = self.links.iter().position(|slot| *slot == Some(other)) else {
            return false;
        };
        self.links[idx] = None;
        // Keep occupied slots packed at the front.
        if self.links[0].is_none() {
            self.links.swap(0, 1);
        }
        true
    }

    fn clear(&mut self) {
        self.chain = None;
        self.links = [None, None];
    }
}

/// An N×M grid of points with an owned constraint engine.
pub struct Grid {
    size: GridSize,
    points: Vec<PointState>,
    constraints: ConstraintSet,
}

impl Grid {
    /// Create a grid with the default constraint setup: non-crossing
    /// enabled, max-distance and min-distance registered but disabled.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::InvalidDimensions`] if either dimension is
    /// zero.
    pub fn new(rows: u32, cols: u32) -> Result<Self, CoverError> {
        if rows < 1 || cols < 1 {
            return Err(CoverError::InvalidDimensions { rows, cols });
        }

        let size = GridSize { rows, cols };
        let mut points = Vec::with_capacity(size.total());
        for x in 0..rows {
            for y in 0..cols {
                points.push(PointState::new(Coord::new(x, y)));
            }
        }

        let mut constraints = ConstraintSet::new();
        constraints.add(Box::new(NonCrossing::new()), true)?;
        constraints.add(Box::new(MaxDistance::new(MaxDistance::DEFAULT_LIMIT)), false)?;
        constraints.add(Box::new(MinDistance::new(MinDistance::DEFAULT_LIMIT)), false)?;

        Ok(Self {
            size,
            points,
            constraints,
        })
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.size.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.size.cols
    }

    /// Total number of points.
    #[must_use]
    pub const fn total_points(&self) -> usize {
        self.size.total()
    }

    /// Whether `(x, y)` lies within the grid bounds.
    #[must_use]
    pub const fn is_valid_position(&self, x: u32, y: u32) -> bool {
        x < self.size.rows && y < self.size.cols
    }

    /// Id of the point at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn point_id(&self, x: u32, y: u32) -> Option<PointId> {
        if self.is_valid_position(x, y) {
            Some(PointId(x as usize * self.size.cols as usize + y as usize))
        } else {
            None
        }
    }

    /// State of the point with the given id.
    #[must_use]
    pub fn point(&self, id: PointId) -> &PointState {
        &self.points[id.index()]
    }

    /// Coordinate of the point with the given id.
    #[must_use]
    pub fn coord(&self, id: PointId) -> Coord {
        self.points[id.index()].coord()
    }

    /// The up-to-8 points adjacent to `id`, in row-major scan order.
    #[must_use]
    pub fn neighbors(&self, id: PointId) -> Vec<PointId> {
        let center = self.coord(id);
        let mut neighbors = Vec::with_capacity(8);
        for dx in -1..=1i32 {
            for dy in -1..=1i32 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(x) = center.x.checked_add_signed(dx) else {
                    continue;
                };
                let Some(y) = center.y.checked_add_signed(dy) else {
                    continue;
                };
                if let Some(neighbor) = self.point_id(x, y) {
                    neighbors.push(neighbor);
                }
            }
        }
        neighbors
    }

    /// All point ids, in row-major order.
    ///
    /// Row-major order is the tie-break source for every "first
    /// encountered wins" selection in the solver.
    #[must_use]
    pub fn all_points(&self) -> Vec<PointId> {
        (0..self.points.len()).map(PointId).collect()
    }

    /// Ids of points not yet claimed by any chain, in row-major order.
    #[must_use]
    pub fn unconnected_points(&self) -> Vec<PointId> {
        self.filtered_points(|p| !p.is_connected())
    }

    /// Ids of points claimed by a chain, in row-major order.
    #[must_use]
    pub fn connected_points(&self) -> Vec<PointId> {
        self.filtered_points(PointState::is_connected)
    }

    /// Number of unconnected points.
    #[must_use]
    pub fn unconnected_count(&self) -> usize {
        self.points.iter().filter(|p| !p.is_connected()).count()
    }

    /// Number of connected points.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_connected()).count()
    }

    /// Fraction of points connected, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn connection_progress(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.connected_count() as f64 / self.points.len() as f64
    }

    /// Whether a connection between `a` and `b` passes every enabled
    /// constraint. Boolean hot path.
    #[must_use]
    pub fn validate_connection(&self, a: PointId, b: PointId) -> bool {
        self.constraints.validate_fast(self, a, b)
    }

    /// Full constraint report for a proposed connection, naming the
    /// first failing constraint on rejection.
    #[must_use]
    pub fn explain_connection(&self, a: PointId, b: PointId) -> ValidationResult {
        self.constraints.validate(self, a, b)
    }

    /// Realize a connection between two points.
    ///
    /// Returns `false` without mutating anything when the points are
    /// identical, not adjacent, already linked to each other, either is
    /// at its two-link cap, or any enabled constraint rejects the
    /// segment. On success the bidirectional link is recorded and every
    /// constraint is notified.
    pub fn add_connection(&mut self, a: PointId, b: PointId) -> bool {
        if a == b {
            return false;
        }
        let (pa, pb) = (self.point(a), self.point(b));
        if !pa.coord().is_adjacent_to(pb.coord()) {
            return false;
        }
        if pa.has_link(b) {
            return false;
        }
        if !pa.can_accept_link() || !pb.can_accept_link() {
            return false;
        }
        if !self.validate_connection(a, b) {
            return false;
        }

        let (ca, cb) = (self.coord(a), self.coord(b));
        self.points[a.index()].push_link(b);
        self.points[b.index()].push_link(a);
        self.constraints.notify_connected(ca, cb);
        true
    }

    /// Remove the connection between two points.
    ///
    /// Returns `false` if no such connection exists. On success both
    /// link slots are cleared and every constraint is notified.
    pub fn remove_connection(&mut self, a: PointId, b: PointId) -> bool {
        if a == b {
            return false;
        }
        if !self.points[a.index()].remove_link(b) {
            return false;
        }
        self.points[b.index()].remove_link(a);
        let (ca, cb) = (self.coord(a), self.coord(b));
        self.constraints.notify_disconnected(ca, cb);
        true
    }

    /// Reset every point to the unconnected state and clear all
    /// constraint-tracked connection state.
    ///
    /// Callable repeatedly; afterwards the grid is indistinguishable
    /// from a freshly constructed one.
    pub fn reset_connections(&mut self) {
        for point in &mut self.points {
            point.clear();
        }
        self.constraints.notify_reset();
    }

    /// Register an additional constraint.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::DuplicateConstraint`] if the name is
    /// already registered.
    pub fn add_constraint(
        &mut self,
        constraint: Box<dyn Constraint>,
        enabled: bool,
    ) -> Result<(), CoverError> {
        self.constraints.add(constraint, enabled)
    }

    /// Remove a constraint by name. Returns `false` if absent.
    pub fn remove_constraint(&mut self, name: &str) -> bool {
        self.constraints.remove(name)
    }

    /// Enable a constraint by name. Returns `false` if absent.
    pub fn enable_constraint(&mut self, name: &str) -> bool {
        self.constraints.enable(name)
    }

    /// Disable a constraint by name. Returns `false` if absent.
    pub fn disable_constraint(&mut self, name: &str) -> bool {
        self.constraints.disable(name)
    }

    /// Whether the named constraint exists and is enabled.
    #[must_use]
    pub fn is_constraint_enabled(&self, name: &str) -> bool {
        self.constraints.is_enabled(name)
    }

    /// Total number of registered constraints.
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of enabled constraints.
    #[must_use]
    pub fn enabled_constraint_count(&self) -> usize {
        self.constraints.enabled_count()
    }

    /// Name, description, and enabled flag of every registered
    /// constraint, for presentation layers.
    #[must_use]
    pub fn constraint_statuses(&self) -> Vec<ConstraintStatus> {
        self.constraints.statuses()
    }

    pub(crate) fn assign_chain(&mut self, id: PointId, chain: ChainId) {
        self.points[id.index()].chain = Some(chain);
    }

    pub(crate) fn release_chain(&mut self, id: PointId) {
        self.points[id.index()].chain = None;
    }

    fn filtered_points(&self, keep: impl Fn(&PointState) -> bool) -> Vec<PointId> {
        self.points
            .iter()
            .enumerate()
            .filter(|&(_, point)| keep(point))
            .map(|(idx, _)| PointId(idx))
            .collect()
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.size.rows)
            .field("cols", &self.size.cols)
            .field("connected", &self.connected_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(grid: &Grid, x: u32, y: u32) -> PointId {
        grid.point_id(x, y).unwrap()
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            Grid::new(0, 5),
            Err(CoverError::InvalidDimensions { rows: 0, cols: 5 }),
        ));
        assert!(matches!(Grid::new(3, 0), Err(CoverError::InvalidDimensions { .. })));
    }

    #[test]
    fn one_by_one_grid_is_valid() {
        let grid = Grid::new(1, 1).unwrap();
        assert_eq!(grid.total_points(), 1);
        assert!(grid.point_id(0, 0).is_some());
        assert!(grid.point_id(0, 1).is_none());
        assert!(grid.point_id(1, 0).is_none());
    }

    #[test]
    fn default_constraints_registered() {
        let grid = Grid::new(2, 2).unwrap();
        assert_eq!(grid.constraint_count(), 3);
        assert_eq!(grid.enabled_constraint_count(), 1);
        assert!(grid.is_constraint_enabled("non-crossing"));
        assert!(!grid.is_constraint_enabled("max-distance"));
        assert!(!grid.is_constraint_enabled("min-distance"));
    }

    #[test]
    fn neighbors_of_center_point() {
        let grid = Grid::new(3, 3).unwrap();
        let center = id(&grid, 1, 1);
        let neighbors = grid.neighbors(center);
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&center));
    }

    #[test]
    fn neighbors_of_corner_point() {
        let grid = Grid::new(3, 3).unwrap();
        let corner = id(&grid, 0, 0);
        let neighbors = grid.neighbors(corner);
        assert_eq!(neighbors.len(), 3);
        // Row-major scan order.
        assert_eq!(neighbors[0], id(&grid, 0, 1));
        assert_eq!(neighbors[1], id(&grid, 1, 0));
        assert_eq!(neighbors[2], id(&grid, 1, 1));
    }

    #[test]
    fn all_points_row_major() {
        let grid = Grid::new(2, 3).unwrap();
        let coords: Vec<Coord> = grid.all_points().iter().map(|&p| grid.coord(p)).collect();
        assert_eq!(
            coords,
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(0, 2),
                Coord::new(1, 0),
                Coord::new(1, 1),
                Coord::new(1, 2),
            ],
        );
    }

    #[test]
    fn add_connection_links_both_sides() {
        let mut grid = Grid::new(2, 2).unwrap();
        let (a, b) = (id(&grid, 0, 0), id(&grid, 0, 1));
        assert!(grid.add_connection(a, b));
        assert_eq!(grid.point(a).degree(), 1);
        assert_eq!(grid.point(b).degree(), 1);
        assert!(grid.point(a).links().any(|l| l == b));
        assert!(grid.point(b).links().any(|l| l == a));
    }

    #[test]
    fn add_connection_rejects_self() {
        let mut grid = Grid::new(2, 2).unwrap();
        let a = id(&grid, 0, 0);
        assert!(!grid.add_connection(a, a));
    }

    #[test]
    fn add_connection_rejects_non_adjacent() {
        let mut grid = Grid::new(3, 3).unwrap();
        let (a, b) = (id(&grid, 0, 0), id(&grid, 0, 2));
        assert!(!grid.add_connection(a, b));
        assert_eq!(grid.point(a).degree(), 0);
    }

    #[test]
    fn add_connection_rejects_duplicate() {
        let mut grid = Grid::new(2, 2).unwrap();
        let (a, b) = (id(&grid, 0, 0), id(&grid, 0, 1));
        assert!(grid.add_connection(a, b));
        assert!(!grid.add_connection(a, b));
        assert!(!grid.add_connection(b, a));
        assert_eq!(grid.point(a).degree(), 1);
    }

    #[test]
    fn add_connection_enforces_two_link_cap() {
        let mut grid = Grid::new(3, 3).unwrap();
        let center = id(&grid, 1, 1);
        assert!(grid.add_connection(center, id(&grid, 0, 1)));
        assert!(grid.add_connection(center, id(&grid, 2, 1)));
        // Third link must fail gracefully.
        assert!(!grid.add_connection(center, id(&grid, 1, 0)));
        assert_eq!(grid.point(center).degree(), 2);
        assert!(grid.point(center).is_interior());
    }

    #[test]
    fn remove_connection_round_trip() {
        let mut grid = Grid::new(2, 2).unwrap();
        let (a, b) = (id(&grid, 0, 0), id(&grid, 0, 1));
        assert!(grid.add_connection(a, b));
        assert!(grid.remove_connection(a, b));
        assert_eq!(grid.point(a).degree(), 0);
        assert_eq!(grid.point(b).degree(), 0);
        assert!(!grid.remove_connection(a, b));
        // Slot freed: the connection can be realized again.
        assert!(grid.add_connection(a, b));
    }

    #[test]
    fn crossing_diagonals_rejected_then_allowed_after_removal() {
        let mut grid = Grid::new(2, 2).unwrap();
        let (a, b) = (id(&grid, 0, 0), id(&grid, 1, 1));
        let (c, d) = (id(&grid, 0, 1), id(&grid, 1, 0));
        assert!(grid.add_connection(a, b));
        // The opposite diagonal crosses the first.
        assert!(!grid.add_connection(c, d));
        assert!(grid.remove_connection(a, b));
        assert!(grid.add_connection(c, d));
    }

    #[test]
    fn reset_restores_fresh_state_repeatedly() {
        let mut grid = Grid::new(2, 2).unwrap();
        let (a, b) = (id(&grid, 0, 0), id(&grid, 1, 1));
        let (c, d) = (id(&grid, 0, 1), id(&grid, 1, 0));

        for _ in 0..3 {
            assert!(grid.add_connection(a, b));
            assert!(!grid.add_connection(c, d));
            grid.reset_connections();
            assert_eq!(grid.connected_count(), 0);
            assert_eq!(grid.point(a).degree(), 0);
            // No stale segment may linger in the non-crossing tracker.
            assert!(grid.add_connection(c, d));
            grid.reset_connections();
        }
    }

    #[test]
    fn connection_progress_tracks_chain_assignment() {
        let mut grid = Grid::new(2, 2).unwrap();
        assert!((grid.connection_progress() - 0.0).abs() < f64::EPSILON);
        let a = id(&grid, 0, 0);
        grid.assign_chain(a, ChainId(0));
        assert!((grid.connection_progress() - 0.25).abs() < f64::EPSILON);
        assert_eq!(grid.connected_points(), vec![a]);
        assert_eq!(grid.unconnected_count(), 3);
    }

    #[test]
    fn explain_connection_names_failing_constraint() {
        let mut grid = Grid::new(2, 2).unwrap();
        let (a, b) = (id(&grid, 0, 0), id(&grid, 1, 1));
        assert!(grid.add_connection(a, b));
        let (c, d) = (id(&grid, 0, 1), id(&grid, 1, 0));
        let result = grid.explain_connection(c, d);
        assert_eq!(result.failed_constraint(), Some("non-crossing"));
        assert!(grid.explain_connection(a, b).is_valid());
    }
}
