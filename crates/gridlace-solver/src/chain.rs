//! Chain model: an ordered path of grid points with endpoint tracking
//! and structural validity checking.
//!
//! A chain records membership in build order and caps its number of
//! connections (`points - 1` when non-empty). Every realized link goes
//! through [`Grid::add_connection`], so constraint state always sees
//! the segments a chain creates.

use crate::grid::Grid;
use crate::types::{ChainId, CoverError, PointId, Polyline};

/// A simple path of connected grid points.
#[derive(Debug, Clone)]
pub struct Chain {
    id: ChainId,
    max_connections: usize,
    points: Vec<PointId>,
}

impl Chain {
    pub(crate) const fn new(id: ChainId, max_connections: usize) -> Self {
        Self {
            id,
            max_connections,
            points: Vec::new(),
        }
    }

    /// This chain's identifier.
    #[must_use]
    pub const fn id(&self) -> ChainId {
        self.id
    }

    /// Maximum number of connections this chain may hold.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Member point ids, in the order they were added.
    #[must_use]
    pub fn points(&self) -> &[PointId] {
        &self.points
    }

    /// Number of member points.
    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of realized connections (`points - 1`, floored at zero).
    #[must_use]
    pub const fn connection_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Chain length, measured in connections.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.connection_count()
    }

    /// Whether the chain has reached its connection capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.connection_count() >= self.max_connections
    }

    /// Whether the chain has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The chain's endpoint(s): empty for an empty chain, the sole
    /// point for a singleton, otherwise the first and last members.
    #[must_use]
    pub fn endpoints(&self) -> Vec<PointId> {
        match self.points.as_slice() {
            [] => Vec::new(),
            [only] => vec![*only],
            [first, .., last] => vec![*first, *last],
        }
    }

    /// Whether `point` could be added to this chain right now.
    ///
    /// False if the point is already claimed by a chain, the chain is
    /// at capacity, the point cannot take another link, or no open
    /// endpoint is adjacent to it. An empty chain accepts any
    /// unconnected point unconditionally -- it becomes the seed.
    #[must_use]
    pub fn can_add_point(&self, grid: &Grid, point: PointId) -> bool {
        let state = grid.point(point);
        if state.is_connected() {
            return false;
        }
        if self.points.is_empty() {
            return true;
        }
        if self.is_full() {
            return false;
        }
        if !state.can_accept_link() {
            return false;
        }
        let target = state.coord();
        self.endpoints().iter().any(|&endpoint| {
            let end = grid.point(endpoint);
            end.can_accept_link() && end.coord().is_adjacent_to(target)
        })
    }

    /// Add a point to this chain.
    ///
    /// The first point is simply claimed. Subsequent points are linked
    /// to the first endpoint that is adjacent, has a free link slot,
    /// and passes the grid's full connection validation; the point is
    /// then claimed and appended.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::ChainRejectedPoint`] when
    /// [`can_add_point`](Self::can_add_point) is false, and
    /// [`CoverError::NoConnectableEndpoint`] when no endpoint
    /// connection could be realized (typically a constraint rejected
    /// every candidate segment). Callers on the search path treat both
    /// as "no valid extension".
    pub fn add_point(&mut self, grid: &mut Grid, point: PointId) -> Result<(), CoverError> {
        let target = grid.coord(point);
        if !self.can_add_point(grid, point) {
            return Err(CoverError::ChainRejectedPoint {
                x: target.x,
                y: target.y,
                chain: self.id.value(),
            });
        }

        if self.points.is_empty() {
            grid.assign_chain(point, self.id);
            self.points.push(point);
            return Ok(());
        }

        for endpoint in self.endpoints() {
            let connectable = {
                let end = grid.point(endpoint);
                end.can_accept_link() && end.coord().is_adjacent_to(target)
            };
            if connectable && grid.add_connection(endpoint, point) {
                grid.assign_chain(point, self.id);
                self.points.push(point);
                return Ok(());
            }
        }

        Err(CoverError::NoConnectableEndpoint {
            x: target.x,
            y: target.y,
            chain: self.id.value(),
        })
    }

    /// Remove a member point from this chain.
    ///
    /// Tears down the point's realized links (notifying constraints),
    /// releases its chain claim, and drops it from the membership
    /// list. Returns `false` if the point is not a member. Removing an
    /// interior point leaves the chain structurally invalid until the
    /// gap is repaired.
    pub fn remove_point(&mut self, grid: &mut Grid, point: PointId) -> bool {
        let Some(idx) = self.points.iter().position(|&p| p == point) else {
            return false;
        };
        let linked: Vec<PointId> = grid.point(point).links().collect();
        for other in linked {
            grid.remove_connection(point, other);
        }
        grid.release_chain(point);
        self.points.remove(idx);
        true
    }

    /// Structural validity of this chain.
    ///
    /// An empty chain is trivially valid; a singleton is valid. For
    /// length two and up: exactly two members have degree 1, all
    /// others degree 2, every member carries this chain's id, and the
    /// connection count is within capacity.
    #[must_use]
    pub fn is_valid_chain(&self, grid: &Grid) -> bool {
        if self.points.is_empty() {
            return true;
        }
        if self.connection_count() > self.max_connections {
            return false;
        }
        if self
            .points
            .iter()
            .any(|&p| grid.point(p).chain() != Some(self.id))
        {
            return false;
        }
        if self.points.len() == 1 {
            return true;
        }

        let mut endpoints = 0usize;
        let mut interior = 0usize;
        for &p in &self.points {
            match grid.point(p).degree() {
                1 => endpoints += 1,
                2 => interior += 1,
                _ => return false,
            }
        }
        endpoints == 2 && interior == self.points.len() - 2
    }

    /// Render this chain as a polyline in path order.
    ///
    /// Membership order is build order, which diverges from path order
    /// once a chain has grown from both endpoints; the polyline is
    /// produced by walking the realized links from a degree-1 member.
    #[must_use]
    pub fn to_polyline(&self, grid: &Grid) -> Polyline {
        let Some(&first) = self.points.first() else {
            return Polyline::new(Vec::new());
        };
        if self.points.len() == 1 {
            return Polyline::new(vec![grid.coord(first)]);
        }

        let start = self
            .points
            .iter()
            .copied()
            .find(|&p| grid.point(p).is_endpoint())
            .unwrap_or(first);

        let mut path = Vec::with_capacity(self.points.len());
        let mut prev: Option<PointId> = None;
        let mut current = start;
        loop {
            path.push(grid.coord(current));
            if path.len() == self.points.len() {
                break;
            }
            let Some(next) = grid.point(current).links().find(|&n| Some(n) != prev) else {
                break;
            };
            prev = Some(current);
            current = next;
        }
        Polyline::new(path)
    }
}
