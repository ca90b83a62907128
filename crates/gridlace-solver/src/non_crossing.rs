//! Non-crossing constraint: no two realized connection segments may
//! intersect geometrically, except at a shared endpoint.
//!
//! The constraint keeps its own index of realized segments in an
//! R\*-tree, keyed by segment bounding box; a proposed segment is
//! checked only against tracked segments whose boxes intersect its own
//! (the cheap early-out), then against the exact parametric
//! segment-segment test. Segments that share an endpoint never count as
//! crossing -- that is a legitimate chain continuation.
//!
//! Only realized connections are tracked. The constraint does not
//! observe the grid; it relies on the engine's
//! [`on_connect`](crate::Constraint::on_connect) /
//! [`on_disconnect`](crate::Constraint::on_disconnect) notifications.

use geo::Line;
use rstar::primitives::GeomWithData;
use rstar::{RTree, RTreeObject};

use crate::constraint::{Constraint, ConstraintError};
use crate::grid::Grid;
use crate::types::{Coord, PointId};

/// Determinant magnitudes below this are treated as parallel lines.
const EPSILON: f64 = 1e-10;

/// A tracked segment: the geometry for the R-tree plus the normalized
/// integer endpoints for exact comparison and removal.
type TrackedSegment = GeomWithData<Line<f64>, (Coord, Coord)>;

/// Convert a grid coordinate to a `geo::Coord`.
fn coord_to_geo(c: Coord) -> geo::Coord<f64> {
    geo::Coord {
        x: f64::from(c.x),
        y: f64::from(c.y),
    }
}

/// Normalize a segment so `(a, b)` and `(b, a)` compare equal: the
/// lexicographically smaller endpoint comes first.
fn normalize(a: Coord, b: Coord) -> (Coord, Coord) {
    if a <= b { (a, b) } else { (b, a) }
}

fn tracked_segment(a: Coord, b: Coord) -> TrackedSegment {
    let (lo, hi) = normalize(a, b);
    GeomWithData::new(Line::new(coord_to_geo(lo), coord_to_geo(hi)), (lo, hi))
}

/// Whether two normalized segments share at least one endpoint.
fn shares_endpoint(s1: (Coord, Coord), s2: (Coord, Coord)) -> bool {
    let (p1, p2) = s1;
    let (p3, p4) = s2;
    p1 == p3 || p1 == p4 || p2 == p3 || p2 == p4
}

/// Exact segment-segment intersection via the parametric line
/// equations.
///
/// Non-parallel segments intersect iff both interpolation parameters
/// (solved with Cramer's rule) lie in the closed interval `[0, 1]`.
/// Near-zero determinants fall back to the collinear 1D overlap check.
fn segments_intersect(p1: Coord, p2: Coord, p3: Coord, p4: Coord) -> bool {
    let (x1, y1) = (f64::from(p1.x), f64::from(p1.y));
    let (x2, y2) = (f64::from(p2.x), f64::from(p2.y));
    let (x3, y3) = (f64::from(p3.x), f64::from(p3.y));
    let (x4, y4) = (f64::from(p4.x), f64::from(p4.y));

    let (dx1, dy1) = (x2 - x1, y2 - y1);
    let (dx2, dy2) = (x4 - x3, y4 - y3);

    let det = dx1.mul_add(dy2, -(dy1 * dx2));
    if det.abs() < EPSILON {
        return collinear_overlap(p1, p2, p3, p4);
    }

    let (dx3, dy3) = (x1 - x3, y1 - y3);
    let t1 = dx2.mul_add(dy3, -(dy2 * dx3)) / det;
    let t2 = dx1.mul_add(dy3, -(dy1 * dx3)) / det;

    (0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2)
}

/// 1D overlap check for parallel/collinear segments: project both onto
/// whichever axis spans more of the first segment and compare the
/// resulting intervals. Touching intervals count as overlapping.
fn collinear_overlap(p1: Coord, p2: Coord, p3: Coord, p4: Coord) -> bool {
    let (min1, max1, min2, max2) = if p1.x.abs_diff(p2.x) >= p1.y.abs_diff(p2.y) {
        (
            p1.x.min(p2.x),
            p1.x.max(p2.x),
            p3.x.min(p4.x),
            p3.x.max(p4.x),
        )
    } else {
        (
            p1.y.min(p2.y),
            p1.y.max(p2.y),
            p3.y.min(p4.y),
            p3.y.max(p4.y),
        )
    };
    max1 >= min2 && max2 >= min1
}

/// Prevents realized connection segments from crossing each other.
///
/// Enabled by default on every grid.
pub struct NonCrossing {
    segments: RTree<TrackedSegment>,
}

impl NonCrossing {
    /// Registration name of this constraint.
    pub const NAME: &'static str = "non-crossing";

    /// Create the constraint with an empty segment index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: RTree::new(),
        }
    }

    /// Number of segments currently tracked.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.segments.size()
    }
}

impl Default for NonCrossing {
    fn default() -> Self {
        Self::new()
    }
}

impl Constraint for NonCrossing {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> String {
        "prevents chains from crossing each other geometrically".to_string()
    }

    fn check(&self, grid: &Grid, a: PointId, b: PointId) -> Result<bool, ConstraintError> {
        let proposed = normalize(grid.coord(a), grid.coord(b));
        let line = Line::new(coord_to_geo(proposed.0), coord_to_geo(proposed.1));

        for existing in self.segments.locate_in_envelope_intersecting(&line.envelope()) {
            if shares_endpoint(proposed, existing.data) {
                continue;
            }
            let (q1, q2) = existing.data;
            if segments_intersect(proposed.0, proposed.1, q1, q2) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn on_connect(&mut self, a: Coord, b: Coord) {
        self.segments.insert(tracked_segment(a, b));
    }

    fn on_disconnect(&mut self, a: Coord, b: Coord) {
        let _ = self.segments.remove(&tracked_segment(a, b));
    }

    fn on_reset(&mut self) {
        self.segments = RTree::new();
    }
}
