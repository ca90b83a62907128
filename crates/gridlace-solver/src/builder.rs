//! Chain-cover builder: greedy search that covers every grid point
//! with constraint-respecting chains.
//!
//! The builder owns its grid -- one driver per grid, enforced by
//! ownership -- and offers two execution modes over the same state:
//! [`build_chains`](ChainBuilder::build_chains) runs to completion,
//! [`build_step`](ChainBuilder::build_step) advances one externally
//! driven step at a time so a caller can interleave other work (for
//! example a redraw) between steps.
//!
//! Candidate scoring uses a small random tie-breaker. The randomness
//! never changes *which* candidates are valid, only which equally good
//! one wins, so repeated builds differ in structure but never in
//! validity. The generator is seedable via
//! [`with_seed`](ChainBuilder::with_seed) for reproducible runs.

use std::collections::HashSet;

use petgraph::unionfind::UnionFind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::chain::Chain;
use crate::grid::Grid;
use crate::stats::CoverageStats;
use crate::types::{ChainId, CoverError, PointId};

/// Outer-iteration budget for the batch build. Exhausting it with
/// points still unconnected is the fatal coverage failure.
const MAX_ATTEMPTS: usize = 1000;

/// Width of the uniform random tie-break added to candidate scores.
const TIE_BREAK_SPAN: f64 = 0.1;

/// Greedy chain-cover search over one owned grid.
pub struct ChainBuilder {
    grid: Grid,
    max_connections: usize,
    chains: Vec<Chain>,
    next_chain_id: u32,
    current: Option<Chain>,
    running: bool,
    rng: StdRng,
}

impl ChainBuilder {
    /// Create a builder over `grid` with the given per-chain
    /// connection cap, using an entropy-seeded tie-break generator.
    #[must_use]
    pub fn new(grid: Grid, max_connections: usize) -> Self {
        Self::with_rng(grid, max_connections, StdRng::from_entropy())
    }

    /// Create a builder with a fixed tie-break seed, for reproducible
    /// builds.
    #[must_use]
    pub fn with_seed(grid: Grid, max_connections: usize, seed: u64) -> Self {
        Self::with_rng(grid, max_connections, StdRng::seed_from_u64(seed))
    }

    fn with_rng(grid: Grid, max_connections: usize, rng: StdRng) -> Self {
        Self {
            grid,
            max_connections,
            chains: Vec::new(),
            next_chain_id: 0,
            current: None,
            running: false,
            rng,
        }
    }

    /// The grid being covered.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the grid, e.g. for constraint toggles between
    /// steps.
    pub const fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Consume the builder and return its grid.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// The per-chain connection cap.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Chains finalized so far, in build order.
    #[must_use]
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// The in-flight chain of a stepped build, if any.
    #[must_use]
    pub const fn current_chain(&self) -> Option<&Chain> {
        self.current.as_ref()
    }

    /// Cover the whole grid in one call.
    ///
    /// Resets the grid, then repeatedly seeds a chain at the
    /// unconnected point with the fewest unconnected neighbors and
    /// extends it until it is full or stuck, within a fixed attempt
    /// budget.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::Incomplete`] if points remain unconnected
    /// after the attempt budget. That signals a configuration problem
    /// -- constraints too strict or the connection cap too small --
    /// not a condition worth retrying blindly.
    pub fn build_chains(&mut self) -> Result<&[Chain], CoverError> {
        self.grid.reset_connections();
        self.chains.clear();
        self.next_chain_id = 0;
        self.current = None;
        self.running = false;

        let mut attempts = 0;
        while self.grid.unconnected_count() > 0 && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let Some(start) = self.select_start_point() else {
                break;
            };
            let mut chain = self.new_chain();
            // An unconnected seed is always accepted; a failure here
            // only burns an attempt.
            if chain.add_point(&mut self.grid, start).is_err() {
                continue;
            }
            self.extend_chain(&mut chain);
            if !chain.is_empty() {
                self.chains.push(chain);
            }
        }

        let unconnected = self.grid.unconnected_count();
        if unconnected > 0 {
            return Err(CoverError::Incomplete { unconnected });
        }
        Ok(&self.chains)
    }

    /// Begin a stepped build: resets the grid and arms
    /// [`build_step`](Self::build_step).
    pub fn start_animated_build(&mut self) {
        self.grid.reset_connections();
        self.chains.clear();
        self.next_chain_id = 0;
        self.current = None;
        self.running = true;
    }

    /// Advance a stepped build by one unit of work.
    ///
    /// Each step either seeds a new chain, extends the active chain by
    /// one point, or finalizes the active chain when no valid
    /// extension exists. Returns `true` while more work remains. This
    /// path never errors: a commit failure is simply "no valid
    /// extension" and finalizes the chain.
    pub fn build_step(&mut self) -> bool {
        if !self.running {
            return false;
        }

        match self.current.take() {
            None => {
                if let Some(start) = self.select_start_point() {
                    let mut chain = self.new_chain();
                    if chain.add_point(&mut self.grid, start).is_ok() {
                        self.current = Some(chain);
                        return true;
                    }
                }
                // Nothing left to seed: the build is complete.
                self.running = false;
                false
            }
            Some(mut chain) => {
                if !chain.is_full()
                    && let Some(next) = self.find_best_next_point(&chain)
                    && chain.add_point(&mut self.grid, next).is_ok()
                {
                    self.current = Some(chain);
                    return true;
                }

                // No valid extension: finalize and clear the slot.
                if !chain.is_empty() {
                    self.chains.push(chain);
                }
                let more = self.grid.unconnected_count() > 0;
                if !more {
                    self.running = false;
                }
                more
            }
        }
    }

    /// Whether a stepped build has finished: no active chain, nothing
    /// running, and every point connected.
    #[must_use]
    pub fn is_animation_complete(&self) -> bool {
        !self.running && self.current.is_none() && self.grid.unconnected_count() == 0
    }

    /// Coverage snapshot over the grid and the finalized chains.
    #[must_use]
    pub fn coverage_stats(&self) -> CoverageStats {
        CoverageStats::collect(&self.grid, &self.chains)
    }

    /// Whether the current result is a correct cover: every point
    /// connected, every chain structurally valid, no point claimed by
    /// more than one chain, and every chain's members linked into a
    /// single component.
    #[must_use]
    pub fn validate_solution(&self) -> bool {
        if self.grid.unconnected_count() > 0 {
            return false;
        }

        if !self.chains.iter().all(|c| c.is_valid_chain(&self.grid)) {
            return false;
        }

        let mut seen: HashSet<PointId> = HashSet::new();
        for chain in &self.chains {
            for &point in chain.points() {
                if !seen.insert(point) {
                    return false;
                }
            }
        }

        // Realized links must connect each chain's members into one
        // component; degree counting alone cannot see a chain split
        // across separate link groups.
        let mut components: UnionFind<usize> = UnionFind::new(self.grid.total_points());
        for id in self.grid.all_points() {
            for link in self.grid.point(id).links() {
                components.union(id.index(), link.index());
            }
        }
        for chain in &self.chains {
            if let Some((&first, rest)) = chain.points().split_first() {
                let root = components.find(first.index());
                if rest.iter().any(|&p| components.find(p.index()) != root) {
                    return false;
                }
            }
        }

        true
    }

    fn new_chain(&mut self) -> Chain {
        let chain = Chain::new(ChainId(self.next_chain_id), self.max_connections);
        self.next_chain_id += 1;
        chain
    }

    /// Among unconnected points, the one with the fewest unconnected
    /// neighbors; ties break to the first in row-major scan order.
    /// Points with few free neighbors are at risk of isolation, so
    /// they are connected first.
    fn select_start_point(&self) -> Option<PointId> {
        let mut best: Option<(PointId, usize)> = None;
        for point in self.grid.unconnected_points() {
            let free = self.unconnected_neighbor_count(point);
            match best {
                Some((_, fewest)) if free >= fewest => {}
                _ => best = Some((point, free)),
            }
        }
        best.map(|(point, _)| point)
    }

    fn extend_chain(&mut self, chain: &mut Chain) {
        while !chain.is_full() {
            let Some(next) = self.find_best_next_point(chain) else {
                break;
            };
            if chain.add_point(&mut self.grid, next).is_err() {
                break;
            }
        }
    }

    /// The best unconnected point the chain can take next, or `None`.
    ///
    /// Candidates must pass both the chain's structural acceptance and
    /// a constraint-valid connection to at least one open endpoint.
    /// With several candidates, the highest-scoring one wins; a single
    /// candidate skips scoring entirely.
    fn find_best_next_point(&mut self, chain: &Chain) -> Option<PointId> {
        if chain.is_empty() {
            return None;
        }

        let candidates: Vec<PointId> = self
            .grid
            .unconnected_points()
            .into_iter()
            .filter(|&p| {
                chain.can_add_point(&self.grid, p) && self.has_valid_endpoint_connection(chain, p)
            })
            .collect();

        match candidates.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => {
                let mut best: Option<PointId> = None;
                let mut best_score = f64::NEG_INFINITY;
                for &candidate in &candidates {
                    let score = self.score_point(candidate);
                    if score > best_score {
                        best_score = score;
                        best = Some(candidate);
                    }
                }
                best
            }
        }
    }

    /// Whether some open endpoint of the chain has a constraint-valid
    /// connection to `point`. Short-circuits on the first valid pair.
    fn has_valid_endpoint_connection(&self, chain: &Chain, point: PointId) -> bool {
        let target = self.grid.coord(point);
        chain.endpoints().iter().any(|&endpoint| {
            let end = self.grid.point(endpoint);
            end.can_accept_link()
                && end.coord().is_adjacent_to(target)
                && self.grid.validate_connection(endpoint, point)
        })
    }

    /// Strategic value of a candidate: its count of unconnected
    /// neighbors (higher keeps chains compact and reduces future
    /// isolation) plus a uniform tie-break in `[0, 0.1)`.
    #[allow(clippy::cast_precision_loss)]
    fn score_point(&mut self, point: PointId) -> f64 {
        let base = self.unconnected_neighbor_count(point) as f64;
        base + self.rng.gen_range(0.0..TIE_BREAK_SPAN)
    }

    fn unconnected_neighbor_count(&self, point: PointId) -> usize {
        self.grid
            .neighbors(point)
            .into_iter()
            .filter(|&n| !self.grid.point(n).is_connected())
            .count()
    }
}

impl std::fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("max_connections", &self.max_connections)
            .field("chains", &self.chains.len())
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}
