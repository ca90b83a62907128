//! Coverage statistics: a serializable numeric snapshot of build
//! progress, suitable for display or JSON export.

use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::grid::Grid;

/// Snapshot of how much of a grid the finalized chains cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Total number of points on the grid.
    pub total_points: usize,
    /// Points claimed by a chain.
    pub connected_points: usize,
    /// Points not yet claimed.
    pub unconnected_points: usize,
    /// Connected points as a percentage of the total (`0.0..=100.0`).
    pub coverage_percentage: f64,
    /// Number of finalized chains.
    pub total_chains: usize,
    /// Mean chain length, in connections.
    pub average_chain_length: f64,
}

impl CoverageStats {
    /// Collect a snapshot from a grid and its finalized chains.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn collect(grid: &Grid, chains: &[Chain]) -> Self {
        let total_points = grid.total_points();
        let connected_points = grid.connected_count();
        let unconnected_points = total_points - connected_points;

        let coverage_percentage = if total_points == 0 {
            0.0
        } else {
            connected_points as f64 / total_points as f64 * 100.0
        };

        let average_chain_length = if chains.is_empty() {
            0.0
        } else {
            let total_length: usize = chains.iter().map(Chain::length).sum();
            total_length as f64 / chains.len() as f64
        };

        Self {
            total_points,
            connected_points,
            unconnected_points,
            coverage_percentage,
            total_chains: chains.len(),
            average_chain_length,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fresh_grid_has_zero_coverage() {
        let grid = Grid::new(3, 3).unwrap();
        let stats = CoverageStats::collect(&grid, &[]);
        assert_eq!(stats.total_points, 9);
        assert_eq!(stats.connected_points, 0);
        assert_eq!(stats.unconnected_points, 9);
        assert!((stats.coverage_percentage - 0.0).abs() < f64::EPSILON);
        assert_eq!(stats.total_chains, 0);
        assert!((stats.average_chain_length - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_coverage_percentage() {
        let mut grid = Grid::new(2, 2).unwrap();
        let (a, b) = (grid.point_id(0, 0).unwrap(), grid.point_id(0, 1).unwrap());
        let mut chain = Chain::new(crate::types::ChainId(0), 3);
        chain.add_point(&mut grid, a).unwrap();
        chain.add_point(&mut grid, b).unwrap();

        let chains = vec![chain];
        let stats = CoverageStats::collect(&grid, &chains);
        assert_eq!(stats.connected_points, 2);
        assert_eq!(stats.unconnected_points, 2);
        assert!((stats.coverage_percentage - 50.0).abs() < 1e-9);
        assert_eq!(stats.total_chains, 1);
        assert!((stats.average_chain_length - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_round_trip() {
        let grid = Grid::new(1, 2).unwrap();
        let stats = CoverageStats::collect(&grid, &[]);
        let json = serde_json::to_string(&stats).unwrap();
        let deserialized: CoverageStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, deserialized);
    }
}
