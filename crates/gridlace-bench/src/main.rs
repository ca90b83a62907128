//! gridlace-bench: CLI tool for solver parameter experimentation.
//!
//! Runs the chain-cover solver on a grid of the given size with
//! configurable parameters, printing coverage statistics. Useful for:
//!
//! - Comparing constraint setups (crossing allowed vs. forbidden,
//!   distance bounds)
//! - Measuring chain count and mean chain length across caps and seeds
//! - Checking which configurations fail to cover within the attempt
//!   budget
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin gridlace-bench -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use clap::Parser;
use gridlace_solver::{ChainBuilder, Grid, MaxDistance, MinDistance, NonCrossing};

/// Solver parameter experimentation for gridlace.
///
/// Covers a grid with chains under the configured constraints and
/// prints per-run coverage statistics.
#[derive(Parser)]
#[command(name = "gridlace-bench", version)]
struct Cli {
    /// Number of grid rows.
    #[arg(long, default_value_t = 10, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    rows: u32,

    /// Number of grid columns.
    #[arg(long, default_value_t = 10, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    cols: u32,

    /// Maximum connections per chain.
    #[arg(long, default_value_t = 5)]
    max_connections: usize,

    /// Tie-break seed. Subsequent runs use consecutive seeds. Omit for
    /// entropy seeding.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the non-crossing constraint.
    #[arg(long)]
    allow_crossing: bool,

    /// Enable the max-distance constraint with this limit.
    #[arg(long)]
    max_distance: Option<f64>,

    /// Enable the min-distance constraint with this requirement.
    #[arg(long)]
    min_distance: Option<f64>,

    /// Number of runs.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<u64>::new().range(1..))]
    runs: u64,

    /// Output statistics as JSON lines instead of a human-readable
    /// report.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    for run_idx in 0..cli.runs {
        let grid = build_grid(cli).map_err(|e| e.to_string())?;
        let mut builder = match cli.seed {
            Some(seed) => {
                ChainBuilder::with_seed(grid, cli.max_connections, seed.wrapping_add(run_idx))
            }
            None => ChainBuilder::new(grid, cli.max_connections),
        };

        builder.build_chains().map_err(|e| e.to_string())?;
        let stats = builder.coverage_stats();

        if cli.json {
            let line = serde_json::to_string(&stats).map_err(|e| e.to_string())?;
            println!("{line}");
        } else {
            print_report(cli, run_idx, &builder);
        }
    }
    Ok(())
}

fn build_grid(cli: &Cli) -> Result<Grid, gridlace_solver::CoverError> {
    let mut grid = Grid::new(cli.rows, cli.cols)?;
    if cli.allow_crossing {
        grid.disable_constraint(NonCrossing::NAME);
    }
    if let Some(limit) = cli.max_distance {
        grid.remove_constraint(MaxDistance::NAME);
        grid.add_constraint(Box::new(MaxDistance::new(limit)), true)?;
    }
    if let Some(limit) = cli.min_distance {
        grid.remove_constraint(MinDistance::NAME);
        grid.add_constraint(Box::new(MinDistance::new(limit)), true)?;
    }
    Ok(grid)
}

fn print_report(cli: &Cli, run_idx: u64, builder: &ChainBuilder) {
    let stats = builder.coverage_stats();
    println!(
        "run {} on {}x{} (cap {}):",
        run_idx + 1,
        cli.rows,
        cli.cols,
        cli.max_connections,
    );
    println!("  chains:      {}", stats.total_chains);
    println!("  avg length:  {:.2}", stats.average_chain_length);
    println!(
        "  coverage:    {:.1}% ({}/{})",
        stats.coverage_percentage, stats.connected_points, stats.total_points,
    );
    println!(
        "  constraints: {}/{} enabled",
        builder.grid().enabled_constraint_count(),
        builder.grid().constraint_count(),
    );
    println!(
        "  solution:    {}",
        if builder.validate_solution() {
            "valid"
        } else {
            "INVALID"
        },
    );
}
