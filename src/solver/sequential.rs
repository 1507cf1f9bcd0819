//! Single-threaded reference solver
//!
//! The baseline every other strategy is compared against, both for runtime
//! and for cell values.

use crate::config::RunConfig;
use crate::grid::Grid;
use crate::solver::update_band;
use crate::util::time::Stopwatch;
use std::time::Duration;

/// Run the sequential Jacobi solver
///
/// Returns the iteration-phase wall-clock time and the final grid. Grids
/// too small to have an interior (`nx < 3` or `ny < 3`) come back seeded
/// but otherwise unchanged, with a near-zero runtime.
pub fn run(config: &RunConfig) -> (Duration, Grid) {
    let mut grid = config.build_grid();
    let mut staging = grid.clone();
    let (nx, ny) = (config.nx, config.ny);

    let timer = Stopwatch::start();
    if nx >= 3 && ny >= 3 {
        for _ in 0..config.iterations {
            staging.copy_cells_from(&grid);
            let interior = &mut staging.cells_mut()[ny..(nx - 1) * ny];
            update_band(&grid, interior, 1, nx - 2);
            std::mem::swap(&mut grid, &mut staging);
        }
    }
    (timer.elapsed(), grid)
}
