//! Multi-threaded solver over row bands
//!
//! The interior rows are split with the same partitioner the distributed
//! coordinator uses, and each band is recomputed by its own OS thread. The
//! source grid is frozen for the duration of an iteration (threads read it
//! shared, write only their disjoint staging band), so the result is
//! identical to the sequential solver's, cell for cell.

use crate::config::RunConfig;
use crate::grid::Grid;
use crate::partition::split_rows;
use crate::solver::update_band;
use crate::util::time::Stopwatch;
use std::time::Duration;

/// Default thread count: half the cores, at least one
pub fn default_threads() -> usize {
    (num_cpus::get() / 2).max(1)
}

/// Run the threaded Jacobi solver with `threads` worker threads
///
/// A thread count of zero is treated as one. Same degenerate-grid behavior
/// as the sequential solver: no interior, no work.
pub fn run(config: &RunConfig, threads: usize) -> (Duration, Grid) {
    let threads = threads.max(1);
    let mut grid = config.build_grid();
    let mut staging = grid.clone();
    let (nx, ny) = (config.nx, config.ny);

    let ranges = if nx >= 3 {
        split_rows(1, nx - 2, threads)
    } else {
        Vec::new()
    };

    let timer = Stopwatch::start();
    if nx >= 3 && ny >= 3 {
        for _ in 0..config.iterations {
            staging.copy_cells_from(&grid);

            let interior = &mut staging.cells_mut()[ny..(nx - 1) * ny];
            let bands = split_bands(interior, &ranges, ny);

            std::thread::scope(|scope| {
                for (band, &(row_start, row_end)) in bands.into_iter().zip(&ranges) {
                    let src = &grid;
                    scope.spawn(move || update_band(src, band, row_start, row_end));
                }
            });

            std::mem::swap(&mut grid, &mut staging);
        }
    }
    (timer.elapsed(), grid)
}

/// Carve the interior staging slice into one disjoint band per range
fn split_bands<'a>(
    mut interior: &'a mut [f64],
    ranges: &[(usize, usize)],
    ny: usize,
) -> Vec<&'a mut [f64]> {
    let mut bands = Vec::with_capacity(ranges.len());
    for &(row_start, row_end) in ranges {
        let len = (row_end - row_start + 1) * ny;
        let (band, rest) = interior.split_at_mut(len);
        bands.push(band);
        interior = rest;
    }
    bands
}
