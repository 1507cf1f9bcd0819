//! Grid storage and hot-region seeding
//!
//! The simulation state is a dense row-major matrix of f64 cells. Both the
//! local solvers and the distributed coordinator keep two grids alive (the
//! current state and a staging buffer) and exchange them after every
//! iteration by swapping ownership, never by copying cells.

use crate::Result;
use anyhow::bail;

/// Dense row-major nx x ny matrix of cells
///
/// Row `i` occupies the flat range `[i * ny, (i + 1) * ny)`, so any span of
/// whole rows is a single contiguous slice. That property is what lets the
/// coordinator lift a worker's rows straight out of (and back into) the
/// buffer without per-cell indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Create a zero-filled grid with `nx` rows and `ny` columns
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            data: vec![0.0; nx * ny],
        }
    }

    /// Number of rows
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of columns
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.ny + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.ny + col] = value;
    }

    /// Borrow row `i` as a slice
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.ny..(i + 1) * self.ny]
    }

    /// Borrow the inclusive row span `[row_start, row_end]` as one slice
    pub fn rows(&self, row_start: usize, row_end: usize) -> &[f64] {
        &self.data[row_start * self.ny..(row_end + 1) * self.ny]
    }

    /// Overwrite the rows starting at `row_start` with `cells`
    ///
    /// `cells` must hold a whole number of rows and stay within the grid.
    pub fn write_rows(&mut self, row_start: usize, cells: &[f64]) -> Result<()> {
        if cells.len() % self.ny != 0 {
            bail!(
                "row data of {} cells is not a multiple of the row width {}",
                cells.len(),
                self.ny
            );
        }
        let begin = row_start * self.ny;
        let end = begin + cells.len();
        if end > self.data.len() {
            bail!(
                "rows starting at {} overrun the grid ({} rows total)",
                row_start,
                self.nx
            );
        }
        self.data[begin..end].copy_from_slice(cells);
        Ok(())
    }

    /// Copy every cell of `other` into `self`
    ///
    /// Used to refresh the staging buffer at the top of each iteration so
    /// that borders and unowned rows carry over unchanged. Both grids must
    /// share a shape.
    pub fn copy_cells_from(&mut self, other: &Grid) {
        debug_assert_eq!(self.nx, other.nx);
        debug_assert_eq!(self.ny, other.ny);
        self.data.copy_from_slice(&other.data);
    }

    /// Flat view of all cells in row-major order
    #[inline]
    pub fn cells(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat view, for solvers that update bands in place
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Smallest and largest cell value, for the end-of-run summary
    pub fn min_max(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.data {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        if self.data.is_empty() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

/// Inclusive rectangle of cells preset to a fixed value before iteration 0
///
/// Seeding happens once; afterwards the hot cells diffuse like any other
/// interior cell. Only the outer borders stay fixed during iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotRegion {
    pub row0: usize,
    pub row1: usize,
    pub col0: usize,
    pub col1: usize,
    pub value: f64,
}

impl HotRegion {
    /// The default hot region: a centered square per dimension
    ///
    /// The side is `max(1, floor(dim * fraction))`, anchored so the square
    /// sits in the middle of the grid.
    pub fn centered(nx: usize, ny: usize, fraction: f64, value: f64) -> Self {
        let side_rows = ((nx as f64 * fraction) as usize).max(1);
        let side_cols = ((ny as f64 * fraction) as usize).max(1);
        let row0 = (nx.saturating_sub(side_rows)) / 2;
        let col0 = (ny.saturating_sub(side_cols)) / 2;
        Self {
            row0,
            row1: row0 + side_rows - 1,
            col0,
            col1: col0 + side_cols - 1,
            value,
        }
    }

    /// Stamp the region onto the grid, clamping coordinates into bounds
    ///
    /// Every coordinate is clamped to the last valid index rather than
    /// rejected, so a rectangle reaching past the edge stamps up to the
    /// edge. An inverted rectangle (start past end) stamps nothing.
    pub fn apply(&self, grid: &mut Grid) {
        if grid.nx() == 0 || grid.ny() == 0 {
            return;
        }
        let row0 = self.row0.min(grid.nx() - 1);
        let row1 = self.row1.min(grid.nx() - 1);
        let col0 = self.col0.min(grid.ny() - 1);
        let col1 = self.col1.min(grid.ny() - 1);
        for i in row0..=row1 {
            for j in col0..=col1 {
                grid.set(i, j, self.value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_zero_filled() {
        let grid = Grid::new(4, 6);
        assert_eq!(grid.nx(), 4);
        assert_eq!(grid.ny(), 6);
        assert!(grid.cells().iter().all(|&v| v == 0.0));
        assert_eq!(grid.cells().len(), 24);
    }

    #[test]
    fn test_row_major_indexing() {
        let mut grid = Grid::new(3, 4);
        grid.set(1, 2, 7.5);
        assert_eq!(grid.get(1, 2), 7.5);
        assert_eq!(grid.row(1), &[0.0, 0.0, 7.5, 0.0]);
        assert_eq!(grid.cells()[1 * 4 + 2], 7.5);
    }

    #[test]
    fn test_rows_span_is_contiguous() {
        let mut grid = Grid::new(4, 3);
        for i in 0..4 {
            for j in 0..3 {
                grid.set(i, j, (i * 3 + j) as f64);
            }
        }
        let span = grid.rows(1, 2);
        assert_eq!(span, &[3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_write_rows_round_trips() {
        let mut grid = Grid::new(4, 3);
        grid.write_rows(1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(grid.row(0), &[0.0, 0.0, 0.0]);
        assert_eq!(grid.row(1), &[1.0, 2.0, 3.0]);
        assert_eq!(grid.row(2), &[4.0, 5.0, 6.0]);
        assert_eq!(grid.row(3), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_write_rows_rejects_ragged_or_overrunning_data() {
        let mut grid = Grid::new(3, 3);
        assert!(grid.write_rows(0, &[1.0, 2.0]).is_err());
        assert!(grid.write_rows(2, &[0.0; 6]).is_err());
    }

    #[test]
    fn test_min_max() {
        let mut grid = Grid::new(2, 2);
        grid.set(0, 1, -3.5);
        grid.set(1, 0, 12.25);
        assert_eq!(grid.min_max(), (-3.5, 12.25));
    }

    #[test]
    fn test_hot_region_stamps_inclusive_rectangle() {
        let mut grid = Grid::new(5, 5);
        HotRegion {
            row0: 1,
            row1: 2,
            col0: 3,
            col1: 4,
            value: 9.0,
        }
        .apply(&mut grid);

        let mut stamped = 0;
        for i in 0..5 {
            for j in 0..5 {
                if (1..=2).contains(&i) && (3..=4).contains(&j) {
                    assert_eq!(grid.get(i, j), 9.0);
                    stamped += 1;
                } else {
                    assert_eq!(grid.get(i, j), 0.0);
                }
            }
        }
        assert_eq!(stamped, 4);
    }

    #[test]
    fn test_hot_region_clamps_out_of_bounds_coordinates() {
        let mut grid = Grid::new(4, 4);
        HotRegion {
            row0: 2,
            row1: 99,
            col0: 2,
            col1: 99,
            value: 5.0,
        }
        .apply(&mut grid);

        assert_eq!(grid.get(2, 2), 5.0);
        assert_eq!(grid.get(3, 3), 5.0);
        assert_eq!(grid.get(1, 1), 0.0);
    }

    #[test]
    fn test_hot_region_past_the_edge_stamps_the_edge() {
        // Both endpoints clamp to the last index, leaving a 1x1 stamp.
        let mut grid = Grid::new(3, 3);
        HotRegion {
            row0: 10,
            row1: 12,
            col0: 10,
            col1: 12,
            value: 5.0,
        }
        .apply(&mut grid);
        assert_eq!(grid.get(2, 2), 5.0);
        let stamped = grid.cells().iter().filter(|&&v| v != 0.0).count();
        assert_eq!(stamped, 1);
    }

    #[test]
    fn test_hot_region_inverted_rectangle_stamps_nothing() {
        let mut grid = Grid::new(5, 5);
        HotRegion {
            row0: 3,
            row1: 1,
            col0: 0,
            col1: 4,
            value: 5.0,
        }
        .apply(&mut grid);
        assert!(grid.cells().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_centered_region_default_fraction() {
        // A 200-wide dimension at fraction 0.1 yields a 20-cell side
        // anchored at 90.
        let hot = HotRegion::centered(200, 200, 0.1, 100.0);
        assert_eq!((hot.row0, hot.row1), (90, 109));
        assert_eq!((hot.col0, hot.col1), (90, 109));
        assert_eq!(hot.value, 100.0);
    }

    #[test]
    fn test_centered_region_never_collapses_below_one_cell() {
        let hot = HotRegion::centered(5, 5, 0.1, 100.0);
        assert_eq!((hot.row0, hot.row1), (2, 2));
        assert_eq!((hot.col0, hot.col1), (2, 2));
    }

    #[test]
    fn test_buffer_swap_is_ownership_exchange() {
        let mut a = Grid::new(2, 2);
        let mut b = Grid::new(2, 2);
        a.set(0, 0, 1.0);
        b.set(1, 1, 2.0);

        let a_ptr = a.cells().as_ptr();
        let b_ptr = b.cells().as_ptr();
        std::mem::swap(&mut a, &mut b);

        assert_eq!(a.get(1, 1), 2.0);
        assert_eq!(b.get(0, 0), 1.0);
        // The allocations themselves moved; no cells were copied.
        assert_eq!(a.cells().as_ptr(), b_ptr);
        assert_eq!(b.cells().as_ptr(), a_ptr);
    }
}
