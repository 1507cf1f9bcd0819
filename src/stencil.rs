//! Pure Jacobi update over a chunk of grid rows
//!
//! The stencil is the one piece of arithmetic every strategy shares: the
//! sequential solver applies it to the whole interior, the threaded solver
//! to each band, and a remote worker to the rows it was assigned. Keeping
//! it a pure function of (chunk, halo rows) is what makes the
//! cross-strategy bit-for-bit equivalence hold: same inputs, same f64
//! operations, same order.

use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};

/// A dense row-major span of grid rows
///
/// Chunks travel inside protocol messages, so the shape is explicit rather
/// than inferred: a receiver can validate `cols` against its configured
/// grid width before touching the cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl Chunk {
    /// Zero-filled chunk
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    /// Build a chunk from row-major cells, validating the shape
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<f64>) -> Result<Self> {
        if cells.len() != rows * cols {
            bail!(
                "chunk of {} cells does not match shape {}x{}",
                cells.len(),
                rows,
                cols
            );
        }
        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Borrow row `i` as a slice
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    /// Flat view of all cells in row-major order
    #[inline]
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// True when the cell count matches the declared shape
    ///
    /// Deserialized chunks bypass `from_cells`, so receivers check this
    /// before doing row arithmetic on untrusted input.
    pub fn is_well_formed(&self) -> bool {
        self.cells.len() == self.rows * self.cols
    }
}

/// One Jacobi update of `chunk`, with `top` and `bottom` as halo rows
///
/// Each interior cell becomes the average of its four neighbors:
///
/// ```text
/// new[i][j] = 0.25 * (up[j] + down[j] + chunk[i][j-1] + chunk[i][j+1])
/// ```
///
/// where `up` is the row above (`top` for the chunk's first row) and `down`
/// the row below (`bottom` for its last). The first and last columns are
/// fixed borders and are copied through unchanged. The input chunk is never
/// mutated.
///
/// Callers supply halo rows of exactly `cols` cells. A chunk narrower than
/// three columns has no interior and comes back as an unmodified copy.
pub fn step(chunk: &Chunk, top: &[f64], bottom: &[f64]) -> Chunk {
    let rows = chunk.rows();
    let cols = chunk.cols();
    let mut next = chunk.clone();
    if cols < 3 {
        return next;
    }
    debug_assert_eq!(top.len(), cols);
    debug_assert_eq!(bottom.len(), cols);

    for i in 0..rows {
        let up = if i > 0 { chunk.row(i - 1) } else { top };
        let down = if i < rows - 1 { chunk.row(i + 1) } else { bottom };
        let cur = chunk.row(i);
        let out = &mut next.cells[i * cols..(i + 1) * cols];
        for j in 1..cols - 1 {
            out[j] = 0.25 * (up[j] + down[j] + cur[j - 1] + cur[j + 1]);
        }
    }
    next
}
