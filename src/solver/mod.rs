//! Local solver strategies
//!
//! Two in-process strategies share this module: the single-threaded
//! reference solver and the row-banded threaded solver. Both follow the
//! same per-iteration discipline as the distributed coordinator:
//!
//! 1. copy the current grid into a staging buffer (keeps borders and any
//!    rows outside the interior untouched),
//! 2. recompute the interior into the staging buffer,
//! 3. swap the two buffers by exchanging ownership.
//!
//! The actual cell arithmetic lives in [`update_band`], written as the
//! exact same f64 expression the wire workers evaluate, so all three
//! strategies agree bit-for-bit.

pub mod sequential;
pub mod threaded;

use crate::grid::Grid;

/// Recompute rows `[row_start, row_end]` of `src` into `band`
///
/// `band` is the staging slice covering exactly those rows, already primed
/// with a copy of the current values (edge columns are left as copied).
/// Rows must be interior rows: `row_start >= 1` and `row_end <= nx - 2`.
pub(crate) fn update_band(src: &Grid, band: &mut [f64], row_start: usize, row_end: usize) {
    let ny = src.ny();
    debug_assert!(row_start >= 1 && row_end + 1 < src.nx());
    debug_assert_eq!(band.len(), (row_end - row_start + 1) * ny);

    for (bi, i) in (row_start..=row_end).enumerate() {
        let up = src.row(i - 1);
        let down = src.row(i + 1);
        let cur = src.row(i);
        let out = &mut band[bi * ny..(bi + 1) * ny];
        for j in 1..ny - 1 {
            out[j] = 0.25 * (up[j] + down[j] + cur[j - 1] + cur[j + 1]);
        }
    }
}
