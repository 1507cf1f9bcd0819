//! Contiguous row-range splitting
//!
//! Both the distributed coordinator and the threaded solver divide the
//! grid's interior rows with this one function, so a worker process and a
//! local thread always own the same rows for the same inputs.

/// Split the inclusive range `[start, end]` into `parts` contiguous pieces
///
/// The first `length % parts` pieces get one extra row, so sizes differ by
/// at most one. Pieces are returned in order, gap-free, covering the range
/// exactly. An empty range or a zero part count yields an empty vector, and
/// zero-size pieces are omitted: asking for more parts than rows returns
/// one single-row piece per row, fewer pieces than requested.
pub fn split_rows(start: usize, end: usize, parts: usize) -> Vec<(usize, usize)> {
    if end < start || parts == 0 {
        return Vec::new();
    }
    let length = end - start + 1;
    let base = length / parts;
    let remainder = length % parts;

    let mut ranges = Vec::with_capacity(parts.min(length));
    let mut next = start;
    for i in 0..parts {
        let size = if i < remainder { base + 1 } else { base };
        if size == 0 {
            continue;
        }
        ranges.push((next, next + size - 1));
        next += size;
    }
    ranges
}
