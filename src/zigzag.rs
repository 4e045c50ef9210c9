//! Zigzag extraction of low-frequency coefficients

use crate::dct::Triangular;

/// Flatten the triangular matrix into a sequence ordered by ascending
/// anti-diagonal (total frequency), alternating traversal direction per
/// diagonal.
/// The output is capped at `ceil(size^2 / 2 + size / 2)` elements, which is
/// exactly the triangle population, so diagonals past the main anti-diagonal
/// are never read.
pub(crate) fn scan(matrix: &Triangular) -> Vec<f64> {
    let size = matrix.size();
    let cap = (size * size + size).div_ceil(2);
    let mut out = Vec::with_capacity(cap);
    let mut mode = 0;
    let mut lower = 0;
    for t in 0..(2 * size).saturating_sub(1) {
        let t1 = if t >= size {
            mode += 1;
            lower += 1;
            size - 1
        } else {
            lower = 0;
            t
        };
        for i in (lower..=t1).rev() {
            if out.len() >= cap {
                return out;
            }
            let (col, row) = if (t1 + mode) % 2 == 0 {
                (i, t1 + lower - i)
            } else {
                (t1 + lower - i, i)
            };
            if let Some(v) = matrix.get(col, row) {
                out.push(v);
            }
        }
    }
    out
}
