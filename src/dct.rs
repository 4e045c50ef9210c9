//! Truncated two-dimensional DCT-II

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::grid::LumaGrid;

/// Orthonormal DCT-II basis for a fixed transform length, truncated to the
/// low-frequency rows the zigzag scan visits.
/// Derived once from the closed form and never mutated afterwards.
pub(crate) struct Basis {
    /// Transform length, the grid side
    len: usize,
    /// Retained low-frequency bin count
    bins: usize,
    /// Row-major `bins x len` cosine table
    table: Vec<f64>,
    /// Orthonormalization factor `sqrt(2/len)`
    scale: f64,
}

impl Basis {
    /// Derive the cosine table `cos(pi * i * (2j + 1) / (2 * len))` for
    /// transform length `len`, truncated to `bins` rows
    #[expect(clippy::cast_precision_loss)]
    pub(crate) fn new(len: usize, bins: usize) -> Self {
        debug_assert!(bins <= len);
        let denom = 2.0 * len as f64;
        let mut table = Vec::with_capacity(bins * len);
        for i in 0..bins {
            for j in 0..len {
                table.push((PI * i as f64 * (2 * j + 1) as f64 / denom).cos());
            }
        }
        Self {
            len,
            bins,
            table,
            scale: (2.0 / len as f64).sqrt(),
        }
    }

    /// Transform length the basis was built for
    pub(crate) fn transform_len(&self) -> usize {
        self.len
    }

    /// 1D forward DCT-II of `input`, truncated to `count` coefficients,
    /// appended to `out`
    fn forward_into(&self, input: &[f64], count: usize, out: &mut Vec<f64>) {
        debug_assert_eq!(input.len(), self.len);
        for (i, basis_row) in self.table.chunks_exact(self.len).take(count).enumerate() {
            let mut sum: f64 = basis_row.iter().zip(input).map(|(b, v)| b * v).sum();
            sum *= self.scale;
            if i == 0 {
                sum *= FRAC_1_SQRT_2;
            }
            out.push(sum);
        }
    }

    /// Reduce a grid to the triangular matrix of low-frequency 2D coefficients.
    ///
    /// The grid is centered on its mean first: that only moves the overall DC
    /// term, which is discarded downstream, and guarantees a flat grid comes
    /// out as exactly zero coefficients instead of summation noise.
    pub(crate) fn transform(&self, grid: &LumaGrid) -> Triangular {
        debug_assert_eq!(grid.size(), self.len);
        let mean = grid.mean();

        // Row pass: each grid row reduces to `bins` coefficients
        let mut row_coeffs = Vec::with_capacity(self.len * self.bins);
        let mut input = vec![0.0; self.len];
        for row in grid.rows() {
            for (dst, src) in input.iter_mut().zip(row) {
                *dst = f64::from(*src) - mean;
            }
            self.forward_into(&input, self.bins, &mut row_coeffs);
        }

        // Column pass, truncated one coefficient shorter per column: entries
        // at diagonal index >= `bins` are never scanned, so never computed
        let mut values = Vec::with_capacity(Triangular::arena_len(self.bins));
        for x in 0..self.bins {
            for (dst, src) in input
                .iter_mut()
                .zip(row_coeffs.iter().skip(x).step_by(self.bins))
            {
                *dst = *src;
            }
            self.forward_into(&input, self.bins - x, &mut values);
        }
        Triangular {
            size: self.bins,
            values,
        }
    }

    #[cfg(test)]
    pub(crate) fn at(&self, row: usize, col: usize) -> f64 {
        self.table[row * self.len + col]
    }
}

/// Ragged low-frequency coefficient matrix where column `x` holds exactly
/// `size - x` entries, stored as a flat arena with triangular offsets
pub(crate) struct Triangular {
    /// Column count
    size: usize,
    /// Column-major arena, column `x` starting at offset `x * (2 * size - x + 1) / 2`
    values: Vec<f64>,
}

impl Triangular {
    /// Total entry count of a `size`-column matrix
    pub(crate) fn arena_len(size: usize) -> usize {
        size * (size + 1) / 2
    }

    /// Column count
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Entry at `col`/`row`, or None outside the triangle
    pub(crate) fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.size || row >= self.size - col {
            return None;
        }
        self.values.get(col * (2 * self.size - col + 1) / 2 + row).copied()
    }

    #[cfg(test)]
    pub(crate) fn from_columns(columns: &[Vec<f64>]) -> Self {
        let size = columns.len();
        for (x, column) in columns.iter().enumerate() {
            assert_eq!(column.len(), size - x);
        }
        Self {
            size,
            values: columns.iter().flatten().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_basis_row_is_all_ones() {
        let basis = Basis::new(32, 11);
        for j in 0..32 {
            assert!((basis.at(0, j) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn basis_matches_double_precision_reference() {
        // Literal values from an independent double precision table
        let basis = Basis::new(32, 11);
        let reference = [
            (1, 0, 0.99879546),
            (1, 31, -0.99879546),
            (2, 7, 0.09801714),
            (4, 1, 0.83146961),
            (8, 0, 0.92387953),
            (10, 1, 0.09801714),
        ];
        for (row, col, expected) in reference {
            assert!(
                (basis.at(row, col) - expected).abs() < 1e-6,
                "basis[{row}][{col}]"
            );
        }
    }

    #[test]
    #[expect(clippy::float_cmp)]
    fn uniform_grid_transforms_to_exact_zeros() {
        let basis = Basis::new(32, 11);
        let grid = LumaGrid::from_raw(32, vec![128; 32 * 32]).unwrap();
        let coeffs = basis.transform(&grid);
        for col in 0..11 {
            for row in 0..(11 - col) {
                assert_eq!(coeffs.get(col, row).unwrap(), 0.0, "coeff[{col}][{row}]");
            }
        }
    }

    #[test]
    fn triangular_columns_shrink() {
        let basis = Basis::new(32, 11);
        let pixels = (0..32 * 32).map(|i| u8::try_from(i % 251).unwrap()).collect();
        let grid = LumaGrid::from_raw(32, pixels).unwrap();
        let coeffs = basis.transform(&grid);
        assert_eq!(coeffs.size(), 11);
        for col in 0..11 {
            assert!(coeffs.get(col, 11 - col - 1).is_some());
            assert!(coeffs.get(col, 11 - col).is_none());
        }
        assert!(coeffs.get(11, 0).is_none());
    }
}
