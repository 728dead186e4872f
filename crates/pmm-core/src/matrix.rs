use std::ops::Range;

use rand::Rng;

use crate::error::{MatrixError, Result};

/// A square N×N matrix of f64 values.
///
/// Storage is a single contiguous row-major buffer, so row `i` occupies
/// `data[i * n..(i + 1) * n]` and any run of consecutive rows is itself a
/// contiguous slice. Both engines rely on this to hand out row blocks
/// without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

/// Allocate a zero-filled buffer of `n * n` elements.
///
/// Reserves the full capacity up front so an oversized request fails here
/// instead of part-way through a multiply.
fn alloc_zeroed(n: usize) -> Result<Vec<f64>> {
    let len = n.checked_mul(n).ok_or(MatrixError::Allocation { n })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| MatrixError::Allocation { n })?;
    data.resize(len, 0.0);
    Ok(data)
}

impl Matrix {
    /// Create a zero-filled N×N matrix.
    pub fn zeros(n: usize) -> Result<Self> {
        Ok(Matrix {
            n,
            data: alloc_zeroed(n)?,
        })
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Errors
    /// Returns [`MatrixError::LengthMismatch`] if `data.len() != n * n`.
    pub fn from_vec(n: usize, data: Vec<f64>) -> Result<Self> {
        let expected = n.checked_mul(n).ok_or(MatrixError::Allocation { n })?;
        if data.len() != expected {
            return Err(MatrixError::LengthMismatch {
                what: "matrix data",
                expected,
                got: data.len(),
            });
        }
        Ok(Matrix { n, data })
    }

    /// Build a matrix by evaluating `f(i, j)` for every cell.
    pub fn from_fn<F>(n: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut m = Matrix::zeros(n)?;
        for i in 0..n {
            for j in 0..n {
                m.data[i * n + j] = f(i, j);
            }
        }
        Ok(m)
    }

    /// Fill a matrix with values drawn from {0.0, 0.5, ..., 4.5}.
    ///
    /// Each element is `(r mod 10) / 2` for a uniform integer `r`.
    pub fn random_halves<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Self> {
        let mut m = Matrix::zeros(n)?;
        for v in m.data.iter_mut() {
            *v = rng.gen_range(0..10u32) as f64 / 2.0;
        }
        Ok(m)
    }

    /// Matrix dimension N.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Flat offset of cell (i, j).
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    /// Returns the value at (i, j).
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "({i}, {j}) out of bounds for n={}", self.n);
        self.data[self.index(i, j)]
    }

    /// Sets the value at (i, j).
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.n && j < self.n, "({i}, {j}) out of bounds for n={}", self.n);
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    /// Row `i` as a slice of length N.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    fn check_rows(&self, rows: &Range<usize>) -> Result<()> {
        if rows.start > rows.end || rows.end > self.n {
            return Err(MatrixError::RowsOutOfBounds {
                start: rows.start,
                end: rows.end,
                n: self.n,
            });
        }
        Ok(())
    }

    /// The contiguous block covering `rows`, `rows.len() * N` elements long.
    pub fn rows(&self, rows: Range<usize>) -> Result<&[f64]> {
        self.check_rows(&rows)?;
        Ok(&self.data[rows.start * self.n..rows.end * self.n])
    }

    /// Mutable access to the contiguous block covering `rows`.
    pub fn rows_mut(&mut self, rows: Range<usize>) -> Result<&mut [f64]> {
        self.check_rows(&rows)?;
        Ok(&mut self.data[rows.start * self.n..rows.end * self.n])
    }

    /// The whole backing buffer in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the matrix and return its backing buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Largest absolute element-wise difference to `other`.
    ///
    /// # Errors
    /// Returns [`MatrixError::DimensionMismatch`] if the dimensions differ.
    pub fn max_abs_diff(&self, other: &Matrix) -> Result<f64> {
        if self.n != other.n {
            return Err(MatrixError::DimensionMismatch {
                expected: self.n,
                got: other.n,
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max))
    }
}
