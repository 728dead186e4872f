//! Dense multiply kernels over a block of rows.
//!
//! Both kernels take a block of A rows (`rows * n` values), the full B, and
//! the matching block of C. For every (i, j) the products are summed over
//! k = 0..n in ascending order, so the two variants produce bit-identical
//! results when C starts at zero.

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Validate block lengths and return the number of rows in the block.
fn block_rows(a_rows: &[f64], b: &[f64], c_rows: &[f64], n: usize) -> Result<usize> {
    if b.len() != n * n {
        return Err(MatrixError::LengthMismatch {
            what: "b",
            expected: n * n,
            got: b.len(),
        });
    }
    if n == 0 {
        return Ok(0);
    }
    if a_rows.len() % n != 0 {
        return Err(MatrixError::LengthMismatch {
            what: "a rows",
            expected: (a_rows.len() / n) * n,
            got: a_rows.len(),
        });
    }
    if c_rows.len() != a_rows.len() {
        return Err(MatrixError::LengthMismatch {
            what: "c rows",
            expected: a_rows.len(),
            got: c_rows.len(),
        });
    }
    Ok(a_rows.len() / n)
}

/// `C[i][j] += A[i][k] * B[k][j]` in i-k-j order.
///
/// Accumulates into `c_rows`; callers wanting a plain product must pass a
/// zeroed block.
pub fn multiply_rows_accumulate(
    a_rows: &[f64],
    b: &[f64],
    c_rows: &mut [f64],
    n: usize,
) -> Result<()> {
    let rows = block_rows(a_rows, b, c_rows, n)?;
    for i in 0..rows {
        let a_row = &a_rows[i * n..(i + 1) * n];
        let c_row = &mut c_rows[i * n..(i + 1) * n];
        for k in 0..n {
            let a_ik = a_row[k];
            let b_row = &b[k * n..(k + 1) * n];
            for j in 0..n {
                c_row[j] += a_ik * b_row[j];
            }
        }
    }
    Ok(())
}

/// `C[i][j] = Σ_k A[i][k] * B[k][j]` with a local accumulator per cell.
///
/// Overwrites `c_rows`.
pub fn multiply_rows_dot(a_rows: &[f64], b: &[f64], c_rows: &mut [f64], n: usize) -> Result<()> {
    let rows = block_rows(a_rows, b, c_rows, n)?;
    for j in 0..n {
        for i in 0..rows {
            let mut sum = 0.0f64;
            for k in 0..n {
                sum += a_rows[i * n + k] * b[k * n + j];
            }
            c_rows[i * n + j] = sum;
        }
    }
    Ok(())
}

/// Textbook single-threaded i-j-k multiply, used as the correctness baseline.
pub fn reference_multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let n = a.dim();
    if b.dim() != n {
        return Err(MatrixError::DimensionMismatch {
            expected: n,
            got: b.dim(),
        });
    }

    let (a, b_data) = (a.as_slice(), b.as_slice());
    let mut c = Matrix::zeros(n)?;
    let out = c.as_mut_slice();
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0f64;
            for k in 0..n {
                sum += a[i * n + k] * b_data[k * n + j];
            }
            out[i * n + j] = sum;
        }
    }
    Ok(c)
}
