//! Least-squares kernel on `nalgebra` dense matrices.
//!
//! Each design is column-equilibrated before its singular value
//! decomposition, so rank detection does not depend on the units a column
//! is measured in.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Singular values of the equilibrated design below this fraction of the
/// largest one count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

const MAX_SVD_ITERATIONS: usize = 10_000;

#[derive(Debug, Error, PartialEq)]
pub enum LinalgError {
    #[error("dimension mismatch: {0}")]
    Dimension(String),

    #[error("rank {rank} of {cols} columns")]
    RankDeficient { rank: usize, cols: usize },

    #[error("singular value decomposition did not converge")]
    Decomposition,
}

/// Build an `n x columns.len()` matrix from equally long columns.
///
/// # Errors
///
/// Returns [`LinalgError::Dimension`] if the columns differ in length.
pub fn from_columns(columns: &[&[f64]]) -> Result<DMatrix<f64>, LinalgError> {
    let rows = columns.first().map_or(0, |c| c.len());
    if let Some(bad) = columns.iter().position(|c| c.len() != rows) {
        return Err(LinalgError::Dimension(format!(
            "column {bad} has {} rows, expected {rows}",
            columns[bad].len()
        )));
    }
    Ok(DMatrix::from_fn(rows, columns.len(), |i, j| columns[j][i]))
}

/// Thin SVD of a full-rank design, kept for solving and projecting.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    u: DMatrix<f64>,
    singular: DVector<f64>,
    v_t: DMatrix<f64>,
    scale: DVector<f64>,
}

impl LeastSquares {
    /// Decompose `x`.
    ///
    /// # Errors
    ///
    /// - [`LinalgError::Dimension`] if `x` has fewer rows than columns.
    /// - [`LinalgError::RankDeficient`] if the equilibrated design has a
    ///   singular value below the relative tolerance.
    /// - [`LinalgError::Decomposition`] if the SVD does not converge.
    pub fn new(x: &DMatrix<f64>) -> Result<Self, LinalgError> {
        let (rows, cols) = x.shape();
        if rows < cols {
            return Err(LinalgError::Dimension(format!(
                "{rows} rows cannot determine {cols} columns"
            )));
        }

        // All-zero columns keep unit scale and fail the rank check below.
        let scale = DVector::from_fn(cols, |j, _| {
            let norm = x.column(j).norm();
            if norm > 0.0 {
                norm
            } else {
                1.0
            }
        });
        let equilibrated = DMatrix::from_fn(rows, cols, |i, j| x[(i, j)] / scale[j]);

        let svd = equilibrated
            .try_svd(true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
            .ok_or(LinalgError::Decomposition)?;
        let largest = svd.singular_values.iter().copied().fold(0.0, f64::max);
        let rank = svd
            .singular_values
            .iter()
            .filter(|s| **s > RANK_TOLERANCE * largest)
            .count();
        if rank < cols {
            return Err(LinalgError::RankDeficient { rank, cols });
        }

        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            return Err(LinalgError::Decomposition);
        };
        Ok(Self {
            u,
            singular: svd.singular_values,
            v_t,
            scale,
        })
    }

    /// Coefficients minimizing `|y - X b|` on the original column scale.
    #[must_use]
    pub fn solve(&self, y: &DVector<f64>) -> DVector<f64> {
        let rotated = self.u.tr_mul(y).component_div(&self.singular);
        self.v_t.tr_mul(&rotated).component_div(&self.scale)
    }

    /// `(X'X)^-1` on the original column scale.
    #[must_use]
    pub fn gram_inverse(&self) -> DMatrix<f64> {
        let p = self.scale.len();
        let weighted = DMatrix::from_fn(p, p, |i, j| {
            self.v_t[(j, i)] / (self.singular[j] * self.singular[j])
        });
        let inner = weighted * &self.v_t;
        DMatrix::from_fn(p, p, |i, j| inner[(i, j)] / (self.scale[i] * self.scale[j]))
    }

    /// Orthogonal projection of the columns of `m` onto the column space of
    /// the design.
    #[must_use]
    pub fn project(&self, m: &DMatrix<f64>) -> DMatrix<f64> {
        &self.u * self.u.tr_mul(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &DMatrix<f64>, b: &DMatrix<f64>, tol: f64) -> bool {
        a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tol)
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        let err = from_columns(&[&[1.0, 2.0], &[1.0]]).unwrap_err();
        assert!(matches!(err, LinalgError::Dimension(_)));
    }

    #[test]
    fn solve_recovers_exact_coefficients() {
        let x = from_columns(&[&[1.0, 1.0, 1.0, 1.0], &[0.0, 1.0, 2.0, 3.0]]).unwrap();
        let y = DVector::from_vec(vec![1.0, 3.0, 5.0, 7.0]);
        let b = LeastSquares::new(&x).unwrap().solve(&y);
        assert!((b[0] - 1.0).abs() < 1e-12);
        assert!((b[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn gram_inverse_matches_direct_inverse() {
        let x = from_columns(&[
            &[1.0, 1.0, 1.0, 1.0, 1.0],
            &[0.3, -1.2, 0.8, 2.0, -0.5],
            &[10.0, 40.0, -20.0, 5.0, 0.0],
        ])
        .unwrap();
        let direct = (x.transpose() * &x).try_inverse().unwrap();
        let via_svd = LeastSquares::new(&x).unwrap().gram_inverse();
        assert!(close(&direct, &via_svd, 1e-10));
    }

    #[test]
    fn rescaled_columns_keep_full_rank() {
        let x = from_columns(&[
            &[1.0, 1.0, 1.0, 1.0, 1.0],
            &[0.3e-9, -1.2e-9, 0.8e-9, 2.0e-9, -0.5e-9],
            &[4.0e7, 1.0e7, -3.0e7, 2.0e7, 0.0],
        ])
        .unwrap();
        assert!(LeastSquares::new(&x).is_ok());
    }

    #[test]
    fn collinear_columns_are_rank_deficient() {
        let x = from_columns(&[&[1.0, 1.0, 1.0, 1.0], &[0.5, 1.0, 1.5, 2.0], &[1.0, 2.0, 3.0, 4.0]])
            .unwrap();
        let err = LeastSquares::new(&x).unwrap_err();
        assert_eq!(err, LinalgError::RankDeficient { rank: 2, cols: 3 });
    }

    #[test]
    fn zero_column_is_rank_deficient() {
        let x = from_columns(&[&[1.0, 1.0, 1.0], &[0.0, 0.0, 0.0]]).unwrap();
        assert!(matches!(
            LeastSquares::new(&x),
            Err(LinalgError::RankDeficient { .. })
        ));
    }

    #[test]
    fn wide_design_is_a_dimension_error() {
        let x = from_columns(&[&[1.0], &[2.0]]).unwrap();
        assert!(matches!(LeastSquares::new(&x), Err(LinalgError::Dimension(_))));
    }

    #[test]
    fn projection_is_idempotent() {
        let z = from_columns(&[&[1.0, 1.0, 1.0, 1.0], &[0.0, 1.0, 0.0, 2.0]]).unwrap();
        let ls = LeastSquares::new(&z).unwrap();
        let m = from_columns(&[&[3.0, -1.0, 0.5, 2.0]]).unwrap();
        let once = ls.project(&m);
        let twice = ls.project(&once);
        assert!(close(&once, &twice, 1e-12));
        assert!(close(&ls.project(&z), &z, 1e-12));
    }
}
