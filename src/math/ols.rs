//! Penalized least squares solver.
//!
//! The decomposition backend solves one small linear problem per request:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2 + Σ_j λ_j β_j^2
//! ```
//!
//! Gaussian priors on the changepoint and seasonal coefficients become the
//! `λ_j` penalties; the base trend terms carry `λ_j = 0`.
//!
//! Implementation choices:
//! - The penalty is applied by appending `sqrt(λ_j) e_j` rows (with target 0) to the
//!   design matrix, so a single ordinary least squares solve handles both parts.
//! - We use SVD so the tall system is solved robustly. (Nalgebra's `QR::solve` is
//!   intended for square systems and will panic for non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a ridge-penalized least squares problem.
///
/// `penalties[j]` is `λ_j` for column `j`; it must have one entry per column.
pub fn solve_penalized_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    penalties: &[f64],
) -> Option<DVector<f64>> {
    let (n, p) = x.shape();
    if penalties.len() != p || y.len() != n {
        return None;
    }

    let penalized: Vec<(usize, f64)> = penalties
        .iter()
        .enumerate()
        .filter(|(_, l)| **l > 0.0)
        .map(|(j, l)| (j, l.sqrt()))
        .collect();
    if penalized.is_empty() {
        return solve_least_squares(x, y);
    }

    let rows = n + penalized.len();
    let mut xa = DMatrix::<f64>::zeros(rows, p);
    xa.view_mut((0, 0), (n, p)).copy_from(x);
    for (k, (j, w)) in penalized.iter().enumerate() {
        xa[(n + k, *j)] = *w;
    }
    let mut ya = DVector::<f64>::zeros(rows);
    ya.rows_mut(0, n).copy_from(y);

    solve_least_squares(&xa, &ya)
}
