//! Matrix utility functions.

use faer::{Col, Mat};

/// Detect columns that are constant (zero variance).
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_cols = x.ncols();
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![true; n_cols];
    }

    let mut constant = vec![false; n_cols];

    for j in 0..n_cols {
        let first = x[(0, j)];
        let all_same = (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance);
        constant[j] = all_same;
    }

    constant
}

/// Center a matrix by subtracting column means.
pub fn center_columns(x: &Mat<f64>) -> (Mat<f64>, Col<f64>) {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let mut means = Col::zeros(n_cols);
    let mut centered = Mat::zeros(n_rows, n_cols);

    for j in 0..n_cols {
        let sum: f64 = (0..n_rows).map(|i| x[(i, j)]).sum();
        means[j] = sum / n_rows as f64;

        for i in 0..n_rows {
            centered[(i, j)] = x[(i, j)] - means[j];
        }
    }

    (centered, means)
}

/// Center a vector by subtracting the mean.
pub fn center_vector(y: &Col<f64>) -> (Col<f64>, f64) {
    let n = y.nrows();
    let mean: f64 = y.iter().sum::<f64>() / n as f64;

    let centered = Col::from_fn(n, |i| y[i] - mean);

    (centered, mean)
}

/// Compute the lower Cholesky factor L of a symmetric matrix A, with A = L·Lᵀ.
///
/// Returns `None` when the matrix is not positive-definite (a pivot fails to
/// be strictly positive) or when the factorization produces non-finite values.
/// This doubles as the positive-definiteness test used throughout the crate.
pub fn cholesky_lower(a: &Mat<f64>) -> Option<Mat<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return None;
    }

    let mut l: Mat<f64> = Mat::zeros(n, n);

    for j in 0..n {
        let mut diag = a[(j, j)];
        for k in 0..j {
            diag -= l[(j, k)] * l[(j, k)];
        }
        if !(diag > 0.0) || !diag.is_finite() {
            return None;
        }
        let ljj = diag.sqrt();
        l[(j, j)] = ljj;

        for i in (j + 1)..n {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            l[(i, j)] = sum / ljj;
        }
    }

    Some(l)
}

/// Eigendecomposition of a symmetric matrix via cyclic Jacobi rotations.
///
/// Returns `(eigenvalues, eigenvectors)` sorted by descending eigenvalue,
/// with eigenvectors stored as columns. Returns `None` when the off-diagonal
/// mass has not vanished within `max_sweeps` sweeps.
pub fn symmetric_eigen(a: &Mat<f64>, max_sweeps: usize, tolerance: f64) -> Option<(Col<f64>, Mat<f64>)> {
    let n = a.nrows();
    if n != a.ncols() {
        return None;
    }
    if n == 0 {
        return Some((Col::zeros(0), Mat::zeros(0, 0)));
    }

    let mut work = a.clone();
    let mut vectors = Mat::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 });

    let mut converged = false;
    for _sweep in 0..max_sweeps {
        let mut off_diagonal = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                off_diagonal += work[(i, j)] * work[(i, j)];
            }
        }
        if off_diagonal.sqrt() < tolerance {
            converged = true;
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = work[(p, q)];
                if apq.abs() < tolerance * 1e-3 {
                    continue;
                }

                // Rotation angle annihilating the (p, q) entry.
                let theta = (work[(q, q)] - work[(p, p)]) / (2.0 * apq);
                let t = if theta >= 0.0 {
                    1.0 / (theta + (1.0 + theta * theta).sqrt())
                } else {
                    -1.0 / (-theta + (1.0 + theta * theta).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = work[(k, p)];
                    let akq = work[(k, q)];
                    work[(k, p)] = c * akp - s * akq;
                    work[(k, q)] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = work[(p, k)];
                    let aqk = work[(q, k)];
                    work[(p, k)] = c * apk - s * aqk;
                    work[(q, k)] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = vectors[(k, p)];
                    let vkq = vectors[(k, q)];
                    vectors[(k, p)] = c * vkp - s * vkq;
                    vectors[(k, q)] = s * vkp + c * vkq;
                }
            }
        }
    }

    if !converged {
        // One last check: the final sweep may have finished the job.
        let mut off_diagonal = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                off_diagonal += work[(i, j)] * work[(i, j)];
            }
        }
        if off_diagonal.sqrt() >= tolerance {
            return None;
        }
    }

    // Sort eigenpairs by descending eigenvalue.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        work[(j, j)]
            .partial_cmp(&work[(i, i)])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let eigenvalues = Col::from_fn(n, |k| work[(order[k], order[k])]);
    let eigenvectors = Mat::from_fn(n, n, |i, k| vectors[(i, order[k])]);

    Some((eigenvalues, eigenvectors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_constant_columns() {
        let mut x = Mat::zeros(5, 3);
        // Column 0: constant
        for i in 0..5 {
            x[(i, 0)] = 1.0;
            x[(i, 1)] = i as f64;
            x[(i, 2)] = 2.0;
        }

        let constant = detect_constant_columns(&x, 1e-10);
        assert!(constant[0]); // constant
        assert!(!constant[1]); // not constant
        assert!(constant[2]); // constant
    }

    #[test]
    fn test_center_columns() {
        let mut x = Mat::zeros(4, 2);
        x[(0, 0)] = 1.0;
        x[(1, 0)] = 2.0;
        x[(2, 0)] = 3.0;
        x[(3, 0)] = 4.0;
        x[(0, 1)] = 10.0;
        x[(1, 1)] = 20.0;
        x[(2, 1)] = 30.0;
        x[(3, 1)] = 40.0;

        let (centered, means) = center_columns(&x);

        assert!((means[0] - 2.5).abs() < 1e-10);
        assert!((means[1] - 25.0).abs() < 1e-10);

        // Check centered values sum to zero
        let col0_sum: f64 = (0..4).map(|i| centered[(i, 0)]).sum();
        let col1_sum: f64 = (0..4).map(|i| centered[(i, 1)]).sum();
        assert!(col0_sum.abs() < 1e-10);
        assert!(col1_sum.abs() < 1e-10);
    }

    #[test]
    fn test_center_vector() {
        let y = Col::from_fn(4, |i| (i + 1) as f64); // [1, 2, 3, 4]
        let (centered, mean) = center_vector(&y);

        assert!((mean - 2.5).abs() < 1e-10);
        assert!(centered.iter().sum::<f64>().abs() < 1e-10);
    }

    #[test]
    fn test_cholesky_identity() {
        let a = Mat::from_fn(3, 3, |i, j| if i == j { 1.0 } else { 0.0 });
        let l = cholesky_lower(&a).expect("identity is positive-definite");

        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((l[(i, j)] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_reconstructs() {
        // A = [[4, 2], [2, 3]] is positive-definite.
        let mut a = Mat::zeros(2, 2);
        a[(0, 0)] = 4.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 2.0;
        a[(1, 1)] = 3.0;

        let l = cholesky_lower(&a).expect("matrix is positive-definite");

        for i in 0..2 {
            for j in 0..2 {
                let mut llt = 0.0;
                for k in 0..2 {
                    llt += l[(i, k)] * l[(j, k)];
                }
                assert!((llt - a[(i, j)]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        // Eigenvalues 2 and -1: not positive-definite.
        let mut a = Mat::zeros(2, 2);
        a[(0, 0)] = 0.5;
        a[(0, 1)] = 1.5;
        a[(1, 0)] = 1.5;
        a[(1, 1)] = 0.5;

        assert!(cholesky_lower(&a).is_none());
    }

    #[test]
    fn test_symmetric_eigen_diagonal() {
        let mut a = Mat::zeros(3, 3);
        a[(0, 0)] = 1.0;
        a[(1, 1)] = 3.0;
        a[(2, 2)] = 2.0;

        let (values, _) = symmetric_eigen(&a, 50, 1e-12).expect("diagonal converges immediately");

        assert!((values[0] - 3.0).abs() < 1e-10);
        assert!((values[1] - 2.0).abs() < 1e-10);
        assert!((values[2] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_symmetric_eigen_reconstructs() {
        let mut a = Mat::zeros(3, 3);
        a[(0, 0)] = 2.0;
        a[(0, 1)] = 1.0;
        a[(1, 0)] = 1.0;
        a[(1, 1)] = 2.0;
        a[(1, 2)] = 0.5;
        a[(2, 1)] = 0.5;
        a[(2, 2)] = 1.5;

        let (values, vectors) = symmetric_eigen(&a, 100, 1e-12).expect("small symmetric matrix");

        // V · diag(λ) · Vᵀ should reproduce A.
        for i in 0..3 {
            for j in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += vectors[(i, k)] * values[k] * vectors[(j, k)];
                }
                assert!(
                    (sum - a[(i, j)]).abs() < 1e-8,
                    "reconstruction mismatch at ({i}, {j})"
                );
            }
        }

        // Eigenvalues sorted descending.
        assert!(values[0] >= values[1] && values[1] >= values[2]);
    }

    #[test]
    fn test_symmetric_eigen_orthonormal_vectors() {
        let a = Mat::from_fn(4, 4, |i, j| 1.0 / ((i + j + 1) as f64));
        let (_, vectors) = symmetric_eigen(&a, 100, 1e-12).expect("hilbert-like matrix");

        for p in 0..4 {
            for q in 0..4 {
                let mut dot = 0.0;
                for k in 0..4 {
                    dot += vectors[(k, p)] * vectors[(k, q)];
                }
                let expected = if p == q { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-8);
            }
        }
    }
}
