//! Symmetric eigendecomposition and fallible matrix inversion.
//!
//! The covariance matrices handled here are small (p × p with p in the tens),
//! so a cyclic Jacobi sweep is accurate enough without pulling in LAPACK.
//! Inversion goes through the eigendecomposition so that singularity is a
//! typed failure instead of a panic deep inside a solve.

use ndarray::{Array1, Array2, Axis};

use super::CovarianceError;

const MAX_SWEEPS: usize = 64;

/// Result of a symmetric eigendecomposition.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, in no particular order.
    pub values: Array1<f64>,
    /// Eigenvectors; column k corresponds to `values[k]`.
    pub vectors: Array2<f64>,
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<SymmetricEigen, CovarianceError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(CovarianceError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let mut a = matrix.clone();
    let mut vectors = Array2::<f64>::eye(n);
    let frobenius = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let threshold = 1e-14 * frobenius.max(f64::MIN_POSITIVE);

    for _sweep in 0..MAX_SWEEPS {
        let off_diagonal: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[[i, j]] * a[[i, j]])
            .sum::<f64>()
            .sqrt();
        if off_diagonal < threshold {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                rotate(&mut a, &mut vectors, p, q);
            }
        }
    }

    let values = Array1::from_iter((0..n).map(|i| a[[i, i]]));
    Ok(SymmetricEigen { values, vectors })
}

/// Annihilate element (p, q) with a Jacobi rotation, accumulating the
/// rotation into `vectors`.
fn rotate(a: &mut Array2<f64>, vectors: &mut Array2<f64>, p: usize, q: usize) {
    let apq = a[[p, q]];
    if apq.abs() < f64::MIN_POSITIVE {
        return;
    }

    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    let n = a.nrows();
    let (app, aqq) = (a[[p, p]], a[[q, q]]);

    a[[p, p]] = c * c * app - 2.0 * s * c * apq + s * s * aqq;
    a[[q, q]] = s * s * app + 2.0 * s * c * apq + c * c * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for k in 0..n {
        if k != p && k != q {
            let akp = a[[k, p]];
            let akq = a[[k, q]];
            a[[k, p]] = c * akp - s * akq;
            a[[p, k]] = a[[k, p]];
            a[[k, q]] = s * akp + c * akq;
            a[[q, k]] = a[[k, q]];
        }
    }

    for k in 0..n {
        let vkp = vectors[[k, p]];
        let vkq = vectors[[k, q]];
        vectors[[k, p]] = c * vkp - s * vkq;
        vectors[[k, q]] = s * vkp + c * vkq;
    }
}

/// Invert a symmetric matrix, failing when it is singular to working
/// precision.
///
/// A matrix is treated as singular when its smallest eigenvalue magnitude is
/// below `rcond` times the largest. The inverse is reconstructed as
/// V Λ⁻¹ Vᵀ.
pub fn invert_symmetric(
    matrix: &Array2<f64>,
    rcond: f64,
) -> Result<Array2<f64>, CovarianceError> {
    let eigen = symmetric_eigen(matrix)?;

    let largest = eigen
        .values
        .iter()
        .fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    if largest == 0.0 {
        return Err(CovarianceError::Singular);
    }
    if eigen.values.iter().any(|&v| v.abs() <= rcond * largest) {
        return Err(CovarianceError::Singular);
    }

    let mut scaled = eigen.vectors.clone();
    for (mut column, &lambda) in scaled.axis_iter_mut(Axis(1)).zip(eigen.values.iter()) {
        column.mapv_inplace(|v| v / lambda);
    }

    Ok(scaled.dot(&eigen.vectors.t()))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn test_eigen_diagonal_matrix() {
        let matrix = array![[4.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]];
        let eigen = symmetric_eigen(&matrix).unwrap();

        let mut values = eigen.values.to_vec();
        values.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_abs_diff_eq!(values[0], 4.0, epsilon = 1e-10);
        assert_abs_diff_eq!(values[1], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(values[2], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_eigen_reconstructs_input() {
        let matrix = array![[2.0, 1.0, 1.0], [1.0, 2.0, 1.0], [1.0, 1.0, 2.0]];
        let eigen = symmetric_eigen(&matrix).unwrap();

        // V Λ Vᵀ should give the input back
        let mut scaled = eigen.vectors.clone();
        for (mut column, &lambda) in scaled.axis_iter_mut(Axis(1)).zip(eigen.values.iter()) {
            column.mapv_inplace(|v| v * lambda);
        }
        let reconstructed = scaled.dot(&eigen.vectors.t());

        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(reconstructed[[i, j]], matrix[[i, j]], epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_eigen_rejects_non_square() {
        let matrix = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            symmetric_eigen(&matrix),
            Err(CovarianceError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_invert_diagonal() {
        let matrix = array![[2.0, 0.0], [0.0, 4.0]];
        let inverse = invert_symmetric(&matrix, 1e-12).unwrap();

        assert_abs_diff_eq!(inverse[[0, 0]], 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(inverse[[1, 1]], 0.25, epsilon = 1e-10);
        assert_abs_diff_eq!(inverse[[0, 1]], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_invert_times_original_is_identity() {
        let matrix = array![[3.0, 1.0, 0.5], [1.0, 2.0, 0.3], [0.5, 0.3, 1.5]];
        let inverse = invert_symmetric(&matrix, 1e-12).unwrap();
        let product = inverse.dot(&matrix);

        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(product[[i, j]], expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_invert_detects_singular() {
        // Rank-1 matrix
        let matrix = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(
            invert_symmetric(&matrix, 1e-12),
            Err(CovarianceError::Singular)
        ));
    }

    #[test]
    fn test_invert_zero_matrix_is_singular() {
        let matrix = Array2::<f64>::zeros((3, 3));
        assert!(matches!(
            invert_symmetric(&matrix, 1e-12),
            Err(CovarianceError::Singular)
        ));
    }
}
