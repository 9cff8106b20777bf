//! Unbiased sample covariance.

use ndarray::{Array2, Axis};

use super::{CovarianceError, CovarianceEstimator};

/// Classical sample covariance estimator (divide by n − 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalCovariance;

impl CovarianceEstimator for ClassicalCovariance {
    fn estimate(&self, differences: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        let n = differences.nrows();
        if n < 2 {
            return Err(CovarianceError::InsufficientData {
                required: 2,
                actual: n,
            });
        }

        let means = differences.mean_axis(Axis(0)).unwrap();
        let centered = differences - &means.insert_axis(Axis(0));
        Ok(centered.t().dot(&centered) / (n - 1) as f64)
    }
}
