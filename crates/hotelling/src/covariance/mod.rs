//! Covariance estimation for the paired-difference matrix.
//!
//! The paired test works entirely on D = T2 − T1; its covariance can be
//! estimated directly ([`ClassicalCovariance`]) or through Ledoit-Wolf
//! shrinkage ([`LedoitWolfEstimator`]) when the sample covariance is
//! ill-conditioned.

pub mod classical;
pub mod ledoit_wolf;
pub mod linalg;

pub use classical::ClassicalCovariance;
pub use ledoit_wolf::{LedoitWolfConfig, LedoitWolfEstimator, ShrinkageTarget};
pub use linalg::{SymmetricEigen, invert_symmetric, symmetric_eigen};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during covariance estimation
#[derive(Debug, Error)]
pub enum CovarianceError {
    /// Insufficient data for estimation
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Dimension mismatch
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Matrix is singular to working precision
    #[error("matrix is singular to working precision")]
    Singular,
}

/// Which covariance estimator the test should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CovarianceStrategy {
    /// Unbiased sample covariance (divide by n − 1).
    #[default]
    Classical,
    /// Ledoit-Wolf linear shrinkage toward a structured target.
    ///
    /// Requires a shrinkage estimator to be installed on the test runner.
    Shrinkage,
}

/// Trait for covariance matrix estimators over paired differences.
pub trait CovarianceEstimator {
    /// Estimate the covariance matrix of the rows of `differences`.
    ///
    /// # Arguments
    /// * `differences` - Matrix where each row is one observational unit's
    ///   difference between the two conditions
    ///
    /// # Returns
    /// * Estimated p × p symmetric covariance matrix
    fn estimate(&self, differences: &Array2<f64>) -> Result<Array2<f64>, CovarianceError>;
}
