//! Ledoit-Wolf shrinkage covariance estimator.
//!
//! Shrinks the sample covariance of the paired differences toward a
//! structured target:
//!
//! Σ = δ* F + (1 − δ*) S
//!
//! where S is the sample covariance, F the target, and δ* the analytically
//! optimal shrinkage intensity from Ledoit & Wolf (2004), "Honey, I Shrunk
//! the Sample Covariance Matrix". Useful when the number of paired
//! observations is small relative to the number of variables, where S is
//! ill-conditioned or outright singular.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use super::{CovarianceError, CovarianceEstimator};

/// Shrinkage target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShrinkageTarget {
    /// Identity scaled by the average variance: F = μI with μ = trace(S)/p
    #[default]
    Identity,

    /// Diagonal of S with all covariances zeroed
    Diagonal,
}

/// Ledoit-Wolf estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedoitWolfConfig {
    /// Minimum number of observations required (default: 2)
    pub min_observations: usize,

    /// Shrinkage target type (default: Identity)
    pub target: ShrinkageTarget,
}

impl Default for LedoitWolfConfig {
    fn default() -> Self {
        Self {
            min_observations: 2,
            target: ShrinkageTarget::Identity,
        }
    }
}

/// Ledoit-Wolf shrinkage covariance estimator
#[derive(Debug, Default)]
pub struct LedoitWolfEstimator {
    config: LedoitWolfConfig,
}

impl LedoitWolfEstimator {
    /// Create an estimator with the given configuration.
    pub const fn new(config: LedoitWolfConfig) -> Self {
        Self { config }
    }

    /// Shrinkage intensity δ* for `differences`, for diagnostics.
    pub fn shrinkage_intensity(&self, differences: &Array2<f64>) -> Result<f64, CovarianceError> {
        let centered = self.check_and_center(differences)?;
        let sample = sample_covariance(&centered);
        let target = self.target_matrix(&sample);
        Ok(optimal_intensity(&centered, &sample, &target, self.config.target))
    }

    fn check_and_center(&self, differences: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        let n = differences.nrows();
        if n < self.config.min_observations {
            return Err(CovarianceError::InsufficientData {
                required: self.config.min_observations,
                actual: n,
            });
        }
        let means = differences.mean_axis(Axis(0)).unwrap();
        Ok(differences - &means.insert_axis(Axis(0)))
    }

    fn target_matrix(&self, sample: &Array2<f64>) -> Array2<f64> {
        let p = sample.nrows();
        match self.config.target {
            ShrinkageTarget::Identity => {
                let mu = sample.diag().sum() / p as f64;
                Array2::eye(p) * mu
            }
            ShrinkageTarget::Diagonal => Array2::from_diag(&sample.diag()),
        }
    }
}

impl CovarianceEstimator for LedoitWolfEstimator {
    fn estimate(&self, differences: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        let centered = self.check_and_center(differences)?;
        let sample = sample_covariance(&centered);
        let target = self.target_matrix(&sample);
        let delta = optimal_intensity(&centered, &sample, &target, self.config.target);

        Ok(&target * delta + &sample * (1.0 - delta))
    }
}

/// Sample covariance with the 1/n normalization the Ledoit-Wolf formula
/// assumes. `centered` must already have zero column means.
fn sample_covariance(centered: &Array2<f64>) -> Array2<f64> {
    let n = centered.nrows() as f64;
    centered.t().dot(centered) / n
}

/// Optimal shrinkage intensity δ* = clamp(b̂² / γ̂, 0, 1).
///
/// b̂² is the estimated sampling variance of the sample covariance entries
/// (1/n² times the summed squared deviations of the per-observation outer
/// products from S); γ̂ = ||S − F||²_F is the squared distance to the
/// target. Entries the target copies verbatim from S (the diagonal, for the
/// [`ShrinkageTarget::Diagonal`] target) share S's sampling noise and are
/// excluded from the numerator.
fn optimal_intensity(
    centered: &Array2<f64>,
    sample: &Array2<f64>,
    target: &Array2<f64>,
    kind: ShrinkageTarget,
) -> f64 {
    let n = centered.nrows() as f64;

    let mut variance = 0.0;
    let mut shared = 0.0;
    for row in centered.rows() {
        let y = row.insert_axis(Axis(1));
        let outer = y.dot(&y.t());
        let deviation = (&outer - sample).mapv(|v| v * v);
        variance += deviation.sum();
        if kind == ShrinkageTarget::Diagonal {
            shared += deviation.diag().sum();
        }
    }
    variance /= n * n;
    shared /= n * n;

    // γ̂ = ||S − F||²_F
    let gamma = (sample - target).mapv(|v| v * v).sum();

    if gamma > 0.0 {
        ((variance - shared) / gamma).clamp(0.0, 1.0)
    } else {
        // Sample covariance already equals the target
        0.0
    }
}
