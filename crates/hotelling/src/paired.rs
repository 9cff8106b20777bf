//! Top-level paired test runner and result assembly.

use std::fmt;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::align::{Notice, align};
use crate::covariance::{
    ClassicalCovariance, CovarianceEstimator, CovarianceStrategy, LedoitWolfEstimator,
};
use crate::dataset::{CoordinateFlattener, LandmarkFlattener, ObservationMatrix};
use crate::error::TestError;
use crate::statistic::paired_hotelling;

/// Options for a paired test invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOptions {
    /// Match rows across conditions by label (default: true). When false,
    /// row i of the first dataset is paired with row i of the second.
    pub match_by_label: bool,

    /// Use the shrinkage covariance estimator instead of the classical
    /// sample covariance (default: false). Requires a shrinkage estimator
    /// to be installed on the runner.
    pub use_shrinkage: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            match_by_label: true,
            use_shrinkage: false,
        }
    }
}

impl TestOptions {
    /// The covariance strategy these options select.
    pub const fn covariance_strategy(&self) -> CovarianceStrategy {
        if self.use_shrinkage {
            CovarianceStrategy::Shrinkage
        } else {
            CovarianceStrategy::Classical
        }
    }
}

/// The named result record of one paired test.
///
/// Serialized field names follow the conventional output of this test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    /// Euclidean distance between the two group mean vectors.
    #[serde(rename = "EuclideanD")]
    pub euclidean_d: f64,

    /// Paired Hotelling's T² statistic.
    #[serde(rename = "HotellingT2")]
    pub hotelling_t2: f64,

    /// F statistic; missing when n ≤ p.
    #[serde(rename = "Fstat")]
    pub fstat: Option<f64>,

    /// Upper-tail p-value; missing when n ≤ p.
    #[serde(rename = "p_value")]
    pub p_value: Option<f64>,
}

/// Result record plus the advisory notices raised while producing it.
#[derive(Debug, Clone)]
pub struct TestOutput {
    /// The assembled result record.
    pub summary: TestSummary,
    /// Advisory notices; empty on a perfectly quiet run, but alignment
    /// always reports which matching mode applied.
    pub notices: Vec<Notice>,
}

/// Configured paired Hotelling's T² test runner.
///
/// The shrinkage covariance estimator and the landmark flattener are
/// pluggable capabilities: the runner only invokes them through their traits.
/// [`repeated_measures_test`] builds a runner with the bundled defaults.
pub struct PairedHotelling {
    options: TestOptions,
    shrinkage: Option<Box<dyn CovarianceEstimator>>,
    flattener: Box<dyn LandmarkFlattener>,
}

impl fmt::Debug for PairedHotelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairedHotelling")
            .field("options", &self.options)
            .field("shrinkage_installed", &self.shrinkage.is_some())
            .finish()
    }
}

impl PairedHotelling {
    /// Create a runner with no shrinkage estimator installed.
    pub fn new(options: TestOptions) -> Self {
        Self {
            options,
            shrinkage: None,
            flattener: Box::new(CoordinateFlattener),
        }
    }

    /// Install a shrinkage covariance estimator.
    #[must_use]
    pub fn with_shrinkage(mut self, estimator: impl CovarianceEstimator + 'static) -> Self {
        self.shrinkage = Some(Box::new(estimator));
        self
    }

    /// Replace the landmark flattener used by [`Self::run_landmarks`].
    #[must_use]
    pub fn with_flattener(mut self, flattener: impl LandmarkFlattener + 'static) -> Self {
        self.flattener = Box::new(flattener);
        self
    }

    /// Run the paired test on two observation matrices.
    ///
    /// # Errors
    ///
    /// Shape and label validation errors from alignment,
    /// [`TestError::StrategyUnavailable`] when shrinkage is requested with no
    /// estimator installed, and [`TestError::SingularCovariance`] when the
    /// difference covariance cannot be inverted.
    pub fn run(
        &self,
        first: &ObservationMatrix,
        second: &ObservationMatrix,
    ) -> Result<TestOutput, TestError> {
        let estimator: &dyn CovarianceEstimator = match self.options.covariance_strategy() {
            CovarianceStrategy::Classical => &ClassicalCovariance,
            CovarianceStrategy::Shrinkage => self
                .shrinkage
                .as_deref()
                .ok_or(TestError::StrategyUnavailable)?,
        };

        let aligned = align(first, second, self.options.match_by_label)?;

        let mean_gap = first.column_means() - second.column_means();
        let euclidean_d = mean_gap.mapv(|v| v * v).sum().sqrt();

        let stats = paired_hotelling(&aligned.first, &aligned.second, estimator)?;

        Ok(TestOutput {
            summary: TestSummary {
                euclidean_d,
                hotelling_t2: stats.t2,
                fstat: stats.fstat,
                p_value: stats.p_value,
            },
            notices: aligned.notices,
        })
    }

    /// Flatten two 3-D landmark arrays through the installed flattener and
    /// run the paired test on the result.
    ///
    /// Landmark arrays carry no row labels, so specimens are paired by
    /// position; attach labels through [`ObservationMatrix::with_labels`] if
    /// label-based matching is needed.
    pub fn run_landmarks(
        &self,
        first: &Array3<f64>,
        second: &Array3<f64>,
    ) -> Result<TestOutput, TestError> {
        let first = ObservationMatrix::from_landmarks(first, self.flattener.as_ref());
        let second = ObservationMatrix::from_landmarks(second, self.flattener.as_ref());
        self.run(&first, &second)
    }
}

/// Run a paired Hotelling's T² test with the bundled estimators.
///
/// This is the primary entry point: alignment and validation, covariance
/// estimation (classical, or Ledoit-Wolf shrinkage when
/// `options.use_shrinkage` is set), the T² statistic with its F conversion,
/// and the Euclidean distance between the group means, assembled into one
/// record.
///
/// # Errors
///
/// See [`PairedHotelling::run`].
pub fn repeated_measures_test(
    first: &ObservationMatrix,
    second: &ObservationMatrix,
    options: TestOptions,
) -> Result<TestOutput, TestError> {
    PairedHotelling::new(options)
        .with_shrinkage(LedoitWolfEstimator::default())
        .run(first, second)
}
