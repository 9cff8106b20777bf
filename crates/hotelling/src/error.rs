//! Error types for the paired test.

use derive_more::Display;
use thiserror::Error;

use crate::covariance::CovarianceError;

/// Result type for paired-test operations.
pub type Result<T> = std::result::Result<T, TestError>;

/// Axis of an observation matrix, used to report shape mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ShapeAxis {
    /// Observation (row) axis.
    #[display("row")]
    Rows,
    /// Variable (column) axis.
    #[display("column")]
    Columns,
}

/// Errors that can abort a paired Hotelling's T² test.
///
/// All variants are fatal to the call: no partial result is returned. The
/// undefined F statistic for n ≤ p is *not* an error; it is reported as a
/// missing value in the summary.
#[derive(Debug, Error)]
pub enum TestError {
    /// The two datasets disagree in shape along the given axis.
    #[error("{axis} count mismatch between paired datasets: {left} vs {right}")]
    ShapeMismatch {
        /// Axis along which the counts differ
        axis: ShapeAxis,
        /// Count in the first dataset
        left: usize,
        /// Count in the second dataset
        right: usize,
    },

    /// A row label in the first dataset has no counterpart in the second.
    #[error("label {label:?} from the first dataset has no match in the second")]
    LabelMismatch {
        /// The unmatched label
        label: String,
    },

    /// Label-based matching was requested but only one dataset is labeled.
    #[error("label-based matching requested but only one dataset carries row labels")]
    MissingLabels,

    /// The number of labels does not match the number of observations.
    #[error("{labels} labels supplied for {rows} observations")]
    LabelCount {
        /// Number of labels supplied
        labels: usize,
        /// Number of observation rows
        rows: usize,
    },

    /// A dataset has no observations or no variables.
    #[error("datasets must contain at least one observation and one variable")]
    EmptyInput,

    /// The difference covariance matrix cannot be inverted.
    ///
    /// Recovery: re-run with the shrinkage estimator, or reduce the number of
    /// variables upstream.
    #[error("difference covariance matrix is singular; retry with the shrinkage estimator")]
    SingularCovariance,

    /// Shrinkage was requested but no shrinkage estimator is installed.
    #[error("shrinkage covariance requested but no shrinkage estimator is installed")]
    StrategyUnavailable,

    /// Covariance estimation error
    #[error("covariance error: {0}")]
    Covariance(#[from] CovarianceError),
}
