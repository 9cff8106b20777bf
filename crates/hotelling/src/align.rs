//! Row alignment and validation between the two measurement conditions.
//!
//! The paired statistic is only meaningful when row i of the first dataset
//! and row i of the second describe the same observational unit. This module
//! enforces shape compatibility, reorders the second dataset by row label
//! when requested, and collects the advisory notices the caller may want to
//! inspect.

use std::collections::HashMap;

use derive_more::Display;
use ndarray::{Array2, Axis};

use crate::dataset::ObservationMatrix;
use crate::error::{ShapeAxis, TestError};

/// Non-fatal advisory raised during alignment.
///
/// Notices are returned alongside the test summary; they never alter control
/// flow.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Notice {
    /// Rows were matched across conditions by label.
    #[display("rows matched across conditions by label")]
    LabelMatching,

    /// Rows were assumed to be in matching order across conditions.
    #[display("rows assumed to be in matching order across conditions")]
    PositionalMatching,

    /// Sample size risks a singular covariance downstream.
    #[display(
        "only {observations} observations for {variables} variables; \
         the difference covariance may be singular"
    )]
    LowSampleSize {
        /// Number of paired observations
        observations: usize,
        /// Number of measured variables
        variables: usize,
    },
}

/// The two datasets with rows aligned, plus the notices gathered so far.
#[derive(Debug)]
pub(crate) struct AlignedPair {
    pub(crate) first: Array2<f64>,
    pub(crate) second: Array2<f64>,
    pub(crate) notices: Vec<Notice>,
}

/// Validate shapes and align the rows of `second` against `first`.
pub(crate) fn align(
    first: &ObservationMatrix,
    second: &ObservationMatrix,
    match_by_label: bool,
) -> Result<AlignedPair, TestError> {
    if first.nrows() != second.nrows() {
        return Err(TestError::ShapeMismatch {
            axis: ShapeAxis::Rows,
            left: first.nrows(),
            right: second.nrows(),
        });
    }
    if first.ncols() != second.ncols() {
        return Err(TestError::ShapeMismatch {
            axis: ShapeAxis::Columns,
            left: first.ncols(),
            right: second.ncols(),
        });
    }
    if first.nrows() == 0 || first.ncols() == 0 {
        return Err(TestError::EmptyInput);
    }

    let mut notices = Vec::new();

    let second_data = match (match_by_label, first.labels(), second.labels()) {
        (true, Some(wanted), Some(available)) => {
            notices.push(Notice::LabelMatching);
            reorder_by_label(second.data(), wanted, available)?
        }
        (true, None, None) | (false, ..) => {
            // Without labels on either side, row order is the only pairing.
            notices.push(Notice::PositionalMatching);
            second.data().clone()
        }
        (true, ..) => return Err(TestError::MissingLabels),
    };

    if first.nrows() <= first.ncols() {
        notices.push(Notice::LowSampleSize {
            observations: first.nrows(),
            variables: first.ncols(),
        });
    }

    Ok(AlignedPair {
        first: first.data().clone(),
        second: second_data,
        notices,
    })
}

/// Reorder `data` so its rows follow the order of `wanted` labels.
///
/// Duplicate labels resolve to their first occurrence.
fn reorder_by_label(
    data: &Array2<f64>,
    wanted: &[String],
    available: &[String],
) -> Result<Array2<f64>, TestError> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(available.len());
    for (row, label) in available.iter().enumerate() {
        positions.entry(label.as_str()).or_insert(row);
    }

    let mut order = Vec::with_capacity(wanted.len());
    for label in wanted {
        match positions.get(label.as_str()) {
            Some(&row) => order.push(row),
            None => {
                return Err(TestError::LabelMismatch {
                    label: label.clone(),
                });
            }
        }
    }

    Ok(data.select(Axis(0), &order))
}
