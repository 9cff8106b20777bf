//! Observation matrices and landmark flattening.
//!
//! An [`ObservationMatrix`] is an n × p table of measurements: one row per
//! observational unit, one column per measured variable. Rows may carry
//! optional string labels used only for cross-matching the two conditions of
//! a paired test.
//!
//! Raw 3-D landmark arrays (t landmarks × k dimensions × n specimens) are
//! converted into observation matrices through the [`LandmarkFlattener`]
//! capability; the test core never depends on a specific flattening scheme.

use ndarray::{Array1, Array2, Array3, Axis};

use crate::error::TestError;

/// Capability for flattening a 3-D landmark array into an observation matrix.
///
/// The input is shaped (t landmarks × k dimensions × n specimens); the output
/// must be n × (t·k) with one specimen per row.
pub trait LandmarkFlattener {
    /// Flatten `landmarks` into an observation matrix.
    fn flatten(&self, landmarks: &Array3<f64>) -> Array2<f64>;
}

/// Default flattener: concatenates each specimen's landmark coordinates
/// row-major, so row i is (x₁, y₁, …, x₂, y₂, …) for specimen i.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateFlattener;

impl LandmarkFlattener for CoordinateFlattener {
    fn flatten(&self, landmarks: &Array3<f64>) -> Array2<f64> {
        let (t, k, n) = landmarks.dim();
        let mut flat = Array2::zeros((n, t * k));
        for specimen in 0..n {
            for landmark in 0..t {
                for dim in 0..k {
                    flat[[specimen, landmark * k + dim]] = landmarks[[landmark, dim, specimen]];
                }
            }
        }
        flat
    }
}

/// A matrix of multivariate observations with optional row labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationMatrix {
    data: Array2<f64>,
    labels: Option<Vec<String>>,
}

impl ObservationMatrix {
    /// Create an unlabeled observation matrix.
    pub const fn new(data: Array2<f64>) -> Self {
        Self { data, labels: None }
    }

    /// Create an observation matrix with one label per row.
    ///
    /// Fails when the number of labels does not match the number of rows.
    pub fn with_labels(data: Array2<f64>, labels: Vec<String>) -> Result<Self, TestError> {
        if labels.len() != data.nrows() {
            return Err(TestError::LabelCount {
                labels: labels.len(),
                rows: data.nrows(),
            });
        }
        Ok(Self {
            data,
            labels: Some(labels),
        })
    }

    /// Build an observation matrix from a 3-D landmark array via `flattener`.
    ///
    /// Landmark arrays carry no row labels; attach them afterwards with
    /// [`Self::with_labels`] if label-based matching is needed.
    pub fn from_landmarks(landmarks: &Array3<f64>, flattener: &dyn LandmarkFlattener) -> Self {
        Self::new(flattener.flatten(landmarks))
    }

    /// Number of observations (rows).
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of variables (columns).
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// The underlying data matrix.
    pub const fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Row labels, if any.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Column-wise means. Empty matrices are rejected upstream.
    pub(crate) fn column_means(&self) -> Array1<f64> {
        self.data.mean_axis(Axis(0)).unwrap()
    }
}
