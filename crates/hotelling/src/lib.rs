#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/morphostats/hotelling/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod align;
pub mod covariance;
pub mod dataset;
pub mod error;
pub mod paired;
pub mod statistic;

// Re-export main types
pub use align::Notice;
pub use covariance::{
    ClassicalCovariance, CovarianceError, CovarianceEstimator, CovarianceStrategy,
    LedoitWolfConfig, LedoitWolfEstimator, ShrinkageTarget,
};
pub use dataset::{CoordinateFlattener, LandmarkFlattener, ObservationMatrix};
pub use error::{Result, ShapeAxis, TestError};
pub use paired::{PairedHotelling, TestOptions, TestOutput, TestSummary, repeated_measures_test};
pub use statistic::{HotellingComputation, paired_hotelling};
