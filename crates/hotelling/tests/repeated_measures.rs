//! Integration tests for the paired repeated-measures test.

use approx::assert_relative_eq;
use hotelling::{
    CoordinateFlattener, LedoitWolfEstimator, ObservationMatrix, PairedHotelling, ShapeAxis,
    TestError, TestOptions, repeated_measures_test,
};
use ndarray::{Array2, Array3, array};
use rstest::rstest;

fn positional() -> TestOptions {
    TestOptions {
        match_by_label: false,
        use_shrinkage: false,
    }
}

fn labeled(data: Array2<f64>, labels: &[&str]) -> ObservationMatrix {
    ObservationMatrix::with_labels(data, labels.iter().map(ToString::to_string).collect()).unwrap()
}

/// Differences with exactly zero column means and a full-rank covariance.
fn zero_mean_jitter() -> Array2<f64> {
    array![[0.01, -0.02], [-0.01, 0.02], [0.02, 0.01], [-0.02, -0.01]]
}

#[test]
fn no_systematic_difference_yields_zero_statistics() {
    let first = ObservationMatrix::new(array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 1.0]]);
    let second = ObservationMatrix::new(first.data() + &zero_mean_jitter());

    let output = repeated_measures_test(&first, &second, positional()).unwrap();

    assert_relative_eq!(output.summary.euclidean_d, 0.0, epsilon = 1e-10);
    assert_relative_eq!(output.summary.hotelling_t2, 0.0, epsilon = 1e-10);
    assert_relative_eq!(output.summary.fstat.unwrap(), 0.0, epsilon = 1e-10);
    assert_relative_eq!(output.summary.p_value.unwrap(), 1.0, epsilon = 1e-10);
}

#[test]
fn swapping_conditions_leaves_statistics_unchanged() {
    let first = ObservationMatrix::new(array![
        [0.2, 1.4],
        [1.1, 0.3],
        [2.7, 2.2],
        [3.4, 1.9],
        [4.1, 0.8]
    ]);
    let second = ObservationMatrix::new(array![
        [0.9, 1.1],
        [1.8, 0.9],
        [3.1, 2.6],
        [3.2, 2.8],
        [5.0, 1.2]
    ]);

    let forward = repeated_measures_test(&first, &second, positional()).unwrap();
    let reverse = repeated_measures_test(&second, &first, positional()).unwrap();

    assert_relative_eq!(
        forward.summary.euclidean_d,
        reverse.summary.euclidean_d,
        epsilon = 1e-10
    );
    assert_relative_eq!(
        forward.summary.hotelling_t2,
        reverse.summary.hotelling_t2,
        epsilon = 1e-10
    );
    assert_relative_eq!(
        forward.summary.fstat.unwrap(),
        reverse.summary.fstat.unwrap(),
        epsilon = 1e-10
    );
    assert_relative_eq!(
        forward.summary.p_value.unwrap(),
        reverse.summary.p_value.unwrap(),
        epsilon = 1e-10
    );
}

#[rstest]
#[case(&["d", "a", "c", "b"])]
#[case(&["b", "d", "a", "c"])]
fn label_matching_is_invariant_to_row_permutation(#[case] order: &[&str]) {
    let base_labels = ["a", "b", "c", "d"];
    let first = labeled(
        array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 1.0]],
        &base_labels,
    );

    let second_rows = array![
        [1.01, -0.02],
        [1.99, 1.02],
        [3.02, 2.01],
        [3.98, 0.99]
    ];
    let second = labeled(second_rows.clone(), &base_labels);

    // Permute the second dataset's rows together with their labels
    let index_of = |label: &str| base_labels.iter().position(|l| *l == label).unwrap();
    let permuted_rows = ndarray::stack(
        ndarray::Axis(0),
        &order
            .iter()
            .map(|label| second_rows.row(index_of(label)))
            .collect::<Vec<_>>(),
    )
    .unwrap();
    let permuted = labeled(permuted_rows, order);

    let options = TestOptions::default();
    let straight = repeated_measures_test(&first, &second, options).unwrap();
    let shuffled = repeated_measures_test(&first, &permuted, options).unwrap();

    assert_relative_eq!(
        straight.summary.hotelling_t2,
        shuffled.summary.hotelling_t2,
        epsilon = 1e-10
    );
    assert_relative_eq!(
        straight.summary.euclidean_d,
        shuffled.summary.euclidean_d,
        epsilon = 1e-10
    );
    assert_relative_eq!(
        straight.summary.p_value.unwrap(),
        shuffled.summary.p_value.unwrap(),
        epsilon = 1e-10
    );
}

#[test]
fn f_statistic_missing_when_observations_do_not_exceed_variables() {
    // 3 observations of 3 variables: the classical estimate is singular, so
    // the shrinkage path keeps T² computable while F stays undefined.
    let first = ObservationMatrix::new(array![
        [0.0, 1.0, 2.0],
        [1.0, 0.0, 1.0],
        [2.0, 2.0, 0.0]
    ]);
    let second = ObservationMatrix::new(array![
        [0.5, 1.2, 2.1],
        [1.9, 0.3, 1.4],
        [2.2, 2.8, 0.9]
    ]);

    let options = TestOptions {
        match_by_label: false,
        use_shrinkage: true,
    };
    let output = repeated_measures_test(&first, &second, options).unwrap();

    assert!(output.summary.hotelling_t2.is_finite());
    assert!(output.summary.fstat.is_none());
    assert!(output.summary.p_value.is_none());
}

#[test]
fn shrinkage_recovers_from_singular_classical_covariance() {
    let first = ObservationMatrix::new(array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
    // Second difference column exactly doubles the first: classical
    // covariance is rank one.
    let second =
        ObservationMatrix::new(first.data() + &array![[0.1, 0.2], [0.2, 0.4], [0.3, 0.6], [0.4, 0.8]]);

    assert!(matches!(
        repeated_measures_test(&first, &second, positional()),
        Err(TestError::SingularCovariance)
    ));

    let options = TestOptions {
        match_by_label: false,
        use_shrinkage: true,
    };
    let recovered = repeated_measures_test(&first, &second, options).unwrap();
    assert!(recovered.summary.hotelling_t2.is_finite());
    assert!(recovered.summary.fstat.unwrap().is_finite());
    assert!(recovered.summary.p_value.unwrap().is_finite());
}

#[test]
fn row_count_mismatch_fails_before_any_numerics() {
    let first = ObservationMatrix::new(Array2::zeros((10, 2)));
    let second = ObservationMatrix::new(Array2::zeros((9, 2)));

    assert!(matches!(
        repeated_measures_test(&first, &second, positional()),
        Err(TestError::ShapeMismatch {
            axis: ShapeAxis::Rows,
            left: 10,
            right: 9,
        })
    ));
}

#[test]
fn constant_shift_fixture_reports_unit_distance() {
    let first = ObservationMatrix::new(array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 1.0]]);
    let shift = array![[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]];
    let second = ObservationMatrix::new(first.data() + &shift + &zero_mean_jitter());

    let output = repeated_measures_test(&first, &second, positional()).unwrap();

    // Means differ only along the first variable, by exactly 1
    assert_relative_eq!(output.summary.euclidean_d, 1.0, epsilon = 1e-10);
    // S = diag(1/3000, 1/3000), so T² = 4 · 3000 and F = T²·2/(2·3)
    assert_relative_eq!(output.summary.hotelling_t2, 12000.0, epsilon = 1e-5);
    assert_relative_eq!(output.summary.fstat.unwrap(), 4000.0, epsilon = 1e-5);
    assert_relative_eq!(
        output.summary.p_value.unwrap(),
        1.0 / 4001.0,
        epsilon = 1e-10
    );
}

#[test]
fn matching_mode_notices_are_reported() {
    let first = labeled(array![[0.0], [1.0], [2.0], [3.0]], &["a", "b", "c", "d"]);
    let second = labeled(array![[0.4], [0.8], [2.3], [3.1]], &["a", "b", "c", "d"]);

    let by_label = repeated_measures_test(&first, &second, TestOptions::default()).unwrap();
    assert!(
        by_label
            .notices
            .contains(&hotelling::Notice::LabelMatching)
    );

    let by_position = repeated_measures_test(&first, &second, positional()).unwrap();
    assert!(
        by_position
            .notices
            .contains(&hotelling::Notice::PositionalMatching)
    );
}

#[test]
fn landmark_arrays_flatten_and_run() {
    // 2 landmarks x 2 dimensions x 4 specimens
    let mut first = Array3::zeros((2, 2, 4));
    for landmark in 0..2 {
        for dim in 0..2 {
            for specimen in 0..4 {
                first[[landmark, dim, specimen]] =
                    (specimen as f64) + 0.5 * (landmark as f64) - 0.2 * (dim as f64);
            }
        }
    }
    let jitter = [0.01, -0.01, 0.02, -0.02];
    let mut second = first.clone();
    for landmark in 0..2 {
        for dim in 0..2 {
            for specimen in 0..4 {
                second[[landmark, dim, specimen]] +=
                    1.0 + jitter[specimen] * ((landmark * 2 + dim) as f64 - 1.5);
            }
        }
    }

    let runner = PairedHotelling::new(TestOptions {
        match_by_label: false,
        use_shrinkage: true,
    })
    .with_shrinkage(LedoitWolfEstimator::default())
    .with_flattener(CoordinateFlattener);
    let output = runner.run_landmarks(&first, &second).unwrap();

    // 4 specimens of 4 flattened variables: F undefined, T² reported
    assert!(output.summary.fstat.is_none());
    assert!(output.summary.euclidean_d > 0.0);
}
