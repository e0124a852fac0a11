use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use veleta_core::{
    Aggregation, FrequencyGrammar, VeletaError, YearMatrix, downsample, upsample,
};

fn index_with_step(n: usize, step_secs: i64) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| start + chrono::Duration::seconds(i as i64 * step_secs))
        .collect()
}

fn hourly_matrix(values: &[Option<f64>]) -> YearMatrix {
    let mut columns = BTreeMap::new();
    columns.insert(2021, values.to_vec());
    YearMatrix::new(index_with_step(values.len(), 3_600), columns).unwrap()
}

#[test]
fn equal_frequency_is_rejected_in_both_directions() {
    let m = hourly_matrix(&[Some(1.0), Some(2.0), Some(3.0)]);

    let err = upsample(m.clone(), "1h", "polynomial", 1, FrequencyGrammar::Standard).unwrap_err();
    assert!(matches!(err, VeletaError::ResolutionDirection { needed: "finer", .. }));

    let err = downsample(m, "1h", &Aggregation::Mean, FrequencyGrammar::Standard).unwrap_err();
    assert!(matches!(err, VeletaError::ResolutionDirection { needed: "coarser", .. }));
}

#[test]
fn wrong_direction_is_rejected() {
    let m = hourly_matrix(&[Some(1.0), Some(2.0), Some(3.0)]);

    let err = upsample(m.clone(), "2h", "polynomial", 1, FrequencyGrammar::Standard).unwrap_err();
    assert!(matches!(
        err,
        VeletaError::ResolutionDirection { requested_secs: 7_200, current_secs: 3_600, .. }
    ));

    let err = downsample(m, "30m", &Aggregation::Mean, FrequencyGrammar::Standard).unwrap_err();
    assert!(matches!(
        err,
        VeletaError::ResolutionDirection { requested_secs: 1_800, .. }
    ));
}

#[test]
fn malformed_frequency_carries_the_input_verbatim() {
    let m = hourly_matrix(&[Some(1.0), Some(2.0)]);
    let err = upsample(m, "90x", "polynomial", 1, FrequencyGrammar::Standard).unwrap_err();
    assert!(matches!(err, VeletaError::InvalidFrequencyFormat { input, .. } if input == "90x"));
}

#[test]
fn unknown_interpolation_method_lists_the_supported_set() {
    let m = hourly_matrix(&[Some(1.0), Some(2.0)]);
    let err = upsample(m, "30m", "sinc", 1, FrequencyGrammar::Standard).unwrap_err();
    match err {
        VeletaError::UnsupportedMethod { method, supported } => {
            assert_eq!(method, "sinc");
            assert_eq!(supported, &["polynomial", "spline"]);
        }
        other => panic!("expected UnsupportedMethod, got {other:?}"),
    }
}

#[test]
fn linear_upsample_fills_midpoints() {
    let m = hourly_matrix(&[Some(0.0), Some(60.0)]);
    let up = upsample(m, "30m", "polynomial", 1, FrequencyGrammar::Standard).unwrap();
    assert_eq!(up.n_rows(), 3);
    let col = up.column(2021).unwrap();
    assert!((col[1].unwrap() - 30.0).abs() < 1e-9);
    assert_eq!(col[0], Some(0.0));
    assert_eq!(col[2], Some(60.0));
}

#[test]
fn spline_upsample_passes_through_the_knots() {
    let m = hourly_matrix(&[Some(1.0), Some(3.0), Some(2.0), Some(5.0)]);
    let up = upsample(m.clone(), "30m", "spline", 3, FrequencyGrammar::Standard).unwrap();
    let col = up.column(2021).unwrap();
    for (i, original) in m.column(2021).unwrap().iter().enumerate() {
        assert!((col[2 * i].unwrap() - original.unwrap()).abs() < 1e-9);
    }
}

#[test]
fn spline_orders_other_than_1_and_3_are_invalid() {
    let m = hourly_matrix(&[Some(1.0), Some(2.0), Some(3.0)]);
    let err = upsample(m, "30m", "spline", 2, FrequencyGrammar::Standard).unwrap_err();
    assert!(matches!(err, VeletaError::InvalidArg(_)));
}

#[test]
fn interpolation_skips_missing_support_points() {
    // The gap at 01:00 is bridged by the neighbors, order-1 polynomial.
    let m = hourly_matrix(&[Some(0.0), None, Some(120.0)]);
    let up = upsample(m, "30m", "polynomial", 1, FrequencyGrammar::Standard).unwrap();
    let col = up.column(2021).unwrap();
    assert!((col[2].unwrap() - 60.0).abs() < 1e-9);
}

#[test]
fn upsample_keeps_an_unobserved_column_entirely_missing() {
    let mut columns = BTreeMap::new();
    columns.insert(2020, vec![Some(1.0), Some(3.0), Some(5.0)]);
    columns.insert(2021, vec![None, None, None]);
    let m = YearMatrix::new(index_with_step(3, 3_600), columns).unwrap();

    let up = upsample(m, "30m", "polynomial", 1, FrequencyGrammar::Standard).unwrap();
    assert_eq!(up.n_rows(), 5);
    assert!(up.column(2020).unwrap().iter().all(Option::is_some));
    assert!(up.column(2021).unwrap().iter().all(Option::is_none));
}

#[test]
fn downsample_aggregations_reduce_each_bucket() {
    let values = &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
    let cases: &[(Aggregation, [f64; 2])] = &[
        (Aggregation::Mean, [1.5, 3.5]),
        (Aggregation::Sum, [3.0, 7.0]),
        (Aggregation::Min, [1.0, 3.0]),
        (Aggregation::Max, [2.0, 4.0]),
        (Aggregation::First, [1.0, 3.0]),
        (Aggregation::Last, [2.0, 4.0]),
    ];
    for (agg, expected) in cases {
        let down = downsample(
            hourly_matrix(values),
            "2h",
            agg,
            FrequencyGrammar::Standard,
        )
        .unwrap();
        let col = down.column(2021).unwrap();
        assert_eq!(down.n_rows(), 2, "{agg:?}");
        assert_eq!(col[0], Some(expected[0]), "{agg:?}");
        assert_eq!(col[1], Some(expected[1]), "{agg:?}");
    }
}

#[test]
fn custom_reducers_are_accepted() {
    let spread = Aggregation::Custom(Arc::new(|values: &[f64]| {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        max - min
    }));
    let down = downsample(
        hourly_matrix(&[Some(1.0), Some(5.0), Some(2.0), Some(2.5)]),
        "2h",
        &spread,
        FrequencyGrammar::Standard,
    )
    .unwrap();
    assert_eq!(down.column(2021).unwrap(), &[Some(4.0), Some(0.5)]);
}

#[test]
fn buckets_without_observations_stay_missing() {
    let down = downsample(
        hourly_matrix(&[Some(1.0), Some(2.0), None, None]),
        "2h",
        &Aggregation::Mean,
        FrequencyGrammar::Standard,
    )
    .unwrap();
    assert_eq!(down.column(2021).unwrap(), &[Some(1.5), None]);
}

#[test]
fn downsample_preserves_every_year_column() {
    let mut columns = BTreeMap::new();
    columns.insert(2020, vec![Some(1.0), Some(3.0)]);
    columns.insert(2021, vec![Some(10.0), Some(30.0)]);
    let m = YearMatrix::new(index_with_step(2, 3_600), columns).unwrap();

    let down = downsample(m, "2h", &Aggregation::Mean, FrequencyGrammar::Standard).unwrap();
    assert_eq!(down.years(), vec![2020, 2021]);
    assert_eq!(down.column(2020).unwrap(), &[Some(2.0)]);
    assert_eq!(down.column(2021).unwrap(), &[Some(20.0)]);
}

#[test]
fn down_then_up_round_trips_the_row_count() {
    // 25 hourly rows span a whole day, so 2h buckets land on the last row too.
    let values: Vec<Option<f64>> = (0..25).map(|i| Some(f64::from(i))).collect();
    let m = hourly_matrix(&values);

    let down = downsample(m, "2h", &Aggregation::Mean, FrequencyGrammar::Standard).unwrap();
    assert_eq!(down.n_rows(), 13);

    let up = upsample(down, "1h", "polynomial", 1, FrequencyGrammar::Standard).unwrap();
    assert_eq!(up.n_rows(), 25);
}

#[test]
fn weeks_resolve_only_under_the_extended_grammar() {
    let values: Vec<Option<f64>> = (0..21).map(|i| Some(f64::from(i))).collect();
    let mut columns = BTreeMap::new();
    columns.insert(2021, values);
    let m = YearMatrix::new(index_with_step(21, 86_400), columns).unwrap();

    let err = downsample(
        m.clone(),
        "1w",
        &Aggregation::Mean,
        FrequencyGrammar::Standard,
    )
    .unwrap_err();
    assert!(matches!(err, VeletaError::InvalidFrequencyFormat { .. }));

    let down = downsample(m, "1w", &Aggregation::Mean, FrequencyGrammar::Extended).unwrap();
    assert_eq!(down.n_rows(), 3);
}
