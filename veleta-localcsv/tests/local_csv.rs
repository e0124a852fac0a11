use std::io::Write;

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use veleta_core::{IndicatorSource, TimeTruncation, VeletaError};
use veleta_localcsv::LocalCsvSource;

const FORMAT: &str = "%Y-%m-%d %H:%M";

fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn filters_rows_to_the_half_open_window() {
    let file = write_csv(
        "datetime,value\n\
         2021-01-01 00:00,10.0\n\
         2021-01-01 01:00,11.0\n\
         2021-01-01 02:00,12.0\n\
         2021-01-01 03:00,13.0\n",
    );
    let source = LocalCsvSource::new(file.path(), "datetime", FORMAT);
    let table = source
        .fetch_indicator_series(&[], at(2021, 1, 1, 1), at(2021, 1, 1, 3), TimeTruncation::Hour)
        .await
        .unwrap();

    assert_eq!(table.columns(), ["datetime", "value"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0], ["2021-01-01 01:00", "11.0"]);
    assert_eq!(table.rows()[1], ["2021-01-01 02:00", "12.0"]);
}

#[tokio::test]
async fn extra_columns_survive_the_filter() {
    let file = write_csv(
        "datetime,value,quality\n\
         2021-01-01 00:00,10.0,ok\n\
         2021-01-01 01:00,11.0,ok\n",
    );
    let source = LocalCsvSource::new(file.path(), "datetime", FORMAT);
    let table = source
        .fetch_indicator_series(&[], at(2021, 1, 1, 0), at(2021, 1, 2, 0), TimeTruncation::Hour)
        .await
        .unwrap();
    assert_eq!(table.columns(), ["datetime", "value", "quality"]);
    assert_eq!(table.len(), 2);
}

#[tokio::test]
async fn missing_timestamp_column_is_reported_by_name() {
    let file = write_csv("when,value\n2021-01-01 00:00,10.0\n");
    let source = LocalCsvSource::new(file.path(), "datetime", FORMAT);
    let err = source
        .fetch_indicator_series(&[], at(2021, 1, 1, 0), at(2021, 1, 2, 0), TimeTruncation::Hour)
        .await
        .unwrap_err();
    match err {
        VeletaError::MissingField { field } => assert_eq!(field, "datetime"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_timestamp_cell_is_a_data_error() {
    let file = write_csv("datetime,value\nnot-a-date,10.0\n");
    let source = LocalCsvSource::new(file.path(), "datetime", FORMAT);
    let err = source
        .fetch_indicator_series(&[], at(2021, 1, 1, 0), at(2021, 1, 2, 0), TimeTruncation::Hour)
        .await
        .unwrap_err();
    assert!(matches!(err, VeletaError::Data(_)));
}

#[tokio::test]
async fn missing_file_is_a_source_error() {
    let source = LocalCsvSource::new("/nonexistent/observations.csv", "datetime", FORMAT);
    let err = source
        .fetch_indicator_series(&[], at(2021, 1, 1, 0), at(2021, 1, 2, 0), TimeTruncation::Hour)
        .await
        .unwrap_err();
    match err {
        VeletaError::Source { source_name, .. } => assert_eq!(source_name, "veleta-localcsv"),
        other => panic!("expected Source error, got {other:?}"),
    }
}
