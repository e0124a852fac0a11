//! Run the staged pipeline against the deterministic mock source and print
//! a few scenario rows.
//!
//! ```bash
//! cargo run -p veleta --example mock_scenarios
//! ```

use std::sync::Arc;

use veleta::{Veleta, VeletaError};
use veleta_mock::MockSource;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), VeletaError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = serde_json::from_str(
        r#"{
            "source": {
                "initial_year": 2020,
                "hours_ahead": 48,
                "data_source": "local_csv",
                "options": ["esios", "local_csv"]
            },
            "adjustment": {
                "policy": "strict",
                "by_year": { "2020": 5.0, "2021": 0.0, "2022": -3.0 }
            },
            "downsampling": { "frequency": "2h", "aggregation": "mean" },
            "sampling": { "samples": 10, "distribution": "truncnorm" }
        }"#,
    )
    .map_err(|e| VeletaError::Data(e.to_string()))?;

    let veleta = Veleta::builder()
        .with_source(Arc::new(MockSource::new()))
        .with_config(config)
        .build()?;

    let init = chrono::NaiveDate::from_ymd_opt(2023, 6, 1)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .ok_or_else(|| VeletaError::InvalidArg("bad init datetime".into()))?;

    let scenarios = veleta.run(init).await?;
    println!("{} rows x {} samples", scenarios.n_rows(), scenarios.samples());
    for (ts, row) in scenarios.index().iter().zip(scenarios.rows()).take(5) {
        println!("{ts}  {row:.1?}");
    }
    Ok(())
}
