//! Synthetic scenario generation from a [`YearMatrix`].

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::VeletaError;
use crate::table::{ScenarioTable, YearMatrix};

/// Distribution families accepted by [`generate_scenarios`].
pub const DISTRIBUTION_FAMILIES: &[&str] = &["truncnorm"];

/// Resamples drawn per candidate before giving up on rejection sampling.
const MAX_REJECTION_TRIES: usize = 1_000;

/// Draw `sample_count` synthetic values per row using the process-wide RNG.
///
/// See [`generate_scenarios_with_rng`] for the contract; tests wanting
/// determinism should seed an `rng` and use that entry point.
///
/// # Errors
/// Same conditions as [`generate_scenarios_with_rng`].
pub fn generate_scenarios(
    matrix: &YearMatrix,
    sample_count: usize,
    family: &str,
) -> Result<ScenarioTable, VeletaError> {
    generate_scenarios_with_rng(matrix, sample_count, family, &mut rand::rng())
}

/// Draw `sample_count` synthetic values per row of the matrix.
///
/// For every row, independently: the empirical mean and population standard
/// deviation (divisor `N`) are computed across the row's observed year
/// cells, and `sample_count` draws are taken from a normal distribution with
/// that location/scale, truncated to `[0, mean + 2·std]`. Rows do not
/// influence each other; no cross-row correlation is modeled.
///
/// Degenerate rows with `std == 0` yield `sample_count` copies of the mean.
/// The output keeps the input's row keys in the input's order; columns are
/// anonymous sample indices `0..sample_count`. `sample_count == 0` is legal
/// and produces a table with zero sample columns.
///
/// # Errors
/// - `Err(VeletaError::UnsupportedDistribution)` for any family other than
///   `"truncnorm"`, enumerating the supported set.
/// - `Err(VeletaError::Data)` if a row has no observed cells, or if its
///   truncation interval is empty (`mean + 2·std <= 0` with `std > 0`).
pub fn generate_scenarios_with_rng<R: Rng + ?Sized>(
    matrix: &YearMatrix,
    sample_count: usize,
    family: &str,
    rng: &mut R,
) -> Result<ScenarioTable, VeletaError> {
    if family != "truncnorm" {
        return Err(VeletaError::UnsupportedDistribution {
            family: family.to_string(),
            supported: DISTRIBUTION_FAMILIES,
        });
    }

    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(matrix.n_rows());
    for (row, ts) in matrix.index().iter().enumerate() {
        let observations = matrix.row_observations(row);
        if observations.is_empty() {
            return Err(VeletaError::Data(format!(
                "row {ts} has no observed values to fit a distribution"
            )));
        }
        let (mean, std) = mean_and_population_std(&observations);

        if std == 0.0 {
            rows.push(vec![mean; sample_count]);
            continue;
        }

        let upper = mean + 2.0 * std;
        if upper <= 0.0 {
            return Err(VeletaError::Data(format!(
                "row {ts}: truncation interval [0, {upper}] is empty for mean {mean} and std {std}"
            )));
        }
        let normal = Normal::new(mean, std)
            .map_err(|e| VeletaError::Data(format!("row {ts}: invalid distribution: {e}")))?;

        let draws = (0..sample_count)
            .map(|_| draw_truncated(&normal, 0.0, upper, rng))
            .collect();
        rows.push(draws);
    }

    Ok(ScenarioTable::new(
        matrix.index().to_vec(),
        rows,
        sample_count,
    ))
}

/// Empirical mean and population standard deviation (divisor `N`, not `N-1`).
fn mean_and_population_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// One draw from the normal restricted to `[lo, hi]`, by rejection.
///
/// The acceptance region always has positive mass when the bounds are valid,
/// but a far-off location can make it arbitrarily small; after
/// `MAX_REJECTION_TRIES` the draw degrades to uniform-in-bounds so the
/// bounds invariant still holds.
fn draw_truncated<R: Rng + ?Sized>(normal: &Normal<f64>, lo: f64, hi: f64, rng: &mut R) -> f64 {
    for _ in 0..MAX_REJECTION_TRIES {
        let v = normal.sample(rng);
        if (lo..=hi).contains(&v) {
            return v;
        }
    }
    rng.random_range(lo..=hi)
}
