//! Row-resolution changes over a [`YearMatrix`]: interpolation to a finer
//! grid, aggregation to a coarser one.
//!
//! Both directions parse the requested frequency against the configured
//! grammar, infer the series' current step from its row spacing, and reject
//! a request pointing the wrong way. Equality is rejected too: a resample
//! that changes nothing is a caller mistake, not a no-op.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};

use crate::error::VeletaError;
use crate::table::YearMatrix;
use crate::timeseries::frequency::{Frequency, FrequencyGrammar};
use crate::timeseries::infer::infer_step_seconds;

/// Interpolation methods accepted by [`upsample`].
pub const INTERPOLATION_METHODS: &[&str] = &["polynomial", "spline"];

/// Named aggregations accepted by [`Aggregation::parse`].
pub const AGGREGATION_NAMES: &[&str] = &["mean", "sum", "min", "max", "first", "last"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterpolationMethod {
    Polynomial,
    Spline,
}

impl InterpolationMethod {
    fn parse(name: &str) -> Result<Self, VeletaError> {
        match name {
            "polynomial" => Ok(Self::Polynomial),
            "spline" => Ok(Self::Spline),
            other => Err(VeletaError::UnsupportedMethod {
                method: other.to_string(),
                supported: INTERPOLATION_METHODS,
            }),
        }
    }
}

/// Reducer applied to each bucket of original rows when downsampling.
#[derive(Clone)]
pub enum Aggregation {
    /// Arithmetic mean of the bucket's observed values.
    Mean,
    /// Sum of the bucket's observed values.
    Sum,
    /// Smallest observed value.
    Min,
    /// Largest observed value.
    Max,
    /// Earliest observed value.
    First,
    /// Latest observed value.
    Last,
    /// User-supplied reducer over the bucket's observed values (never called
    /// with an empty slice).
    Custom(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>),
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::First => "first",
            Self::Last => "last",
            Self::Custom(_) => "custom",
        };
        f.write_str(name)
    }
}

impl Aggregation {
    /// Resolve a named aggregation.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::UnsupportedMethod)` enumerating
    /// [`AGGREGATION_NAMES`] for unknown names.
    pub fn parse(name: &str) -> Result<Self, VeletaError> {
        match name {
            "mean" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => Err(VeletaError::UnsupportedMethod {
                method: other.to_string(),
                supported: AGGREGATION_NAMES,
            }),
        }
    }

    /// Reduce one bucket. `values` is never empty and is in row-key order.
    fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Sum => values.iter().sum(),
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::First => values[0],
            Self::Last => values[values.len() - 1],
            Self::Custom(f) => f(values),
        }
    }
}

/// Parse the requested frequency and compare it against the series' inferred
/// step, enforcing the strict direction the caller needs.
fn check_direction(
    matrix: &YearMatrix,
    frequency: &str,
    grammar: FrequencyGrammar,
    finer: bool,
) -> Result<(i64, i64), VeletaError> {
    let requested = Frequency::parse(frequency, grammar)?.seconds();
    let current = infer_step_seconds(matrix.index()).ok_or_else(|| {
        VeletaError::Data(
            "cannot infer the series frequency from fewer than two distinct rows".to_string(),
        )
    })?;

    let ok = if finer {
        requested < current
    } else {
        requested > current
    };
    if !ok {
        return Err(VeletaError::ResolutionDirection {
            requested: frequency.to_string(),
            requested_secs: requested,
            current_secs: current,
            needed: if finer { "finer" } else { "coarser" },
        });
    }
    Ok((requested, current))
}

/// Interpolate the matrix onto a strictly finer row grid.
///
/// The new index runs from the first to the last existing row key in steps
/// of the requested frequency. Each year column is interpolated
/// independently from its observed cells; columns with no observations stay
/// entirely missing.
///
/// Methods: `"polynomial"` (local Lagrange polynomial of the given order)
/// and `"spline"` (order 1 = linear, order 3 = natural cubic).
///
/// # Errors
/// - `Err(VeletaError::InvalidFrequencyFormat)` for a malformed frequency.
/// - `Err(VeletaError::ResolutionDirection)` if the request is not strictly
///   finer than the inferred series frequency.
/// - `Err(VeletaError::UnsupportedMethod)` for unknown method names.
/// - `Err(VeletaError::InvalidArg)` for unusable orders or columns with too
///   few observations for the requested order.
pub fn upsample(
    matrix: YearMatrix,
    frequency: &str,
    method: &str,
    order: u32,
    grammar: FrequencyGrammar,
) -> Result<YearMatrix, VeletaError> {
    let (step, _) = check_direction(&matrix, frequency, grammar, true)?;
    let method = InterpolationMethod::parse(method)?;
    if order == 0 {
        return Err(VeletaError::InvalidArg(
            "interpolation order must be at least 1".to_string(),
        ));
    }
    if method == InterpolationMethod::Spline && order != 1 && order != 3 {
        return Err(VeletaError::InvalidArg(format!(
            "spline interpolation supports orders 1 (linear) and 3 (natural cubic), got {order}"
        )));
    }

    let (index, columns) = matrix.into_parts();
    let origin = index[0];
    let last = index[index.len() - 1];

    let mut new_index: Vec<NaiveDateTime> = Vec::new();
    let mut ts = origin;
    while ts <= last {
        new_index.push(ts);
        ts += Duration::seconds(step);
    }

    let xs_old: Vec<f64> = index
        .iter()
        .map(|t| (*t - origin).num_seconds() as f64)
        .collect();
    let xs_new: Vec<f64> = new_index
        .iter()
        .map(|t| (*t - origin).num_seconds() as f64)
        .collect();

    let mut new_columns: BTreeMap<i32, Vec<Option<f64>>> = BTreeMap::new();
    for (year, column) in columns {
        let mut support: Vec<(f64, f64)> = Vec::with_capacity(column.len());
        for (x, cell) in xs_old.iter().zip(&column) {
            if let Some(v) = cell {
                support.push((*x, *v));
            }
        }
        let new_column = if support.is_empty() {
            vec![None; xs_new.len()]
        } else {
            let needed = order as usize + 1;
            if support.len() < needed {
                return Err(VeletaError::InvalidArg(format!(
                    "column {year} has {} observed points, order-{order} interpolation needs {needed}",
                    support.len()
                )));
            }
            let interpolated: Vec<f64> = match (method, order) {
                (InterpolationMethod::Polynomial, k) => xs_new
                    .iter()
                    .map(|&x| lagrange_local(&support, x, k as usize))
                    .collect(),
                (InterpolationMethod::Spline, 1) => {
                    xs_new.iter().map(|&x| linear(&support, x)).collect()
                }
                (InterpolationMethod::Spline, _) => natural_cubic(&support, &xs_new),
            };
            interpolated.into_iter().map(Some).collect()
        };
        new_columns.insert(year, new_column);
    }

    YearMatrix::new(new_index, new_columns)
}

/// Aggregate the matrix onto a strictly coarser row grid.
///
/// Existing rows are grouped into buckets of the requested length anchored
/// at the first row key; each year column is reduced per bucket with the
/// given aggregation over its observed values. A bucket with no observed
/// values for a year stays missing. Only buckets containing at least one
/// original row appear in the result.
///
/// # Errors
/// - `Err(VeletaError::InvalidFrequencyFormat)` for a malformed frequency.
/// - `Err(VeletaError::ResolutionDirection)` if the request is not strictly
///   coarser than the inferred series frequency.
pub fn downsample(
    matrix: YearMatrix,
    frequency: &str,
    aggregation: &Aggregation,
    grammar: FrequencyGrammar,
) -> Result<YearMatrix, VeletaError> {
    let (step, _) = check_direction(&matrix, frequency, grammar, false)?;

    let (index, columns) = matrix.into_parts();
    let origin = index[0];

    let mut new_index: Vec<NaiveDateTime> = Vec::new();
    let mut row_bucket: Vec<usize> = Vec::with_capacity(index.len());
    for ts in &index {
        let offset = (*ts - origin).num_seconds();
        let bucket = origin + Duration::seconds(offset - offset.rem_euclid(step));
        if new_index.last() != Some(&bucket) {
            new_index.push(bucket);
        }
        row_bucket.push(new_index.len() - 1);
    }

    let mut new_columns: BTreeMap<i32, Vec<Option<f64>>> = BTreeMap::new();
    for (year, column) in columns {
        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); new_index.len()];
        for (cell, bucket) in column.iter().zip(&row_bucket) {
            if let Some(v) = cell {
                buckets[*bucket].push(*v);
            }
        }
        let new_column = buckets
            .into_iter()
            .map(|values| {
                if values.is_empty() {
                    None
                } else {
                    Some(aggregation.apply(&values))
                }
            })
            .collect();
        new_columns.insert(year, new_column);
    }

    YearMatrix::new(new_index, new_columns)
}

/// Evaluate the Lagrange polynomial through the `order + 1` support points
/// nearest to `x`. Points are sorted by abscissa; the window is clamped at
/// the series edges, which makes boundary evaluation an extrapolation from
/// the edge window.
fn lagrange_local(support: &[(f64, f64)], x: f64, order: usize) -> f64 {
    let window = order + 1;
    let n = support.len();
    let pos = support.partition_point(|(sx, _)| *sx < x);
    let start = pos.saturating_sub(window / 2).min(n - window);
    let points = &support[start..start + window];

    let mut acc = 0.0;
    for (i, (xi, yi)) in points.iter().enumerate() {
        let mut basis = 1.0;
        for (j, (xj, _)) in points.iter().enumerate() {
            if i != j {
                basis *= (x - xj) / (xi - xj);
            }
        }
        acc += yi * basis;
    }
    acc
}

/// Piecewise-linear evaluation; outside the support range the edge segment
/// is extended.
fn linear(support: &[(f64, f64)], x: f64) -> f64 {
    let n = support.len();
    if n == 1 {
        return support[0].1;
    }
    let pos = support.partition_point(|(sx, _)| *sx < x);
    let seg = pos.clamp(1, n - 1);
    let (x0, y0) = support[seg - 1];
    let (x1, y1) = support[seg];
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Natural cubic spline through the support points, evaluated at `xs`.
/// Second derivatives at both ends are zero; outside the support range the
/// edge cubic segment is extended.
fn natural_cubic(support: &[(f64, f64)], xs: &[f64]) -> Vec<f64> {
    let n = support.len();
    if n == 2 {
        return xs.iter().map(|&x| linear(support, x)).collect();
    }

    // Thomas algorithm on the tridiagonal system for the second derivatives.
    let h: Vec<f64> = support.windows(2).map(|w| w[1].0 - w[0].0).collect();
    let mut sub = vec![0.0; n];
    let mut diag = vec![1.0; n];
    let mut sup = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    for i in 1..n - 1 {
        sub[i] = h[i - 1];
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        sup[i] = h[i];
        rhs[i] = 6.0
            * ((support[i + 1].1 - support[i].1) / h[i]
                - (support[i].1 - support[i - 1].1) / h[i - 1]);
    }
    for i in 1..n {
        let w = sub[i] / diag[i - 1];
        diag[i] -= w * sup[i - 1];
        rhs[i] -= w * rhs[i - 1];
    }
    let mut m = vec![0.0; n];
    for i in (1..n - 1).rev() {
        m[i] = (rhs[i] - sup[i] * m[i + 1]) / diag[i];
    }

    xs.iter()
        .map(|&x| {
            let pos = support.partition_point(|(sx, _)| *sx < x);
            let seg = pos.clamp(1, n - 1);
            let (x0, y0) = support[seg - 1];
            let (x1, y1) = support[seg];
            let hi = x1 - x0;
            let a = (x1 - x) / hi;
            let b = (x - x0) / hi;
            a * y0 + b * y1
                + ((a * a * a - a) * m[seg - 1] + (b * b * b - b) * m[seg]) * (hi * hi) / 6.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lagrange_order_one_is_linear() {
        let support = [(0.0, 0.0), (10.0, 20.0)];
        assert!((lagrange_local(&support, 5.0, 1) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn lagrange_recovers_a_quadratic() {
        // y = x^2 through three points
        let support = [(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)];
        assert!((lagrange_local(&support, 1.5, 2) - 2.25).abs() < 1e-12);
    }

    #[test]
    fn cubic_spline_hits_its_knots() {
        let support = [(0.0, 1.0), (1.0, 3.0), (2.0, 2.0), (3.0, 5.0)];
        let xs: Vec<f64> = support.iter().map(|(x, _)| *x).collect();
        let ys = natural_cubic(&support, &xs);
        for ((_, y), got) in support.iter().zip(ys) {
            assert!((y - got).abs() < 1e-9);
        }
    }

    #[test]
    fn unknown_aggregation_is_rejected_with_the_supported_set() {
        let err = Aggregation::parse("median").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("median") && msg.contains("mean"));
    }
}
