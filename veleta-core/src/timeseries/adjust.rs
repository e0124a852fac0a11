//! Per-year percentage adjustments over a [`YearMatrix`].

use std::collections::BTreeMap;

use crate::error::VeletaError;
use crate::table::YearMatrix;
pub use veleta_types::AdjustmentPolicy;

/// Mapping from calendar year to a percentage delta; `+3` means "scale the
/// year's column by `1.03`".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentMap {
    by_year: BTreeMap<i32, f64>,
}

impl AdjustmentMap {
    /// Build from an already-typed map.
    #[must_use]
    pub fn new(by_year: BTreeMap<i32, f64>) -> Self {
        Self { by_year }
    }

    /// Build from a configuration map whose keys are still strings (the JSON
    /// form). Every key must parse as an integer year.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::InvalidAdjustmentKey)` naming the first key
    /// that is not an integer.
    pub fn from_config(raw: &BTreeMap<String, f64>) -> Result<Self, VeletaError> {
        let mut by_year = BTreeMap::new();
        for (key, pct) in raw {
            let year: i32 = key
                .trim()
                .parse()
                .map_err(|_| VeletaError::InvalidAdjustmentKey { key: key.clone() })?;
            by_year.insert(year, *pct);
        }
        Ok(Self { by_year })
    }

    /// Percentage delta for a year, if present.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<f64> {
        self.by_year.get(&year).copied()
    }

    /// Covered years, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    /// True if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

/// Scale every column of the matrix by its year's adjustment factor.
///
/// Validation runs before anything is touched: the matrix's column years
/// must be contiguous, and under [`AdjustmentPolicy::Strict`] every year of
/// the span `[min, max]` must have an entry. Under
/// [`AdjustmentPolicy::Lenient`] uncovered years are left unscaled (and
/// logged when the `tracing` feature is on).
///
/// The matrix is consumed and the adjusted matrix returned, so the result is
/// usable independently of the input; callers wanting both versions clone
/// first.
///
/// # Errors
/// - `Err(VeletaError::NonContiguousYears)` if the column years have gaps.
/// - `Err(VeletaError::IncompleteAdjustmentCoverage)` under the strict
///   policy, listing the uncovered years.
pub fn apply_annual_adjustment(
    mut matrix: YearMatrix,
    adjustments: &AdjustmentMap,
    policy: AdjustmentPolicy,
) -> Result<YearMatrix, VeletaError> {
    matrix.ensure_contiguous_years()?;

    if let Some((first, last)) = matrix.year_span() {
        let missing: Vec<i32> = (first..=last)
            .filter(|y| adjustments.get(*y).is_none())
            .collect();
        if !missing.is_empty() {
            match policy {
                AdjustmentPolicy::Strict => {
                    return Err(VeletaError::IncompleteAdjustmentCoverage { missing });
                }
                _ => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(?missing, "leaving uncovered years unscaled");
                }
            }
        }
    }

    for (year, column) in matrix.columns_mut() {
        let Some(pct) = adjustments.get(*year) else {
            continue;
        };
        let factor = 1.0 + pct / 100.0;
        for cell in column.iter_mut() {
            if let Some(v) = cell.as_mut() {
                *v *= factor;
            }
        }
    }

    Ok(matrix)
}
