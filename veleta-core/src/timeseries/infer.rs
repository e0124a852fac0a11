//! Row-spacing inference for aligned matrices.

use chrono::{NaiveDateTime, TimeDelta};

/// Estimate a representative step (in seconds) from positive adjacent deltas
/// of a sorted row index.
///
/// Prefer the mode (most frequent positive delta); if there is no unique
/// mode, return the lower median so the result is always an actually
/// observed cadence. Returns `None` if fewer than two distinct row keys are
/// present.
#[must_use]
pub fn infer_step_seconds(index: &[NaiveDateTime]) -> Option<i64> {
    if index.len() < 2 {
        return None;
    }

    let mut deltas: Vec<i64> = Vec::with_capacity(index.len().saturating_sub(1));
    let mut last = index[0];
    for &ts in index.iter().skip(1) {
        let dt: TimeDelta = ts - last;
        if dt > TimeDelta::zero() {
            deltas.push(dt.num_seconds());
            last = ts;
        }
    }
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut best_delta: i64 = deltas[0];
    let mut best_count: usize = 0;
    let mut num_best_candidates: usize = 0;

    let mut cur_delta: i64 = deltas[0];
    let mut cur_count: usize = 1;
    for &d in deltas.iter().skip(1) {
        if d == cur_delta {
            cur_count += 1;
            continue;
        }
        if cur_count > best_count {
            best_count = cur_count;
            best_delta = cur_delta;
            num_best_candidates = 1;
        } else if cur_count == best_count {
            num_best_candidates = num_best_candidates.saturating_add(1);
        }
        cur_delta = d;
        cur_count = 1;
    }
    if cur_count > best_count {
        best_delta = cur_delta;
        num_best_candidates = 1;
    } else if cur_count == best_count {
        num_best_candidates = num_best_candidates.saturating_add(1);
    }

    if num_best_candidates == 1 {
        return Some(best_delta);
    }

    // Lower median
    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        Some(deltas[mid - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn t(sec: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            + chrono::Duration::seconds(sec)
    }

    #[test]
    fn unique_mode_wins() {
        // Deltas: 60, 60, 60, 120, 180 -> unique mode 60
        let index = vec![t(0), t(60), t(120), t(180), t(300), t(480)];
        assert_eq!(infer_step_seconds(&index), Some(60));
    }

    #[test]
    fn tie_falls_back_to_lower_median() {
        // Deltas: 60, 60, 120, 120 -> no unique mode, lower median 60
        let index = vec![t(0), t(60), t(120), t(240), t(360)];
        assert_eq!(infer_step_seconds(&index), Some(60));
    }

    #[test]
    fn too_short_is_none() {
        assert_eq!(infer_step_seconds(&[]), None);
        assert_eq!(infer_step_seconds(&[t(0)]), None);
    }
}
