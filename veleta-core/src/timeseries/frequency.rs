//! Frequency-string parsing and normalization.
//!
//! A frequency is written `<magnitude><unit>`, magnitude an integer with an
//! optional fraction, unit a single case-sensitive letter. A bare unit letter
//! implies magnitude 1 (`"h"` == `"1h"`). Which letters are legal is a
//! configuration decision, see [`FrequencyGrammar`].

use crate::error::VeletaError;
pub use veleta_types::FrequencyGrammar;

const STANDARD_UNITS: &str = "s, m, h, d";
const EXTENDED_UNITS: &str = "s, m, h, d, w";

/// A sampling period, normalized to a whole number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Frequency {
    seconds: i64,
}

impl Frequency {
    /// Parse a frequency string under the given grammar.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::InvalidFrequencyFormat)` when the string
    /// does not match `<integer>[.<fraction>]<unit>`, when the unit letter is
    /// not in the grammar's alphabet, or when the period does not normalize
    /// to a positive whole number of seconds.
    pub fn parse(input: &str, grammar: FrequencyGrammar) -> Result<Self, VeletaError> {
        let units = grammar_units(grammar);
        let reject = || VeletaError::InvalidFrequencyFormat {
            input: input.to_string(),
            units,
        };

        let split = input
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(reject)?;
        let (magnitude, unit) = input.split_at(split);
        let unit_seconds = unit_seconds(unit, grammar).ok_or_else(reject)?;
        let magnitude = parse_magnitude(magnitude).ok_or_else(reject)?;

        let seconds = magnitude * unit_seconds as f64;
        if seconds < 1.0 || (seconds - seconds.round()).abs() > 1e-9 {
            return Err(reject());
        }
        #[allow(clippy::cast_possible_truncation)]
        let seconds = seconds.round() as i64;
        Ok(Self { seconds })
    }

    /// Construct directly from a whole-second period.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::InvalidArg)` for non-positive periods.
    pub fn from_seconds(seconds: i64) -> Result<Self, VeletaError> {
        if seconds <= 0 {
            return Err(VeletaError::InvalidArg(format!(
                "frequency must be a positive number of seconds, got {seconds}"
            )));
        }
        Ok(Self { seconds })
    }

    /// The normalized period in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.seconds
    }
}

/// Magnitude grammar: `\d+` or `\d+.\d+`; empty means 1 (bare unit letter).
fn parse_magnitude(s: &str) -> Option<f64> {
    if s.is_empty() {
        return Some(1.0);
    }
    let mut parts = s.splitn(2, '.');
    let int = parts.next()?;
    if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = parts.next() {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    s.parse::<f64>().ok()
}

fn unit_seconds(unit: &str, grammar: FrequencyGrammar) -> Option<i64> {
    match unit {
        "s" => Some(1),
        "m" => Some(60),
        "h" => Some(3_600),
        "d" => Some(86_400),
        "w" if grammar == FrequencyGrammar::Extended => Some(604_800),
        _ => None,
    }
}

const fn grammar_units(grammar: FrequencyGrammar) -> &'static str {
    match grammar {
        FrequencyGrammar::Extended => EXTENDED_UNITS,
        _ => STANDARD_UNITS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(input: &str) -> i64 {
        Frequency::parse(input, FrequencyGrammar::Standard)
            .unwrap()
            .seconds()
    }

    #[test]
    fn parses_plain_magnitudes() {
        assert_eq!(secs("2m"), 120);
        assert_eq!(secs("45s"), 45);
        assert_eq!(secs("3h"), 10_800);
        assert_eq!(secs("1d"), 86_400);
    }

    #[test]
    fn bare_unit_means_one() {
        assert_eq!(secs("h"), 3_600);
        assert_eq!(secs("d"), 86_400);
    }

    #[test]
    fn fractional_magnitudes_resolve_to_whole_seconds() {
        assert_eq!(secs("0.5m"), 30);
        assert_eq!(secs("1.5h"), 5_400);
    }

    #[test]
    fn rejects_sub_second_and_malformed() {
        for bad in ["0.5s", "", "m5", "5", "5x", "5M", "1..5h", ".5h", "5.h", "-2m", "2 m"] {
            assert!(
                Frequency::parse(bad, FrequencyGrammar::Standard).is_err(),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn weeks_require_the_extended_grammar() {
        assert!(Frequency::parse("2w", FrequencyGrammar::Standard).is_err());
        assert_eq!(
            Frequency::parse("2w", FrequencyGrammar::Extended)
                .unwrap()
                .seconds(),
            1_209_600
        );
    }
}
