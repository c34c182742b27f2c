use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::Rejection;
use crate::model::{is_plausible_epoch, EpochUnit, Extraction};

// ASCII only: `\d` would also accept other Unicode decimal digits.
static CANDIDATE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{10,13}").expect("candidate pattern is valid"));

/// Returns the first plausible Unix timestamp in `input` as
/// `YYYY-MM-DDTHH:MM:SSZ`, or `None`.
pub fn extract_timestamp(input: &str) -> Option<String> {
    inspect(input).ok().map(|extraction| extraction.to_iso8601())
}

/// Same scan as [`extract_timestamp`], keeping the intermediate values and
/// the reason for a rejection.
pub fn inspect(input: &str) -> Result<Extraction, Rejection> {
    let candidate = CANDIDATE_DIGITS
        .find(input)
        .ok_or(Rejection::NoCandidate)?;
    let digits = candidate.as_str();

    // At most 13 digits, so this always fits.
    let value: u64 = digits.parse().map_err(|_| Rejection::NoCandidate)?;

    // Leading zeros shorten the canonical form: "0123456789012" is 12 digits.
    let canonical_len = value.to_string().len();
    let unit = EpochUnit::from_canonical_len(canonical_len).ok_or_else(|| {
        Rejection::UnsupportedLength {
            digits: digits.to_string(),
            canonical_len,
        }
    })?;

    let seconds = unit.to_seconds(value);
    if !is_plausible_epoch(seconds) {
        return Err(Rejection::OutOfRange { seconds });
    }

    let instant = i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(Rejection::Unrepresentable { seconds })?;

    Ok(Extraction {
        digits: digits.to_string(),
        span: candidate.range(),
        value,
        unit,
        seconds,
        instant,
    })
}
