//! Award timestamp normalization.
//!
//! The remote service has emitted timestamps with anywhere from zero to nine
//! (and occasionally more) fractional-second digits, with and without a
//! trailing zone designator. Parsing is layered from strictest to most
//! permissive, and every path converges on UTC at microsecond precision so
//! that ordering is never corrupted by the representation.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::Error;

/// Fraction digits every parsed instant is truncated to.
const SUBSEC_DIGITS: u16 = 6;

/// Parse one raw award timestamp into a UTC instant.
///
/// Attempts, in order:
/// 1. strict RFC 3339, where a bare trailing `Z` reads as `+00:00`;
/// 2. the fractional component normalized to exactly six digits (truncated
///    if longer, right-padded with zeros if shorter) and a `Z` suffix
///    re-synthesized if missing, parsed with a fixed-width format;
/// 3. the fractional component stripped entirely and parsed at whole-second
///    precision.
///
/// Only when all three fail is the record unparseable; that failure is fatal
/// to the aggregation pass which requested the parse.
pub fn parse_award_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc).trunc_subsecs(SUBSEC_DIGITS));
    }

    let normalized = normalize_fraction(raw);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.6fZ") {
        return Ok(naive.and_utc());
    }

    let whole_seconds = strip_fraction(raw);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&whole_seconds, "%Y-%m-%dT%H:%M:%SZ") {
        return Ok(naive.and_utc());
    }

    Err(Error::DateParseError(raw.to_string()))
}

/// Rewrite `raw` so the fractional component is exactly six digits and a
/// trailing `Z` is present. Any non-digit tail after the fraction (an offset
/// suffix) is dropped; all inputs are treated as UTC on this path.
fn normalize_fraction(raw: &str) -> String {
    let body = raw.strip_suffix('Z').unwrap_or(raw);
    match body.split_once('.') {
        Some((whole, tail)) => {
            let mut fraction: String = tail.chars().take_while(char::is_ascii_digit).collect();
            fraction.truncate(SUBSEC_DIGITS as usize);
            while fraction.len() < SUBSEC_DIGITS as usize {
                fraction.push('0');
            }
            format!("{whole}.{fraction}Z")
        }
        None => format!("{body}.000000Z"),
    }
}

/// Drop any fractional component, keeping a trailing `Z`.
fn strip_fraction(raw: &str) -> String {
    let body = raw.strip_suffix('Z').unwrap_or(raw);
    let whole = body.split('.').next().unwrap_or(body);
    format!("{whole}Z")
}
