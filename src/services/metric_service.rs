use std::collections::BTreeMap;
use std::num::NonZeroI64;

use serde::Deserialize;
use tokio::time::Instant;

use crate::errors::{StoreError, ValidationError};
use crate::state::store::KeyStore;

/// Body of `POST /metric/{key}`, e.g. `{ "value": 4 }`.
///
/// A missing `value` reads as zero and is rejected like one.
#[derive(Debug, Deserialize)]
pub struct MetricBody {
    #[serde(default)]
    pub value: f64,
}

/// Parse a request body into the integer the store counts.
///
/// Fractions are rounded half away from zero.
pub fn parse_value(body: &[u8]) -> Result<NonZeroI64, ValidationError> {
    let parsed: MetricBody = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

    let rounded = parsed.value.round();
    // i64::MAX is not representable as f64; 2^63 is the first value past it.
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(ValidationError::OutOfRange(parsed.value));
    }

    NonZeroI64::new(rounded as i64).ok_or(ValidationError::ZeroValue)
}

/// Validate `body` and record it under `key`, observed at `observed_at`.
pub fn record(
    store: &KeyStore<String>,
    key: String,
    body: &[u8],
    observed_at: Instant,
) -> Result<(), ValidationError> {
    let value = parse_value(body)?;
    store.record_observation(key, value, observed_at);
    Ok(())
}

/// Live (value, count) pairs for `key`.
pub fn summary(store: &KeyStore<String>, key: &str) -> Result<BTreeMap<i64, u64>, StoreError> {
    store.query_summary(&key.to_string())
}

/// Sum of live values for `key`.
pub fn sum(store: &KeyStore<String>, key: &str) -> Result<i64, StoreError> {
    store.sum(&key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_value() {
        assert_eq!(parse_value(br#"{"value":4}"#).unwrap().get(), 4);
        assert_eq!(parse_value(br#"{"value":-12}"#).unwrap().get(), -12);
    }

    #[test]
    fn rounds_fractional_values() {
        assert_eq!(parse_value(br#"{"value":2.5}"#).unwrap().get(), 3);
        assert_eq!(parse_value(br#"{"value":-2.5}"#).unwrap().get(), -3);
        assert_eq!(parse_value(br#"{"value":7.4}"#).unwrap().get(), 7);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_value(br#"{"value:3"#),
            Err(ValidationError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_value(br#"{"value":"three"}"#),
            Err(ValidationError::MalformedBody(_))
        ));
    }

    #[test]
    fn rejects_values_rounding_to_zero() {
        assert_eq!(parse_value(br#"{"value":0}"#), Err(ValidationError::ZeroValue));
        assert_eq!(parse_value(br#"{"value":0.4}"#), Err(ValidationError::ZeroValue));
        assert_eq!(parse_value(br#"{"value":-0.49}"#), Err(ValidationError::ZeroValue));
    }

    #[test]
    fn missing_value_field_counts_as_zero() {
        assert_eq!(parse_value(br#"{"val":3}"#), Err(ValidationError::ZeroValue));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            parse_value(br#"{"value":1e300}"#),
            Err(ValidationError::OutOfRange(1e300))
        );
    }
}
