//! Numeric coercion for values the backend serializes loosely.
//!
//! Every numeric field coming off the wire passes through [`normalize_number`]
//! before anything parses or compares it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric value as the backend sends it: usually a decimal string,
/// sometimes a plain JSON number, occasionally something else entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawNumber::Number(n) => write!(f, "{n}"),
            RawNumber::Text(s) => f.write_str(s),
            RawNumber::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

impl From<String> for RawNumber {
    fn from(value: String) -> Self {
        RawNumber::Text(value)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

/// Stringify `raw` and turn every comma into a period.
///
/// `None` becomes the empty string. No parsing happens here.
pub fn normalize_number<T: fmt::Display + ?Sized>(raw: Option<&T>) -> String {
    match raw {
        Some(value) => value.to_string().replace(',', "."),
        None => String::new(),
    }
}

/// Parse an already normalized string into a finite `f64`.
///
/// The whole trimmed string must be a number; `NaN` and infinities are rejected.
pub fn parse_finite(normalized: &str) -> Option<f64> {
    normalized
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// A coerced numeric field that remembers whether the backend gave us a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Usable for arithmetic; `0.0` when `has_value` is false.
    pub value: f64,
    pub has_value: bool,
}

impl Measurement {
    pub const fn known(value: f64) -> Self {
        Self { value, has_value: true }
    }

    pub const fn unknown() -> Self {
        Self { value: 0.0, has_value: false }
    }

    /// Coerce a raw wire value through the normalizer.
    pub fn from_raw<T: fmt::Display + ?Sized>(raw: Option<&T>) -> Self {
        parse_finite(&normalize_number(raw)).map_or_else(Self::unknown, Self::known)
    }

    pub fn get(&self) -> Option<f64> {
        self.has_value.then_some(self.value)
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_becomes_period() {
        assert_eq!(normalize_number(Some("12,5")), "12.5");
    }

    #[test]
    fn every_comma_is_replaced() {
        assert_eq!(normalize_number(Some("1,000,5")), "1.000.5");
    }

    #[test]
    fn absent_value_is_empty_string() {
        assert_eq!(normalize_number::<str>(None), "");
        assert_eq!(normalize_number::<RawNumber>(None), "");
    }

    #[test]
    fn numbers_are_stringified() {
        assert_eq!(normalize_number(Some(&RawNumber::Number(22.5))), "22.5");
        assert_eq!(normalize_number(Some(&7)), "7");
    }

    #[test]
    fn parse_finite_rejects_garbage_and_infinities() {
        assert_eq!(parse_finite(" 12.5 "), Some(12.5));
        assert_eq!(parse_finite(""), None);
        assert_eq!(parse_finite("12abc"), None);
        assert_eq!(parse_finite("NaN"), None);
        assert_eq!(parse_finite("inf"), None);
        assert_eq!(parse_finite("-infinity"), None);
    }

    #[test]
    fn measurement_marks_unknown_values() {
        let m = Measurement::from_raw(Some("n/a"));
        assert!(!m.has_value);
        assert_eq!(m.value, 0.0);
        assert_eq!(m.get(), None);

        let m = Measurement::from_raw(Some("1013,25"));
        assert_eq!(m.get(), Some(1013.25));

        let m = Measurement::from_raw::<RawNumber>(None);
        assert_eq!(m, Measurement::unknown());
    }

    #[test]
    fn raw_number_reads_strings_numbers_and_junk() {
        let values: Vec<RawNumber> =
            serde_json::from_str(r#"["22.5", 3, true]"#).expect("valid json");

        assert_eq!(values[0], RawNumber::Text("22.5".into()));
        assert_eq!(values[1], RawNumber::Number(3.0));
        assert_eq!(Measurement::from_raw(Some(&values[2])), Measurement::unknown());
    }
}
