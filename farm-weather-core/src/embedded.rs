//! Decoding of nested objects the backend stores as single-quoted dict literals,
//! e.g. `{'lat': '-23.55', 'lon': '-46.63', 'name': 'SP'}`.
//!
//! Quotes are swapped wholesale before JSON decoding. A text value holding an
//! apostrophe (`'name': 'Farmer's Field'`) therefore cannot be decoded and
//! always takes the fallback. Escaping rules are deliberately not guessed.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Why an embedded literal could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("embedded field is absent")]
    Absent,
    #[error("malformed embedded literal: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("embedded {field} is not a finite number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// A decoded value tagged with whether it came from the fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded<T> {
    pub value: T,
    pub is_default: bool,
}

impl<T> Decoded<T> {
    pub fn decoded(value: T) -> Self {
        Self { value, is_default: false }
    }

    pub fn fallback(value: T) -> Self {
        Self { value, is_default: true }
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded { value: f(self.value), is_default: self.is_default }
    }
}

/// Decode `raw` or report why it could not be decoded.
pub fn try_parse_embedded<T: DeserializeOwned>(raw: Option<&str>) -> Result<T, DecodeError> {
    let raw = raw.ok_or(DecodeError::Absent)?;
    let json = raw.replace('\'', "\"");
    Ok(serde_json::from_str(&json)?)
}

/// Decode `raw`, falling back to `fallback` on absence or any decode failure.
///
/// Failures are logged and never propagate past this function.
pub fn parse_embedded<T: DeserializeOwned>(raw: Option<&str>, fallback: T) -> Decoded<T> {
    parse_embedded_with(raw, fallback, Ok)
}

/// Like [`parse_embedded`], but decodes into an intermediate wire shape `R`
/// and lets `convert` reject it. A rejected value takes the fallback as well.
pub fn parse_embedded_with<R, T>(
    raw: Option<&str>,
    fallback: T,
    convert: impl FnOnce(R) -> Result<T, DecodeError>,
) -> Decoded<T>
where
    R: DeserializeOwned,
{
    match try_parse_embedded(raw).and_then(convert) {
        Ok(value) => Decoded::decoded(value),
        Err(DecodeError::Absent) => Decoded::fallback(fallback),
        Err(err) => {
            tracing::warn!(error = %err, raw = raw.unwrap_or_default(), "falling back on embedded field");
            Decoded::fallback(fallback)
        }
    }
}
