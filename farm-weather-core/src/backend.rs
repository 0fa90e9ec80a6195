//! Wire shapes returned by the dashboard backend.
//!
//! These are deliberately permissive: every field defaults when absent and text
//! fields accept any JSON value, so a single odd document never sinks a whole
//! response. Turning them into something presentable is the job of
//! [`crate::snapshot`] and [`crate::history`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize::RawNumber;

/// One weather document as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherDataBackend {
    #[serde(rename = "$id", deserialize_with = "text_or_none", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "$collectionId", deserialize_with = "text_or_none", skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(rename = "$databaseId", deserialize_with = "text_or_none", skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(rename = "$createdAt", deserialize_with = "text_or_none", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "$updatedAt", deserialize_with = "text_or_none", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "$permissions", deserialize_with = "text_list", skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    pub temperature: Option<RawNumber>,
    pub humidity: Option<RawNumber>,
    pub wind_speed: Option<RawNumber>,
    #[serde(deserialize_with = "text_or_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub icon: Option<String>,
    pub feels_like: Option<RawNumber>,
    pub wind_gust: Option<RawNumber>,
    pub wind_direction: Option<RawNumber>,
    pub pressure: Option<RawNumber>,
    pub visibility: Option<RawNumber>,
    /// Single-quoted dict literal with `lat`, `lon` and `name`.
    #[serde(deserialize_with = "text_or_none")]
    pub location: Option<String>,
    /// Single-quoted dict literal with `sunrise` and `sunset` epoch seconds.
    #[serde(deserialize_with = "text_or_none")]
    pub sun: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub timestamp: Option<String>,
}

/// `GET /weather/current`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default, deserialize_with = "document_or_default")]
    pub weather: WeatherDataBackend,
    #[serde(default, deserialize_with = "text_list")]
    pub recommendations: Option<Vec<String>>,
}

/// `GET /weather/history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherHistoryResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default, deserialize_with = "lenient_documents")]
    pub documents: Option<Vec<WeatherDataBackend>>,
}

/// Canonical settings object as the server returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub farm_latitude: f64,
    pub farm_longitude: f64,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_update_frequency")]
    pub update_frequency: u32,
    #[serde(default)]
    pub extreme_weather_alerts: bool,
    #[serde(default)]
    pub daily_report: bool,
}

pub(crate) fn default_units() -> String {
    "metric".to_string()
}

pub(crate) const fn default_update_frequency() -> u32 {
    30
}

/// Accept a string, keep `null` as `None`, and stringify anything else.
///
/// An object sent where a literal was expected stringifies to valid JSON,
/// which the embedded-object parser still decodes.
pub(crate) fn text_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// A list of strings where non-string items are stringified and `null` items dropped.
/// Anything other than an array reads as absent.
fn text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        _ => None,
    })
}

fn document_from_value(value: serde_json::Value) -> WeatherDataBackend {
    if !value.is_object() {
        if !value.is_null() {
            tracing::warn!(%value, "ignoring non-object weather document");
        }
        return WeatherDataBackend::default();
    }

    serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable weather document");
        WeatherDataBackend::default()
    })
}

fn document_or_default<'de, D>(deserializer: D) -> Result<WeatherDataBackend, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(document_from_value(value))
}

/// Every entry of the array becomes a document; `null` or non-object entries
/// become empty documents so the rest of the page survives.
fn lenient_documents<'de, D>(deserializer: D) -> Result<Option<Vec<WeatherDataBackend>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::Array(items)) => Some(items.into_iter().map(document_from_value).collect()),
        _ => None,
    })
}
