//! Conversion of one backend weather document into a [`WeatherSnapshot`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    backend::{CurrentWeatherResponse, WeatherDataBackend, text_or_none},
    embedded::{DecodeError, Decoded, parse_embedded, parse_embedded_with},
    normalize::{Measurement, normalize_number, parse_finite},
};

/// Where the weather station sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Sunrise and sunset as epoch seconds, kept as text until display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    #[serde(deserialize_with = "text_or_number")]
    pub sunrise: String,
    #[serde(deserialize_with = "text_or_number")]
    pub sunset: String,
}

/// Values used whenever an embedded field is absent or undecodable.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDefaults {
    pub location: GeoLocation,
    pub sun: SunTimes,
}

impl Default for SnapshotDefaults {
    fn default() -> Self {
        Self {
            location: GeoLocation {
                lat: -23.55052,
                lon: -46.633308,
                name: "São Paulo".to_string(),
            },
            sun: SunTimes { sunrise: "0".to_string(), sunset: "0".to_string() },
        }
    }
}

/// A fully populated, presentation-ready weather reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature: Measurement,
    pub feels_like: Measurement,
    pub humidity: Measurement,
    pub wind_speed: Measurement,
    pub wind_gust: Measurement,
    pub wind_direction: Measurement,
    pub pressure: Measurement,
    /// Metres, exactly as delivered.
    pub visibility: Measurement,
    pub description: String,
    pub icon: String,
    pub location: Decoded<GeoLocation>,
    pub sun: Decoded<SunTimes>,
    pub timestamp: String,
}

/// What the current-weather view consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub snapshot: WeatherSnapshot,
    pub recommendations: Vec<String>,
}

/// Location literal as the backend writes it.
#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(deserialize_with = "text_or_number")]
    lat: String,
    #[serde(deserialize_with = "text_or_number")]
    lon: String,
    #[serde(default, deserialize_with = "text_or_none")]
    name: Option<String>,
}

impl RawLocation {
    fn into_geo(self, default_name: &str) -> Result<GeoLocation, DecodeError> {
        let lat = coordinate("lat", &self.lat)?;
        let lon = coordinate("lon", &self.lon)?;
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name.to_string());

        Ok(GeoLocation { lat, lon, name })
    }
}

fn coordinate(field: &'static str, raw: &str) -> Result<f64, DecodeError> {
    parse_finite(&normalize_number(Some(raw)))
        .ok_or_else(|| DecodeError::InvalidNumber { field, value: raw.to_string() })
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_or_none(deserializer)?.unwrap_or_default())
}

/// Normalize one backend document. Never fails; every field has a fallback.
pub fn normalize_snapshot(record: &WeatherDataBackend, defaults: &SnapshotDefaults) -> WeatherSnapshot {
    let location = parse_embedded_with(
        record.location.as_deref(),
        defaults.location.clone(),
        |raw: RawLocation| raw.into_geo(&defaults.location.name),
    );
    let sun = parse_embedded(record.sun.as_deref(), defaults.sun.clone());

    WeatherSnapshot {
        temperature: Measurement::from_raw(record.temperature.as_ref()),
        feels_like: Measurement::from_raw(record.feels_like.as_ref()),
        humidity: Measurement::from_raw(record.humidity.as_ref()),
        wind_speed: Measurement::from_raw(record.wind_speed.as_ref()),
        wind_gust: Measurement::from_raw(record.wind_gust.as_ref()),
        wind_direction: Measurement::from_raw(record.wind_direction.as_ref()),
        pressure: Measurement::from_raw(record.pressure.as_ref()),
        visibility: Measurement::from_raw(record.visibility.as_ref()),
        description: record.description.clone().unwrap_or_default(),
        icon: record.icon.clone().unwrap_or_default(),
        location,
        sun,
        timestamp: record.timestamp.clone().unwrap_or_default(),
    }
}

/// Normalize a `/weather/current` response. Missing recommendations read as none.
pub fn normalize_current(response: CurrentWeatherResponse, defaults: &SnapshotDefaults) -> CurrentConditions {
    CurrentConditions {
        snapshot: normalize_snapshot(&response.weather, defaults),
        recommendations: response.recommendations.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::RawNumber;
    use serde_json::json;

    fn record(value: serde_json::Value) -> WeatherDataBackend {
        serde_json::from_value(value).expect("test document should deserialize")
    }

    #[test]
    fn coerces_numeric_strings() {
        let snap = normalize_snapshot(
            &record(json!({
                "temperature": "22.5",
                "feels_like": "21,8",
                "humidity": "60",
                "wind_speed": 3.4,
                "pressure": "1013",
                "visibility": "10000"
            })),
            &SnapshotDefaults::default(),
        );

        assert_eq!(snap.temperature.get(), Some(22.5));
        assert_eq!(snap.feels_like.get(), Some(21.8));
        assert_eq!(snap.humidity.get(), Some(60.0));
        assert_eq!(snap.wind_speed.get(), Some(3.4));
        assert_eq!(snap.pressure.get(), Some(1013.0));
        assert_eq!(snap.visibility.get(), Some(10000.0));
    }

    #[test]
    fn unknown_numbers_are_flagged_not_zeroed_silently() {
        let snap = normalize_snapshot(
            &record(json!({ "temperature": "", "pressure": "n/a" })),
            &SnapshotDefaults::default(),
        );

        assert!(!snap.temperature.has_value);
        assert!(!snap.pressure.has_value);
        assert!(!snap.wind_gust.has_value);
        assert_eq!(snap.temperature.value, 0.0);
    }

    #[test]
    fn visibility_is_kept_in_metres() {
        let mut doc = WeatherDataBackend::default();
        doc.visibility = Some(RawNumber::from("9876.5"));

        let snap = normalize_snapshot(&doc, &SnapshotDefaults::default());
        assert_eq!(snap.visibility.value, 9876.5);
    }

    #[test]
    fn decodes_location_and_sun() {
        let snap = normalize_snapshot(
            &record(json!({
                "location": "{'lat': '-23.55', 'lon': '-46.63', 'name': 'SP'}",
                "sun": "{'sunrise': '1714555200', 'sunset': 1714596000}"
            })),
            &SnapshotDefaults::default(),
        );

        assert!(!snap.location.is_default);
        assert_eq!(snap.location.value, GeoLocation { lat: -23.55, lon: -46.63, name: "SP".into() });
        assert!(!snap.sun.is_default);
        assert_eq!(snap.sun.value.sunrise, "1714555200");
        assert_eq!(snap.sun.value.sunset, "1714596000");
    }

    #[test]
    fn empty_document_is_fully_populated() {
        let defaults = SnapshotDefaults::default();
        let snap = normalize_snapshot(&WeatherDataBackend::default(), &defaults);

        assert_eq!(snap.description, "");
        assert_eq!(snap.icon, "");
        assert_eq!(snap.timestamp, "");
        assert_eq!(snap.location, Decoded::fallback(defaults.location.clone()));
        assert_eq!(snap.sun, Decoded::fallback(defaults.sun.clone()));
    }

    #[test]
    fn malformed_location_uses_configured_default() {
        let defaults = SnapshotDefaults {
            location: GeoLocation { lat: 41.1579, lon: -8.6291, name: "Porto".into() },
            ..SnapshotDefaults::default()
        };

        let snap = normalize_snapshot(&record(json!({ "location": "{broken" })), &defaults);

        assert!(snap.location.is_default);
        assert_eq!(snap.location.value.name, "Porto");
    }

    #[test]
    fn non_numeric_coordinates_use_default() {
        let snap = normalize_snapshot(
            &record(json!({ "location": "{'lat': 'north', 'lon': '2', 'name': 'X'}" })),
            &SnapshotDefaults::default(),
        );

        assert!(snap.location.is_default);
        assert_eq!(snap.location.value.name, "São Paulo");
    }

    #[test]
    fn blank_location_name_keeps_coordinates() {
        let snap = normalize_snapshot(
            &record(json!({ "location": "{'lat': '1,5', 'lon': '2', 'name': ''}" })),
            &SnapshotDefaults::default(),
        );

        assert!(!snap.location.is_default);
        assert_eq!(snap.location.value.lat, 1.5);
        assert_eq!(snap.location.value.name, "São Paulo");
    }

    #[test]
    fn current_response_without_recommendations() {
        let conditions = normalize_current(CurrentWeatherResponse::default(), &SnapshotDefaults::default());
        assert!(conditions.recommendations.is_empty());
    }
}
