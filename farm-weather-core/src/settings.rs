//! User-entered farm settings and their conversion into a request payload.

use serde::{Deserialize, Serialize};

use crate::{
    backend::{Settings, default_units, default_update_frequency},
    coordinates::{ValidationError, validate_coordinates},
};

/// Settings as typed into the form: coordinates are still free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDraft {
    pub farm_latitude: String,
    pub farm_longitude: String,
    pub extreme_weather_alerts: bool,
    pub daily_report: bool,
    pub units: String,
    pub update_frequency: u32,
}

impl Default for SettingsDraft {
    fn default() -> Self {
        Self {
            farm_latitude: "-23.550520".to_string(),
            farm_longitude: "-46.633308".to_string(),
            extreme_weather_alerts: false,
            daily_report: false,
            units: default_units(),
            update_frequency: default_update_frequency(),
        }
    }
}

impl From<&Settings> for SettingsDraft {
    fn from(settings: &Settings) -> Self {
        Self {
            farm_latitude: settings.farm_latitude.to_string(),
            farm_longitude: settings.farm_longitude.to_string(),
            extreme_weather_alerts: settings.extreme_weather_alerts,
            daily_report: settings.daily_report,
            units: settings.units.clone(),
            update_frequency: settings.update_frequency,
        }
    }
}

/// Body of `POST /settings`: the canonical settings minus the document id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsPayload {
    pub farm_latitude: f64,
    pub farm_longitude: f64,
    pub units: String,
    pub update_frequency: u32,
    pub extreme_weather_alerts: bool,
    pub daily_report: bool,
}

/// Validate a draft and build the payload to submit.
///
/// A validation error is returned untouched; nothing partial is produced.
pub fn prepare_settings_payload(draft: &SettingsDraft) -> Result<SettingsPayload, ValidationError> {
    let coords = validate_coordinates(&draft.farm_latitude, &draft.farm_longitude)?;

    Ok(SettingsPayload {
        farm_latitude: coords.latitude,
        farm_longitude: coords.longitude,
        units: draft.units.clone(),
        update_frequency: draft.update_frequency,
        extreme_weather_alerts: draft.extreme_weather_alerts,
        daily_report: draft.daily_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::Axis;

    fn draft(lat: &str, lon: &str) -> SettingsDraft {
        SettingsDraft {
            farm_latitude: lat.into(),
            farm_longitude: lon.into(),
            ..SettingsDraft::default()
        }
    }

    #[test]
    fn converts_coordinates_and_passes_flags() {
        let mut d = draft("41,1579", " -8.6291 ");
        d.extreme_weather_alerts = true;
        d.units = "imperial".into();

        let payload = prepare_settings_payload(&d).expect("draft is valid");

        assert_eq!(payload.farm_latitude, 41.1579);
        assert_eq!(payload.farm_longitude, -8.6291);
        assert!(payload.extreme_weather_alerts);
        assert!(!payload.daily_report);
        assert_eq!(payload.units, "imperial");
        assert_eq!(payload.update_frequency, 30);
    }

    #[test]
    fn out_of_range_blocks_payload() {
        let err = prepare_settings_payload(&draft("200", "10")).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { axis: Axis::Latitude, .. }));
    }

    #[test]
    fn missing_coordinate_blocks_payload() {
        let err = prepare_settings_payload(&draft("", "10")).unwrap_err();
        assert_eq!(err, ValidationError::MissingCoordinate);
    }

    #[test]
    fn payload_has_no_identity_field() {
        let payload = prepare_settings_payload(&SettingsDraft::default()).expect("default is valid");
        let json = serde_json::to_value(&payload).expect("payload serializes");

        assert!(json.get("$id").is_none());
        assert_eq!(json["farm_latitude"], serde_json::json!(-23.55052));
    }

    #[test]
    fn draft_from_server_settings() {
        let settings = Settings {
            id: Some("farm".into()),
            farm_latitude: 41.1579,
            farm_longitude: -8.6291,
            units: "metric".into(),
            update_frequency: 15,
            extreme_weather_alerts: true,
            daily_report: true,
        };

        let d = SettingsDraft::from(&settings);

        assert_eq!(d.farm_latitude, "41.1579");
        assert_eq!(d.farm_longitude, "-8.6291");
        assert_eq!(d.update_frequency, 15);
        assert!(d.daily_report);
    }
}
