//! Core library for the `farm-weather` dashboard.
//!
//! This crate defines:
//! - Wire types for the dashboard backend and an HTTP client for it
//! - Normalization of loosely typed weather documents into snapshots
//! - Validation of user-entered farm settings
//! - The settings form controller and the fixed-interval poller
//! - Configuration handling
//!
//! It is used by `farm-weather-cli`, but can also be reused by other front ends.

pub mod backend;
pub mod client;
pub mod config;
pub mod coordinates;
pub mod embedded;
pub mod form;
pub mod history;
pub mod normalize;
pub mod poll;
pub mod settings;
pub mod snapshot;

pub use backend::{CurrentWeatherResponse, Settings, WeatherDataBackend, WeatherHistoryResponse};
pub use client::{ApiError, DashboardApi, HistoryPage, HttpDashboardClient};
pub use config::Config;
pub use coordinates::{Axis, Coordinates, ValidationError, validate_coordinates};
pub use embedded::{DecodeError, Decoded, parse_embedded, try_parse_embedded};
pub use form::{SettingsForm, SubmitError};
pub use history::{HistoryRecord, WeatherHistory, normalize_history};
pub use normalize::{Measurement, RawNumber, normalize_number};
pub use poll::{PollHandle, spawn_poller};
pub use settings::{SettingsDraft, SettingsPayload, prepare_settings_payload};
pub use snapshot::{
    CurrentConditions, GeoLocation, SnapshotDefaults, SunTimes, WeatherSnapshot, normalize_current,
    normalize_snapshot,
};
