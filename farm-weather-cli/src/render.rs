//! Terminal rendering of normalized dashboard data.
//!
//! Unknown values become `--` here and nowhere earlier.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use farm_weather_core::{CurrentConditions, Measurement, Settings, SunTimes, WeatherHistory};
use std::fmt::Display;

const UNKNOWN: &str = "--";

pub fn fmt_measure(m: &Measurement, decimals: usize, unit: &str) -> String {
    match m.get() {
        Some(v) => format!("{v:.decimals$}{unit}"),
        None => UNKNOWN.to_string(),
    }
}

/// Visibility arrives in metres and is shown in kilometres.
pub fn fmt_visibility(m: &Measurement) -> String {
    match m.get() {
        Some(metres) => format!("{:.1} km", metres / 1000.0),
        None => UNKNOWN.to_string(),
    }
}

/// Clock time of an epoch-seconds string, e.g. `06:12 AM`.
pub fn fmt_sun_time<Tz>(epoch: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    epoch
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.with_timezone(tz).format("%I:%M %p").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Display form of a record time in `tz`. Accepts RFC 3339 and naive ISO
/// timestamps; naive ones are shown as written.
pub fn fmt_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
{
    if raw.trim().is_empty() {
        return "N/A".to_string();
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(tz).naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"));

    match parsed {
        Ok(dt) => dt.format("%b %-d, %Y %H:%M").to_string(),
        Err(_) => "Invalid Date".to_string(),
    }
}

fn fmt_sun(sun: &SunTimes, fallback: bool) -> (String, String) {
    if fallback {
        return ("--:--".to_string(), "--:--".to_string());
    }
    (fmt_sun_time(&sun.sunrise, &Local), fmt_sun_time(&sun.sunset, &Local))
}

pub fn render_current(current: &CurrentConditions) -> String {
    let snap = &current.snapshot;
    let location = &snap.location.value;
    let (sunrise, sunset) = fmt_sun(&snap.sun.value, snap.sun.is_default);

    let description = if snap.description.is_empty() {
        "No description available"
    } else {
        snap.description.as_str()
    };

    let mut lines = vec![
        "Current Weather".to_string(),
        format!("  {}  {}", fmt_measure(&snap.temperature, 1, "°C"), description),
        format!("  Feels like   {}", fmt_measure(&snap.feels_like, 1, "°C")),
        format!("  Humidity     {}", fmt_measure(&snap.humidity, 0, "%")),
        format!(
            "  Wind         {} (gust {}, from {})",
            fmt_measure(&snap.wind_speed, 1, " m/s"),
            fmt_measure(&snap.wind_gust, 1, " m/s"),
            fmt_measure(&snap.wind_direction, 0, "°"),
        ),
        format!("  Pressure     {}", fmt_measure(&snap.pressure, 0, " hPa")),
        format!("  Visibility   {}", fmt_visibility(&snap.visibility)),
        format!(
            "  Location     {} ({:.4}°, {:.4}°){}",
            location.name,
            location.lat,
            location.lon,
            if snap.location.is_default { " [default location]" } else { "" },
        ),
        format!("  Sun          rise {sunrise}, set {sunset}"),
    ];

    if !current.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations".to_string());
        lines.extend(current.recommendations.iter().map(|r| format!("  - {r}")));
    }

    lines.join("\n")
}

pub fn render_history(history: &WeatherHistory) -> String {
    let mut lines = vec!["Weather History".to_string()];

    if history.total > 0 {
        lines.push(format!("Showing {} of {} records.", history.records.len(), history.total));
    }

    if history.records.is_empty() {
        lines.push("No weather history records found.".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "{:<20} {:>8} {:>8} {:>8}  {}",
        "Time", "Temp °C", "Hum %", "Wind m/s", "Description"
    ));
    for record in &history.records {
        let snap = &record.snapshot;
        lines.push(format!(
            "{:<20} {:>8} {:>8} {:>8}  {}",
            fmt_timestamp(record.display_time(), &Local),
            fmt_measure(&snap.temperature, 1, ""),
            fmt_measure(&snap.humidity, 0, ""),
            fmt_measure(&snap.wind_speed, 1, ""),
            snap.description,
        ));
    }

    lines.join("\n")
}

pub fn render_settings(settings: &Settings) -> String {
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    [
        "Farm Settings".to_string(),
        format!("  Latitude                {}", settings.farm_latitude),
        format!("  Longitude               {}", settings.farm_longitude),
        format!("  Units                   {}", settings.units),
        format!("  Update frequency        {} min", settings.update_frequency),
        format!("  Extreme weather alerts  {}", on_off(settings.extreme_weather_alerts)),
        format!("  Daily report            {}", on_off(settings.daily_report)),
    ]
    .join("\n")
}
