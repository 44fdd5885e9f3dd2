use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fmt::Write;

use weatherdash_core::{GeocodeResult, Resolution, UnifiedConditions};

const HOURS_SHOWN: usize = 8;

/// Human-readable dashboard summary.
pub fn summary(resolution: &Resolution) -> String {
    let doc = &resolution.conditions;
    let mut out = String::new();

    let place = doc.city_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unknown place");
    let _ = writeln!(out, "{place} ({:.2}, {:.2})", doc.lat, doc.lon);
    if let Some(note) = resolution.outcome.note() {
        let _ = writeln!(out, "  note: {note}");
    }

    let current = &doc.current;
    let _ = writeln!(
        out,
        "\nNow ({}): {:.1}°C, feels like {:.1}°C, {}",
        local_time(doc, current.dt, "%a %H:%M"),
        current.temp,
        current.feels_like,
        describe(current.weather.first().map(|w| w.description.as_str())),
    );
    let _ = writeln!(
        out,
        "  humidity {}%, pressure {} hPa, wind {:.1} m/s from {}°, clouds {}%, visibility {:.1} km",
        current.humidity,
        current.pressure,
        current.wind_speed,
        current.wind_deg,
        current.clouds,
        f64::from(current.visibility) / 1000.0,
    );
    if current.uvi > 0.0 {
        let _ = writeln!(out, "  UV index {:.1}", current.uvi);
    }

    if !doc.hourly.is_empty() {
        let _ = writeln!(out, "\nNext hours:");
        for hour in doc.hourly.iter().take(HOURS_SHOWN) {
            let _ = writeln!(
                out,
                "  {}  {:>5.1}°C  {:>3.0}%  {}",
                local_time(doc, hour.dt, "%a %H:%M"),
                hour.temp,
                hour.pop * 100.0,
                describe(hour.weather.first().map(|w| w.description.as_str())),
            );
        }
    }

    if !doc.daily.is_empty() {
        let _ = writeln!(out, "\nDays:");
        for day in &doc.daily {
            let _ = writeln!(
                out,
                "  {}  {:>5.1}° / {:>5.1}°  {}",
                local_time(doc, day.dt, "%a %d %b"),
                day.temp.min,
                day.temp.max,
                describe(Some(day.summary.as_str()).filter(|s| !s.is_empty())),
            );
        }
    }

    for alert in &doc.alerts {
        let _ = writeln!(
            out,
            "\nALERT: {} ({}), until {}",
            alert.event,
            alert.sender_name,
            local_time(doc, alert.end, "%a %H:%M"),
        );
    }

    out
}

/// One geocoding match, with the command that shows its weather.
pub fn place(result: &GeocodeResult) -> String {
    let region: Vec<&str> = [result.state.as_deref(), result.country.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

    let mut out = result.name.clone();
    if !region.is_empty() {
        let _ = write!(out, ", {}", region.join(", "));
    }
    let _ = writeln!(out, " ({:.4}, {:.4})", result.lat, result.lon);
    let _ = writeln!(
        out,
        "  weatherdash show --lat {:.4} --lon {:.4}",
        result.lat, result.lon
    );
    out
}

fn describe(text: Option<&str>) -> &str {
    text.unwrap_or("no description")
}

/// Format a unix timestamp in the place's UTC offset.
fn local_time(doc: &UnifiedConditions, ts: i64, fmt: &str) -> String {
    let offset = i32::try_from(doc.timezone_offset)
        .ok()
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());

    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(utc) => utc.with_timezone(&offset).format(fmt).to_string(),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherdash_core::{
        ResolutionOutcome,
        model::{DailyForecast, WeatherAlert, WeatherCondition},
    };

    fn resolution(outcome: ResolutionOutcome) -> Resolution {
        let mut doc = UnifiedConditions {
            lat: 48.85,
            lon: 2.35,
            timezone: "UTC".into(),
            timezone_offset: 7200,
            city_name: Some("Paris".into()),
            ..Default::default()
        };
        doc.current.dt = 1_714_560_000;
        doc.current.temp = 15.0;
        doc.current.visibility = 10_000;
        doc.current.weather = vec![WeatherCondition {
            id: 800,
            main: "Clear".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
        }];
        doc.daily.push(DailyForecast {
            dt: 1_714_560_000,
            summary: "Sunny".into(),
            ..Default::default()
        });
        doc.alerts.push(WeatherAlert {
            event: "Heat".into(),
            sender_name: "Météo-France".into(),
            end: 1_714_600_000,
            ..Default::default()
        });

        Resolution {
            conditions: doc,
            outcome,
        }
    }

    #[test]
    fn summary_mentions_fallback_note() {
        let text = summary(&resolution(ResolutionOutcome::Fallback {
            note: "legacy data".into(),
        }));

        assert!(text.starts_with("Paris (48.85, 2.35)"));
        assert!(text.contains("note: legacy data"));
        assert!(text.contains("15.0°C"));
        assert!(text.contains("clear sky"));
        assert!(text.contains("visibility 10.0 km"));
        assert!(text.contains("Sunny"));
        assert!(text.contains("ALERT: Heat"));
    }

    #[test]
    fn place_lists_state_and_country() {
        let text = place(&GeocodeResult {
            name: "Springfield".into(),
            lat: 39.7817,
            lon: -89.6501,
            country: Some("US".into()),
            state: Some("Illinois".into()),
        });

        assert!(text.starts_with("Springfield, Illinois, US (39.7817, -89.6501)"));
        assert!(text.contains("show --lat 39.7817 --lon -89.6501"));
    }

    #[test]
    fn place_without_region() {
        let text = place(&GeocodeResult {
            name: "Atlantis".into(),
            lat: 0.0,
            lon: 0.0,
            country: None,
            state: Some(String::new()),
        });

        assert!(text.starts_with("Atlantis (0.0000, 0.0000)"));
    }

    #[test]
    fn summary_uses_local_offset() {
        let text = summary(&resolution(ResolutionOutcome::Primary));

        // 1714560000 is 10:40 UTC, 12:40 at +02:00
        assert!(text.contains("12:40"));
        assert!(!text.contains("note:"));
    }
}
