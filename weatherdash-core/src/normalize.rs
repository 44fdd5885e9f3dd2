//! Conversion of legacy current/forecast responses into [`UnifiedConditions`].
//!
//! The conversion is total: any decoded legacy record yields a document, and
//! fields the legacy endpoints never carry get fixed placeholders (`0` for
//! dew point, UV index and astronomy, `10000` m visibility, empty alerts).

use chrono::{DateTime, Utc};

use crate::model::{
    CurrentConditions, DailyForecast, HourlyForecast, LegacyCurrentConditions,
    LegacyForecastEntry, LegacyForecastList, UnifiedConditions,
    unified::{DailyFeelsLike, DailyTemperature},
};

pub const DEFAULT_VISIBILITY_M: u32 = 10_000;
pub const MAX_HOURLY: usize = 24;
pub const MAX_DAILY: usize = 8;
/// The forecast list has one entry per 3 hours, so every 8th entry is a new day.
pub const ENTRIES_PER_DAY: usize = 8;

/// Legacy responses carry an offset only, never a zone name.
const FALLBACK_TIMEZONE: &str = "UTC";

pub fn normalize(
    current: &LegacyCurrentConditions,
    forecast: Option<&LegacyForecastList>,
) -> UnifiedConditions {
    normalize_at(current, forecast, Utc::now())
}

/// Same as [`normalize`] with an explicit clock, used when `dt` is missing.
pub fn normalize_at(
    current: &LegacyCurrentConditions,
    forecast: Option<&LegacyForecastList>,
    now: DateTime<Utc>,
) -> UnifiedConditions {
    let current_block = current_block(current, now);
    let entries: &[LegacyForecastEntry] = forecast.map(|f| f.list.as_slice()).unwrap_or(&[]);

    let hourly = entries
        .iter()
        .take(MAX_HOURLY)
        .map(|entry| hourly_entry(entry, &current_block))
        .collect();

    let daily = entries
        .iter()
        .step_by(ENTRIES_PER_DAY)
        .take(MAX_DAILY)
        .map(|entry| daily_entry(entry, &current_block))
        .collect();

    UnifiedConditions {
        lat: current.coord.lat,
        lon: current.coord.lon,
        timezone: FALLBACK_TIMEZONE.to_string(),
        timezone_offset: current.timezone.unwrap_or(0),
        current: current_block,
        minutely: Vec::new(),
        hourly,
        daily,
        alerts: Vec::new(),
        city_name: Some(current.name.clone()),
    }
}

fn current_block(legacy: &LegacyCurrentConditions, now: DateTime<Utc>) -> CurrentConditions {
    let sys = legacy.sys.as_ref();
    let wind = legacy.wind.as_ref();

    CurrentConditions {
        dt: legacy.dt.unwrap_or_else(|| now.timestamp()),
        sunrise: sys.and_then(|s| s.sunrise).unwrap_or(0),
        sunset: sys.and_then(|s| s.sunset).unwrap_or(0),
        temp: legacy.main.temp,
        feels_like: legacy.main.feels_like.unwrap_or(legacy.main.temp),
        pressure: legacy.main.pressure.unwrap_or(0),
        humidity: legacy.main.humidity.unwrap_or(0),
        dew_point: 0.0,
        uvi: 0.0,
        clouds: legacy.clouds.as_ref().and_then(|c| c.all).unwrap_or(0),
        visibility: legacy.visibility.unwrap_or(DEFAULT_VISIBILITY_M),
        wind_speed: wind.and_then(|w| w.speed).unwrap_or(0.0),
        wind_deg: wind.and_then(|w| w.deg).unwrap_or(0),
        wind_gust: wind.and_then(|w| w.gust),
        weather: legacy.weather.clone(),
        rain: legacy.rain.clone(),
        snow: legacy.snow.clone(),
    }
}

fn hourly_entry(entry: &LegacyForecastEntry, current: &CurrentConditions) -> HourlyForecast {
    let wind = entry.wind.as_ref();

    HourlyForecast {
        dt: entry.dt,
        temp: entry.main.temp,
        feels_like: entry.main.feels_like.unwrap_or(current.feels_like),
        pressure: entry.main.pressure.unwrap_or(current.pressure),
        humidity: entry.main.humidity.unwrap_or(current.humidity),
        dew_point: 0.0,
        uvi: 0.0,
        clouds: entry.clouds.as_ref().and_then(|c| c.all).unwrap_or(0),
        visibility: entry.visibility.unwrap_or(DEFAULT_VISIBILITY_M),
        wind_speed: wind.and_then(|w| w.speed).unwrap_or(current.wind_speed),
        wind_deg: wind.and_then(|w| w.deg).unwrap_or(0),
        wind_gust: wind.and_then(|w| w.gust),
        weather: entry.weather.clone(),
        pop: 0.0,
        rain: None,
        snow: None,
    }
}

fn daily_entry(entry: &LegacyForecastEntry, current: &CurrentConditions) -> DailyForecast {
    let temp = entry.main.temp;
    let feels_like = entry.main.feels_like.unwrap_or(temp);
    let wind = entry.wind.as_ref();

    DailyForecast {
        dt: entry.dt,
        sunrise: 0,
        sunset: 0,
        moonrise: 0,
        moonset: 0,
        moon_phase: 0.0,
        summary: entry
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_default(),
        temp: DailyTemperature {
            day: temp,
            min: entry.main.temp_min.unwrap_or(temp),
            max: entry.main.temp_max.unwrap_or(temp),
            night: temp,
            eve: temp,
            morn: temp,
        },
        feels_like: DailyFeelsLike {
            day: feels_like,
            night: feels_like,
            eve: feels_like,
            morn: feels_like,
        },
        pressure: entry.main.pressure.unwrap_or(current.pressure),
        humidity: entry.main.humidity.unwrap_or(current.humidity),
        dew_point: 0.0,
        wind_speed: wind.and_then(|w| w.speed).unwrap_or(current.wind_speed),
        wind_deg: 0,
        wind_gust: None,
        weather: entry.weather.clone(),
        clouds: 0,
        pop: 0.0,
        rain: None,
        snow: None,
        uvi: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Coordinates, WeatherCondition,
        legacy::{LegacyClouds, LegacyMain, LegacySys, LegacyWind},
    };
    use chrono::TimeZone;

    fn paris() -> Coordinates {
        Coordinates { lat: 48.85, lon: 2.35 }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn forecast_of(len: usize) -> LegacyForecastList {
        let list = (0..len)
            .map(|i| LegacyForecastEntry {
                dt: 1_700_000_000 + i as i64 * 10_800,
                main: LegacyMain::with_temp(i as f64),
                weather: vec![WeatherCondition {
                    id: 800,
                    main: "Clear".into(),
                    description: format!("entry {i}"),
                    icon: "01d".into(),
                }],
                wind: None,
                clouds: None,
                visibility: None,
                dt_txt: None,
            })
            .collect();
        LegacyForecastList { list, city: None }
    }

    #[test]
    fn sparse_current_gets_documented_defaults() {
        let legacy = LegacyCurrentConditions::minimal(paris(), 15.0);
        let doc = normalize_at(&legacy, None, fixed_now());

        assert_eq!(doc.current.dew_point, 0.0);
        assert_eq!(doc.current.uvi, 0.0);
        assert_eq!(doc.current.visibility, DEFAULT_VISIBILITY_M);
        assert_eq!(doc.current.clouds, 0);
        assert_eq!(doc.current.wind_deg, 0);
        assert_eq!(doc.current.feels_like, 15.0);
        assert_eq!(doc.current.dt, fixed_now().timestamp());
        assert_eq!(doc.timezone, "UTC");
        assert_eq!(doc.timezone_offset, 0);
        assert!(doc.alerts.is_empty());
        assert!(doc.hourly.is_empty());
        assert!(doc.daily.is_empty());
    }

    #[test]
    fn copies_present_fields_unchanged() {
        let mut legacy = LegacyCurrentConditions::minimal(paris(), 15.27);
        legacy.main.feels_like = Some(14.1);
        legacy.main.pressure = Some(1021);
        legacy.main.humidity = Some(70);
        legacy.visibility = Some(0);
        legacy.clouds = Some(LegacyClouds { all: Some(40) });
        legacy.wind = Some(LegacyWind {
            speed: Some(5.5),
            deg: Some(310),
            gust: Some(9.0),
        });
        legacy.sys = Some(LegacySys {
            country: Some("FR".into()),
            sunrise: Some(1_714_538_000),
            sunset: Some(1_714_590_000),
        });
        legacy.dt = Some(1_714_560_000);
        legacy.timezone = Some(7200);
        legacy.name = "Paris".into();

        let doc = normalize_at(&legacy, None, fixed_now());

        assert_eq!(doc.current.temp, 15.27);
        assert_eq!(doc.current.feels_like, 14.1);
        assert_eq!(doc.current.pressure, 1021);
        assert_eq!(doc.current.humidity, 70);
        assert_eq!(doc.current.visibility, 0);
        assert_eq!(doc.current.clouds, 40);
        assert_eq!(doc.current.wind_deg, 310);
        assert_eq!(doc.current.wind_gust, Some(9.0));
        assert_eq!(doc.current.sunrise, 1_714_538_000);
        assert_eq!(doc.current.dt, 1_714_560_000);
        assert_eq!(doc.timezone_offset, 7200);
        assert_eq!(doc.city_name.as_deref(), Some("Paris"));
        assert_eq!((doc.lat, doc.lon), (48.85, 2.35));
    }

    #[test]
    fn hourly_feels_like_comes_from_current_not_entry_temp() {
        let mut legacy = LegacyCurrentConditions::minimal(paris(), 16.0);
        legacy.main.feels_like = Some(18.0);

        let mut forecast = forecast_of(1);
        forecast.list[0].main = LegacyMain::with_temp(5.0);

        let doc = normalize_at(&legacy, Some(&forecast), fixed_now());

        assert_eq!(doc.hourly[0].temp, 5.0);
        assert_eq!(doc.hourly[0].feels_like, doc.current.feels_like);
        // daily keeps the entry's own reading
        assert_eq!(doc.daily[0].feels_like.day, 5.0);
    }

    #[test]
    fn hourly_and_daily_lengths_follow_list_length() {
        let legacy = LegacyCurrentConditions::minimal(paris(), 10.0);

        for len in [0usize, 1, 7, 8, 9, 23, 24, 25, 40, 64, 65, 100] {
            let forecast = forecast_of(len);
            let doc = normalize_at(&legacy, Some(&forecast), fixed_now());

            assert_eq!(doc.hourly.len(), len.min(MAX_HOURLY), "hourly for {len}");
            assert_eq!(doc.daily.len(), len.div_ceil(8).min(MAX_DAILY), "daily for {len}");
        }
    }

    #[test]
    fn daily_picks_every_eighth_entry() {
        let legacy = LegacyCurrentConditions::minimal(paris(), 10.0);
        let forecast = forecast_of(40);
        let doc = normalize_at(&legacy, Some(&forecast), fixed_now());

        let temps: Vec<f64> = doc.daily.iter().map(|d| d.temp.day).collect();
        assert_eq!(temps, vec![0.0, 8.0, 16.0, 24.0, 32.0]);
        assert_eq!(doc.daily[1].summary, "entry 8");
        assert_eq!(doc.daily[1].temp.min, 8.0);
        assert_eq!(doc.daily[1].temp.max, 8.0);
        assert_eq!(doc.daily[1].feels_like.night, 8.0);
        assert_eq!(doc.daily[1].uvi, 0.0);
        assert_eq!(doc.daily[1].sunrise, 0);
    }

    #[test]
    fn forecast_entries_inherit_from_current_when_missing() {
        let mut legacy = LegacyCurrentConditions::minimal(paris(), 10.0);
        legacy.main.feels_like = Some(18.0);
        legacy.main.pressure = Some(1005);
        legacy.main.humidity = Some(55);
        legacy.wind = Some(LegacyWind {
            speed: Some(3.0),
            ..Default::default()
        });

        let mut forecast = forecast_of(2);
        forecast.list[1].main.pressure = Some(998);
        forecast.list[1].main.feels_like = Some(0.0);
        forecast.list[1].wind = Some(LegacyWind {
            speed: Some(7.2),
            ..Default::default()
        });

        let doc = normalize_at(&legacy, Some(&forecast), fixed_now());

        assert_eq!(doc.hourly[0].pressure, 1005);
        assert_eq!(doc.hourly[0].humidity, 55);
        assert_eq!(doc.hourly[0].wind_speed, 3.0);
        // entry 0 has temp 0.0 and no feels_like of its own
        assert_eq!(doc.hourly[0].feels_like, 18.0);
        assert_eq!(doc.hourly[0].pop, 0.0);

        assert_eq!(doc.hourly[1].pressure, 998);
        assert_eq!(doc.hourly[1].wind_speed, 7.2);
        // a real zero reading is kept, not replaced by the temperature
        assert_eq!(doc.hourly[1].feels_like, 0.0);
        assert_eq!(doc.hourly[1].temp, 1.0);
    }
}
