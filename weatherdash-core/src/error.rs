use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::provider::Endpoint;

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

/// Why the provider refused our credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthReason {
    /// HTTP 401: the key is unknown, inactive or malformed.
    InvalidKey,
    /// HTTP 403 from the unified endpoint: the account is not subscribed to it.
    NotEntitled,
}

impl std::fmt::Display for AuthReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthReason::InvalidKey => f.write_str("invalid API key"),
            AuthReason::NotEntitled => f.write_str("account not entitled"),
        }
    }
}

/// Coarse classification of a [`WeatherError`], cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidQuery,
    NotFound,
    AuthFailure,
    RateLimited,
    Upstream,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("{endpoint}: location not found ({message})")]
    NotFound { endpoint: Endpoint, message: String },

    #[error("{endpoint}: {reason} ({message})")]
    AuthFailure {
        endpoint: Endpoint,
        reason: AuthReason,
        message: String,
    },

    #[error("{endpoint}: rate limit reached ({message})")]
    RateLimited { endpoint: Endpoint, message: String },

    #[error("{endpoint}: upstream error ({message})")]
    Upstream {
        endpoint: Endpoint,
        status: Option<u16>,
        message: String,
    },
}

impl WeatherError {
    pub fn missing_api_key() -> Self {
        WeatherError::Configuration(
            "OpenWeatherMap API key is missing. \
             Hint: run `weatherdash configure` or set OPENWEATHER_API_KEY."
                .to_string(),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::Configuration(_) => ErrorKind::Configuration,
            WeatherError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            WeatherError::NotFound { .. } => ErrorKind::NotFound,
            WeatherError::AuthFailure { .. } => ErrorKind::AuthFailure,
            WeatherError::RateLimited { .. } => ErrorKind::RateLimited,
            WeatherError::Upstream { .. } => ErrorKind::Upstream,
        }
    }

    /// HTTP status observed when the failure was classified, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::AuthFailure { reason, .. } => Some(match reason {
                AuthReason::InvalidKey => 401,
                AuthReason::NotEntitled => 403,
            }),
            WeatherError::NotFound { .. } => Some(404),
            WeatherError::RateLimited { .. } => Some(429),
            WeatherError::Upstream { status, .. } => *status,
            WeatherError::Configuration(_) | WeatherError::InvalidQuery(_) => None,
        }
    }

    /// Short guidance suitable for showing next to the error message.
    pub fn hint(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Configuration | ErrorKind::AuthFailure => {
                "Check your OpenWeatherMap API key and subscription."
            }
            ErrorKind::InvalidQuery => "Check the city name or coordinates.",
            ErrorKind::NotFound => "Location not found. Try another spelling or nearby city.",
            ErrorKind::RateLimited => "Too many requests. Try again later.",
            ErrorKind::Upstream => "The weather provider had a problem. Try again.",
        }
    }

    pub(crate) fn transport(endpoint: Endpoint, err: reqwest::Error) -> Self {
        WeatherError::Upstream {
            endpoint,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(endpoint: Endpoint, err: serde_json::Error) -> Self {
        WeatherError::Upstream {
            endpoint,
            status: None,
            message: format!("malformed response: {err}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderMessage {
    message: Option<String>,
}

/// Turn a non-success HTTP response into a typed error.
///
/// This is the only place status codes are interpreted.
pub fn classify(endpoint: Endpoint, status: StatusCode, body: &str) -> WeatherError {
    let message = provider_message(body).unwrap_or_else(|| {
        let body = truncate_body(body);
        if body.is_empty() { status.to_string() } else { body }
    });

    match status {
        StatusCode::UNAUTHORIZED => WeatherError::AuthFailure {
            endpoint,
            reason: AuthReason::InvalidKey,
            message,
        },
        StatusCode::FORBIDDEN if endpoint == Endpoint::OneCall => WeatherError::AuthFailure {
            endpoint,
            reason: AuthReason::NotEntitled,
            message,
        },
        // geocoding signals "no place" with an empty list, not a status
        StatusCode::NOT_FOUND
            if matches!(endpoint, Endpoint::CurrentWeather | Endpoint::Forecast) =>
        {
            WeatherError::NotFound { endpoint, message }
        }
        StatusCode::TOO_MANY_REQUESTS => WeatherError::RateLimited { endpoint, message },
        _ => WeatherError::Upstream {
            endpoint,
            status: Some(status.as_u16()),
            message: format!("HTTP {}: {message}", status.as_u16()),
        },
    }
}

fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.trim().is_empty())
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_invalid_key_on_every_endpoint() {
        for endpoint in Endpoint::all() {
            let err = classify(*endpoint, StatusCode::UNAUTHORIZED, r#"{"cod":401,"message":"Invalid API key"}"#);
            match err {
                WeatherError::AuthFailure { reason, message, .. } => {
                    assert_eq!(reason, AuthReason::InvalidKey);
                    assert_eq!(message, "Invalid API key");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn forbidden_means_not_entitled_only_for_one_call() {
        let err = classify(Endpoint::OneCall, StatusCode::FORBIDDEN, "");
        assert!(matches!(
            err,
            WeatherError::AuthFailure { reason: AuthReason::NotEntitled, .. }
        ));
        assert_eq!(err.status(), Some(403));

        let err = classify(Endpoint::CurrentWeather, StatusCode::FORBIDDEN, "");
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn not_found_and_rate_limit() {
        let err = classify(Endpoint::CurrentWeather, StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("city not found"));

        let err = classify(Endpoint::Forecast, StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.hint(), "Too many requests. Try again later.");
    }

    #[test]
    fn geocoding_statuses_are_upstream() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND] {
            let err = classify(Endpoint::Geocoding, status, r#"{"cod":"400","message":"Nothing to geocode"}"#);
            assert_eq!(err.kind(), ErrorKind::Upstream);
            assert_eq!(err.status(), Some(status.as_u16()));
        }
    }

    #[test]
    fn other_statuses_are_upstream_with_status() {
        let err = classify(Endpoint::OneCall, StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        match err {
            WeatherError::Upstream { status, message, .. } => {
                assert_eq!(status, Some(502));
                assert!(message.contains("bad gateway"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "é".repeat(500);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn configuration_error_points_at_configure() {
        let err = WeatherError::missing_api_key();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("weatherdash configure"));
        assert_eq!(err.status(), None);
    }
}
