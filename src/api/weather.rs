use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{ApiError, AppState, WeatherDto, WeatherResponse};

/// WMO weather interpretation codes.
#[must_use]
pub const fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// Resolves the requested coordinates against the configured fallback.
/// Parse failures come before range checks.
fn resolve_coordinates(
    query: &WeatherQuery,
    default_lat: f64,
    default_lon: f64,
) -> Result<(f64, f64), ApiError> {
    let parse = |raw: Option<&str>, fallback: f64| -> Result<f64, ApiError> {
        match raw {
            Some(value) => value.trim().parse().map_err(|_| {
                ApiError::validation(
                    "Invalid latitude or longitude format. Must be numeric values.",
                )
            }),
            None => Ok(fallback),
        }
    };

    let lat = parse(query.lat.as_deref(), default_lat)?;
    let lon = parse(query.lon.as_deref(), default_lon)?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        warn!("Coordinates out of range: lat={}, lon={}", lat, lon);
        return Err(ApiError::validation(
            "Invalid coordinates. Latitude must be -90 to 90, longitude must be -180 to 180.",
        ));
    }

    Ok((lat, lon))
}

pub async fn get_current_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let (default_lat, default_lon) = {
        let config = state.config().read().await;
        (
            config.weather.default_latitude,
            config.weather.default_longitude,
        )
    };

    let (lat, lon) = resolve_coordinates(&query, default_lat, default_lon)?;

    info!("Fetching weather data for coordinates: lat={}, lon={}", lat, lon);

    let current = state.weather().current(lat, lon).await?;

    let description = describe_weather_code(current.weather_code);
    let weather = WeatherDto {
        temperature: current.temperature_2m.round() as i64,
        humidity: current.relative_humidity_2m.round() as i64,
        description,
        weather_code: current.weather_code,
        location: format!("Lat: {}, Lon: {}", lat, lon),
        last_updated: current
            .time
            .unwrap_or_else(|| chrono::Local::now().to_rfc3339()),
    };

    info!(
        "Successfully retrieved weather: {}, {}°C",
        description, weather.temperature
    );

    Ok(Json(WeatherResponse {
        weather,
        status: "success",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_descriptions() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(2), "Partly cloudy");
        assert_eq!(describe_weather_code(45), "Fog");
        assert_eq!(describe_weather_code(65), "Heavy rain");
        assert_eq!(describe_weather_code(82), "Violent rain showers");
        assert_eq!(describe_weather_code(99), "Thunderstorm with heavy hail");
    }

    #[test]
    fn unrecognized_code_is_unknown() {
        assert_eq!(describe_weather_code(12), "Unknown");
        assert_eq!(describe_weather_code(-1), "Unknown");
        assert_eq!(describe_weather_code(100), "Unknown");
    }

    #[test]
    fn missing_parameters_fall_back_to_defaults() {
        let query = WeatherQuery::default();
        let (lat, lon) = resolve_coordinates(&query, 37.7749, -122.4194).unwrap();
        assert!((lat - 37.7749).abs() < f64::EPSILON);
        assert!((lon - -122.4194).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_coordinates_rejected() {
        let query = WeatherQuery {
            lat: Some("abc".to_string()),
            lon: None,
        };
        let err = resolve_coordinates(&query, 37.7749, -122.4194).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        let high_lat = WeatherQuery {
            lat: Some("91".to_string()),
            lon: Some("0".to_string()),
        };
        assert!(resolve_coordinates(&high_lat, 0.0, 0.0).is_err());

        let high_lon = WeatherQuery {
            lat: Some("0".to_string()),
            lon: Some("200".to_string()),
        };
        assert!(resolve_coordinates(&high_lon, 0.0, 0.0).is_err());

        let boundary = WeatherQuery {
            lat: Some("-90".to_string()),
            lon: Some("180".to_string()),
        };
        assert!(resolve_coordinates(&boundary, 0.0, 0.0).is_ok());
    }

    #[test]
    fn location_label_embeds_default_coordinates() {
        let label = format!("Lat: {}, Lon: {}", 37.7749, -122.4194);
        assert!(label.contains("37.7749"));
        assert!(label.contains("-122.4194"));
    }
}
