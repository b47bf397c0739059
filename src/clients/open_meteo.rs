use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Failure modes of the forecast provider. All surface to the caller with
/// the same HTTP status, but the messages must stay distinguishable.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather service request timed out. Please try again.")]
    Timeout,

    #[error("Failed to connect to weather service. Please check your internet connection.")]
    Connection,

    #[error("Weather service returned an error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to fetch weather data: {0}")]
    Request(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection
        } else if let Some(status) = err.status() {
            Self::Status(status)
        } else {
            Self::Request(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentConditions>,
}

/// The `current` block of an Open-Meteo forecast response.
#[derive(Debug, Default, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub temperature_2m: f64,

    #[serde(default)]
    pub relative_humidity_2m: f64,

    #[serde(default)]
    pub weather_code: i32,

    /// Provider-local observation timestamp.
    pub time: Option<String>,
}

#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    #[must_use]
    pub fn with_shared_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches current conditions for a coordinate pair. One request, no
    /// retries; the shared client carries the timeout.
    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,weather_code".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        if let Err(err) = response.error_for_status_ref() {
            return Err(err.into());
        }

        let forecast: ForecastResponse = response.json().await?;

        Ok(forecast.current.unwrap_or_default())
    }
}
