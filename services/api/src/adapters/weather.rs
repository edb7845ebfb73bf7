//! services/api/src/adapters/weather.rs
//!
//! This module contains the adapter for the daily weather feed. It implements
//! the `WeatherService` port from the `core` crate.
//!
//! The feed is a JSON array of `{date, weather}` entries keyed by month-day;
//! the adapter picks the entry for today's server-local date and returns its
//! weather string untouched. Timeout and retry policy stay with the HTTP
//! client; nothing is retried here.

use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use todo_core::ports::{PortError, PortResult, WeatherService};

/// One entry of the daily forecast feed.
#[derive(Debug, Deserialize)]
struct DailyWeather {
    /// Month-day key, e.g. `"08-07"`.
    date: String,
    weather: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `WeatherService` port against an HTTP
/// forecast feed.
#[derive(Clone)]
pub struct HttpWeatherAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpWeatherAdapter {
    /// Creates a new `HttpWeatherAdapter`.
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

//=========================================================================================
// `WeatherService` Trait Implementation
//=========================================================================================

#[async_trait]
impl WeatherService for HttpWeatherAdapter {
    async fn today_weather(&self) -> PortResult<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("weather feed request failed: {e}")))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(format!("weather feed returned an error: {e}")))?;

        let forecast: Vec<DailyWeather> = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("weather feed payload was invalid: {e}")))?;

        let today = Local::now().format("%m-%d").to_string();

        forecast
            .into_iter()
            .find(|entry| entry.date == today)
            .map(|entry| entry.weather)
            .ok_or_else(|| {
                PortError::Unexpected(format!("weather feed has no entry for {today}"))
            })
    }
}
