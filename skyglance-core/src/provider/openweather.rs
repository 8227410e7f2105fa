use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    Config, FetchError,
    model::{ForecastSample, LocationQuery, Snapshot, Units},
};

use super::WeatherProvider;

/// Format of the `dt_txt` field on forecast entries.
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: &str,
        units: Units,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            units,
            http,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.api_key()?.to_owned(),
            &config.base_url,
            config.units,
            config.request_timeout(),
        )
    }

    /// Full query string for one request: location, units, key.
    fn query(&self, location: &LocationQuery) -> Vec<(&'static str, String)> {
        let mut pairs = location.query_pairs();
        pairs.push(("units", self.units.as_str().to_string()));
        pairs.push(("appid", self.api_key.clone()));
        pairs
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        location: &LocationQuery,
    ) -> Result<T, FetchError> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);
        tracing::debug!(%url, %location, "requesting OpenWeather {endpoint}");

        let res = self
            .http
            .get(&url)
            .query(&self.query(location))
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| FetchError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(FetchError::Status { endpoint, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// Label, description and code of the first weather entry.
fn first_weather(weather: &[OwWeather]) -> (String, String, u16) {
    weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone(), w.id))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new(), 0))
}

impl From<OwCurrentResponse> for Snapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (summary, description, condition_code) = first_weather(&parsed.weather);

        Snapshot {
            place_name: parsed.name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            summary,
            description,
            condition_code,
            observed_at: DateTime::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now),
        }
    }
}

impl TryFrom<OwForecastEntry> for ForecastSample {
    type Error = FetchError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        let timestamp = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT)
            .map_err(|_| FetchError::Timestamp(entry.dt_txt.clone()))?;
        let (summary, description, condition_code) = first_weather(&entry.weather);

        Ok(ForecastSample {
            timestamp,
            temperature: entry.main.temp,
            temp_min: entry.main.temp_min,
            temp_max: entry.main.temp_max,
            feels_like: entry.main.feels_like,
            humidity_pct: entry.main.humidity,
            wind_speed: entry.wind.speed,
            summary,
            description,
            condition_code,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &LocationQuery) -> Result<Snapshot, FetchError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query).await?;
        Ok(parsed.into())
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<Vec<ForecastSample>, FetchError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query).await?;
        parsed.list.into_iter().map(ForecastSample::try_from).collect()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenWeatherProvider {
        OpenWeatherProvider::new(
            "KEY".to_string(),
            "http://localhost/",
            Units::Imperial,
            Duration::from_secs(1),
        )
        .expect("client should build")
    }

    #[test]
    fn query_appends_units_and_key() {
        let pairs = provider().query(&LocationQuery::Name("Oslo".into()));
        assert_eq!(
            pairs,
            vec![
                ("q", "Oslo".to_string()),
                ("units", "imperial".to_string()),
                ("appid", "KEY".to_string()),
            ]
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(provider().base_url, "http://localhost");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn forecast_entry_with_bad_timestamp_is_rejected() {
        let entry: OwForecastEntry = serde_json::from_value(serde_json::json!({
            "dt_txt": "tomorrow",
            "main": { "temp": 1.0, "feels_like": 0.0, "temp_min": 0.5, "temp_max": 1.5, "humidity": 80 },
            "weather": [],
            "wind": { "speed": 3.0 }
        }))
        .expect("entry shape is valid");

        let err = ForecastSample::try_from(entry).unwrap_err();
        assert!(matches!(err, FetchError::Timestamp(ref s) if s == "tomorrow"));
    }

    #[test]
    fn missing_weather_entry_falls_back_to_unknown() {
        let (summary, description, code) = first_weather(&[]);
        assert_eq!(summary, "Unknown");
        assert!(description.is_empty());
        assert_eq!(code, 0);
    }
}
