//! Current-weather fetch: location text in, typed reading out.

use std::sync::Arc;

use reqwest::Client;
use tracing::instrument;
use url::Url;
use worldweather_core::{ConfigError, WeatherConfig};

use crate::api::decode_reading;
use crate::error::FetchError;
use crate::query::LocationQuery;
use crate::types::WeatherReading;

const WEATHER_PATH: &str = "/data/2.5/weather";
const UNITS: &str = "metric";
const USER_AGENT: &str = concat!("WorldWeather/", env!("CARGO_PKG_VERSION"));

/// Resolves a location through the weather provider.
///
/// Stateless apart from the shared HTTP client; clones are cheap and may
/// fetch concurrently.
#[derive(Clone)]
pub struct WeatherFetchPipeline {
    client: Arc<Client>,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for WeatherFetchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherFetchPipeline")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WeatherFetchPipeline {
    /// Build a pipeline from configuration resolved at startup.
    ///
    /// # Errors
    /// `MissingSetting` when no API key is configured, `Invalid` when the
    /// base URL doesn't parse or the HTTP client can't be built.
    pub fn new(config: &WeatherConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?.to_string();

        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(WEATHER_PATH))
            .map_err(|e| ConfigError::Invalid(format!("weather.base_url: {}", e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        tracing::debug!("Weather pipeline targeting {}", endpoint);

        Ok(Self {
            client: Arc::new(client),
            endpoint,
            api_key,
        })
    }

    /// Request URL for a location. The location is percent-encoded into `q`.
    pub fn request_url(&self, location: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", location)
            .append_pair("appid", &self.api_key)
            .append_pair("units", UNITS);
        url
    }

    /// Fetch current weather for free-text location input.
    ///
    /// Blank input fails with `InvalidInput` before any request is made.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, location: &str) -> Result<WeatherReading, FetchError> {
        let query = LocationQuery::parse(location)?;
        self.fetch_query(&query).await
    }

    /// Fetch current weather for an already validated query.
    pub async fn fetch_query(&self, query: &LocationQuery) -> Result<WeatherReading, FetchError> {
        let url = self.request_url(query.as_str());

        // Strip the URL from transport errors so the key never reaches logs
        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            tracing::debug!("Weather request failed: {}", e);
            FetchError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = provider_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            tracing::warn!("Weather provider returned {} for {}: {}", status, query, message);
            return Err(FetchError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.without_url()))?;

        let reading = decode_reading(&body).inspect_err(|e| {
            tracing::debug!("Weather decode failed for {}: {}", query, e);
        })?;

        tracing::info!(
            "Weather for {}: {}°C, {}",
            query,
            reading.temperature_celsius(),
            reading.condition_description()
        );
        Ok(reading)
    }
}

/// Pull the `message` field out of a provider error body, e.g.
/// `{"cod":"404","message":"city not found"}`.
fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> WeatherConfig {
        WeatherConfig {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
        }
    }

    fn query_value(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_missing_key_fails_construction() {
        let mut cfg = config("https://api.openweathermap.org");
        cfg.api_key = None;
        assert!(matches!(
            WeatherFetchPipeline::new(&cfg),
            Err(ConfigError::MissingSetting(_))
        ));
    }

    #[test]
    fn test_bad_base_url_fails_construction() {
        assert!(matches!(
            WeatherFetchPipeline::new(&config("not a url")),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_request_url_shape() {
        let pipeline = WeatherFetchPipeline::new(&config("https://api.openweathermap.org")).unwrap();
        let url = pipeline.request_url("London");

        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("api.openweathermap.org"));
        assert_eq!(url.path(), "/data/2.5/weather");
        assert_eq!(query_value(&url, "q").as_deref(), Some("London"));
        assert_eq!(query_value(&url, "appid").as_deref(), Some("test-key"));
        assert_eq!(query_value(&url, "units").as_deref(), Some("metric"));
    }

    #[test]
    fn test_location_round_trips_through_url() {
        let pipeline = WeatherFetchPipeline::new(&config("https://api.openweathermap.org")).unwrap();

        for location in [
            "New York",
            "São Paulo, BR",
            "St. John's, NL",
            "a&b=c?d#e+f%20g/h",
            "  padded  ",
        ] {
            let url = pipeline.request_url(location);
            let raw_query = url.query().unwrap_or_default();
            assert!(!raw_query.contains(' '), "space left unencoded in {}", raw_query);
            assert!(!raw_query.contains('#'), "fragment marker left in {}", raw_query);

            let reparsed = Url::parse(url.as_str()).unwrap();
            assert_eq!(query_value(&reparsed, "q").as_deref(), Some(location));
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let pipeline = WeatherFetchPipeline::new(&config("https://api.openweathermap.org")).unwrap();
        let debug = format!("{:?}", pipeline);
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_provider_message_extraction() {
        assert_eq!(
            provider_message(r#"{"cod":"404","message":"city not found"}"#).as_deref(),
            Some("city not found")
        );
        assert_eq!(provider_message("Bad Gateway"), None);
        assert_eq!(provider_message(r#"{"cod":500}"#), None);
    }
}
