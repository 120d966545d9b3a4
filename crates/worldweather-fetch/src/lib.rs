//! Weather fetch pipeline for WorldWeather
//!
//! Resolves a free-text location through an OpenWeatherMap-compatible
//! current-weather endpoint, decodes the response into a [`WeatherReading`]
//! and classifies it into a [`WeatherCategory`].

mod api;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod service;
pub mod types;

pub use error::{FetchError, FetchErrorKind};
pub use pipeline::WeatherFetchPipeline;
pub use query::LocationQuery;
pub use service::{FetchSlot, WeatherService, WeatherServiceMessage};
pub use types::*;
pub use worldweather_core::WeatherConfig;
