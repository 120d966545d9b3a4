//! Wire format of the provider's current-weather response.
//! Only the fields the pipeline reads are declared; everything else is ignored.

use serde::Deserialize;

use crate::error::FetchError;
use crate::types::WeatherReading;

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainBlock,
    weather: Vec<ConditionBlock>,
    coord: CoordBlock,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct CoordBlock {
    lat: f64,
    lon: f64,
}

/// Decode a response body into a reading.
///
/// Fails on any missing or mistyped field and on an empty `weather` array;
/// only the first condition is used.
pub(crate) fn decode_reading(body: &[u8]) -> Result<WeatherReading, FetchError> {
    let response: CurrentWeatherResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let condition = response
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Decode("weather array is empty".to_string()))?;

    Ok(WeatherReading::new(
        response.main.temp,
        condition.main,
        condition.description,
        response.coord.lat,
        response.coord.lon,
    ))
}
