use serde::{Deserialize, Serialize};

/// Map span (degrees) used when recentring on a reading
pub const MAP_SPAN_DEGREES: f64 = 0.1;

/// Weather categories driving which effect a UI shows.
///
/// Variants are listed in classification priority order: when a condition
/// mentions several categories, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Thunderstorm,
    Snow,
    Rain,
    Fog,
    Cloud,
    #[default]
    Clear,
}

/// Keywords per category, checked in this order. First hit wins.
const CATEGORY_KEYWORDS: [(WeatherCategory, &[&str]); 5] = [
    (WeatherCategory::Thunderstorm, &["thunder"]),
    (WeatherCategory::Snow, &["snow", "sleet"]),
    (WeatherCategory::Rain, &["rain", "drizzle"]),
    (WeatherCategory::Fog, &["fog", "mist", "haze"]),
    (WeatherCategory::Cloud, &["cloud"]),
];

impl WeatherCategory {
    /// Classify a reading. Pure; safe to call repeatedly.
    pub fn classify(reading: &WeatherReading) -> Self {
        Self::from_condition(&reading.condition_main, &reading.condition_description)
    }

    /// Classify a provider condition by case-insensitive substring match
    /// over both the short token (e.g. "Clouds") and the description.
    pub fn from_condition(main: &str, description: &str) -> Self {
        let haystack = format!("{} {}", main, description).to_lowercase();

        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(Self::Clear)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Rain => "Rain",
            Self::Fog => "Fog",
            Self::Cloud => "Cloudy",
            Self::Clear => "Clear",
        }
    }

    /// Get icon name (the UI maps it to a glyph)
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "cloud_lightning",
            Self::Snow => "cloud_snow",
            Self::Rain => "cloud_rain",
            Self::Fog => "cloud_fog",
            Self::Cloud => "cloud",
            Self::Clear => "sun",
        }
    }

    /// Ambient sound played alongside the category's effect, if any.
    /// Fog reuses the cloud ambience.
    pub fn sound_asset(&self) -> Option<&'static str> {
        match self {
            Self::Thunderstorm => Some("Thunder.mp3"),
            Self::Snow => Some("Snow.mp3"),
            Self::Rain => Some("Rain.mp3"),
            Self::Fog | Self::Cloud => Some("Cloud.mp3"),
            Self::Clear => None,
        }
    }
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Current conditions for one location, decoded from a successful fetch.
///
/// Only the pipeline constructs readings, and only from a fully decoded
/// response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    temperature_celsius: f64,
    condition_main: String,
    condition_description: String,
    latitude: f64,
    longitude: f64,
}

impl WeatherReading {
    pub(crate) fn new(
        temperature_celsius: f64,
        condition_main: String,
        condition_description: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            temperature_celsius,
            condition_main,
            condition_description,
            latitude,
            longitude,
        }
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    /// Short condition token, e.g. "Rain"
    pub fn condition_main(&self) -> &str {
        &self.condition_main
    }

    /// Human-readable condition, e.g. "light rain"
    pub fn condition_description(&self) -> &str {
        &self.condition_description
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn category(&self) -> WeatherCategory {
        WeatherCategory::classify(self)
    }

    /// Two-line label: temperature then description.
    pub fn summary(&self) -> String {
        format!(
            "Temp: {}°C\nDescription: {}",
            self.temperature_celsius, self.condition_description
        )
    }

    /// Region a map should recentre on for this reading.
    pub fn map_region(&self) -> MapRegion {
        MapRegion {
            center_latitude: self.latitude,
            center_longitude: self.longitude,
            latitude_delta: MAP_SPAN_DEGREES,
            longitude_delta: MAP_SPAN_DEGREES,
        }
    }
}

/// Map viewport centred on a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRegion {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(main: &str, description: &str) -> WeatherReading {
        WeatherReading::new(12.5, main.into(), description.into(), 48.85, 2.35)
    }

    #[test]
    fn test_rain_beats_cloud() {
        assert_eq!(
            WeatherCategory::from_condition("", "light rain and cloud"),
            WeatherCategory::Rain
        );
    }

    #[test]
    fn test_thunderstorm_beats_rain() {
        assert_eq!(
            WeatherCategory::from_condition("", "thunderstorm with heavy rain"),
            WeatherCategory::Thunderstorm
        );
    }

    #[test]
    fn test_snow_beats_rain() {
        assert_eq!(
            WeatherCategory::from_condition("Snow", "light rain and snow"),
            WeatherCategory::Snow
        );
    }

    #[test]
    fn test_fog_beats_cloud() {
        assert_eq!(
            WeatherCategory::from_condition("", "fog with low cloud"),
            WeatherCategory::Fog
        );
    }

    #[test]
    fn test_clear_sky_falls_through() {
        assert_eq!(
            WeatherCategory::from_condition("Clear", "clear sky"),
            WeatherCategory::Clear
        );
    }

    #[test]
    fn test_unknown_condition_defaults_to_clear() {
        assert_eq!(
            WeatherCategory::from_condition("Tornado", "tornado"),
            WeatherCategory::Clear
        );
        assert_eq!(WeatherCategory::from_condition("", ""), WeatherCategory::Clear);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(
            WeatherCategory::from_condition("", "HEAVY SNOW"),
            WeatherCategory::Snow
        );
        assert_eq!(
            WeatherCategory::from_condition("Clouds", "Overcast"),
            WeatherCategory::Cloud
        );
    }

    #[test]
    fn test_main_token_is_considered() {
        assert_eq!(
            WeatherCategory::from_condition("Thunderstorm", "heavy shower"),
            WeatherCategory::Thunderstorm
        );
        assert_eq!(
            WeatherCategory::from_condition("Clouds", "overcast"),
            WeatherCategory::Cloud
        );
    }

    #[test]
    fn test_keyword_variants() {
        assert_eq!(
            WeatherCategory::from_condition("Drizzle", "light intensity drizzle"),
            WeatherCategory::Rain
        );
        assert_eq!(
            WeatherCategory::from_condition("Snow", "sleet"),
            WeatherCategory::Snow
        );
        assert_eq!(
            WeatherCategory::from_condition("Mist", "mist"),
            WeatherCategory::Fog
        );
        assert_eq!(
            WeatherCategory::from_condition("Haze", "haze"),
            WeatherCategory::Fog
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let r = reading("Rain", "light rain and cloud");
        assert_eq!(r.category(), WeatherCategory::Rain);
        assert_eq!(r.category(), WeatherCategory::classify(&r));
    }

    #[test]
    fn test_category_description() {
        assert_eq!(WeatherCategory::Clear.description(), "Clear");
        assert_eq!(WeatherCategory::Thunderstorm.to_string(), "Thunderstorm");
    }

    #[test]
    fn test_category_icon_name() {
        assert_eq!(WeatherCategory::Clear.icon_name(), "sun");
        assert_eq!(WeatherCategory::Rain.icon_name(), "cloud_rain");
    }

    #[test]
    fn test_category_sound_asset() {
        assert_eq!(WeatherCategory::Rain.sound_asset(), Some("Rain.mp3"));
        assert_eq!(WeatherCategory::Fog.sound_asset(), Some("Cloud.mp3"));
        assert_eq!(WeatherCategory::Clear.sound_asset(), None);
    }

    #[test]
    fn test_reading_summary() {
        let r = reading("Rain", "light rain");
        assert_eq!(r.summary(), "Temp: 12.5°C\nDescription: light rain");
    }

    #[test]
    fn test_reading_map_region() {
        let region = reading("Clear", "clear sky").map_region();
        assert_eq!(region.center_latitude, 48.85);
        assert_eq!(region.center_longitude, 2.35);
        assert_eq!(region.latitude_delta, MAP_SPAN_DEGREES);
        assert_eq!(region.longitude_delta, MAP_SPAN_DEGREES);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&WeatherCategory::Thunderstorm).unwrap();
        assert_eq!(json, "\"thunderstorm\"");
    }
}
