//! Fetch pipeline error types.

use thiserror::Error;
use worldweather_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};

/// Why a single fetch failed. Every variant is terminal for that request
/// and none is fatal to the process.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Location must not be empty")]
    InvalidInput,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Could not decode weather response: {0}")]
    Decode(String),
}

/// Copyable discriminant of [`FetchError`] for UI branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    InvalidInput,
    Network,
    Provider,
    Decode,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::InvalidInput => FetchErrorKind::InvalidInput,
            Self::Network(_) => FetchErrorKind::Network,
            Self::Provider { .. } => FetchErrorKind::Provider,
            Self::Decode(_) => FetchErrorKind::Decode,
        }
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Please enter a valid city name.",
            Self::Network(e) => e.to_network_error().user_message(),
            Self::Provider { status: 404, .. } => "Location not found. Check and try again.",
            Self::Provider { status: 401, .. } => "Weather API key is invalid. Check settings.",
            Self::Provider { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later."
            }
            Self::Provider { .. } => "Weather service error. Please try again.",
            Self::Decode(_) => "Error decoding weather data.",
        }
    }

    /// Whether offering the user a manual retry makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Provider { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidInput | Self::Decode(_) => false,
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::InvalidInput => AppError::Weather(WeatherError::EmptyLocation),
            FetchError::Network(err) => AppError::Network(err.to_network_error()),
            FetchError::Provider { status: 401, .. } => {
                AppError::Weather(WeatherError::InvalidApiKey)
            }
            FetchError::Provider {
                status: 404,
                message,
            } => AppError::Weather(WeatherError::LocationNotFound(message)),
            FetchError::Provider { status, .. } if status >= 500 => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            FetchError::Provider { status, message } => {
                AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, message)))
            }
            FetchError::Decode(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        }
    }
}
