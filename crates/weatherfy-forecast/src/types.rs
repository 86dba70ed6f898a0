use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Weather classification derived from a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Thunderstorm,
    Windy,
}

impl Weather {
    /// Classify a reading. Rows are evaluated top to bottom, first match wins:
    ///
    /// | condition                                              | weather      |
    /// |--------------------------------------------------------|--------------|
    /// | precip >= 70 && wind >= 10 && temp > 20                | Thunderstorm |
    /// | precip >= 50 \|\| (precip >= 30 && temp <= 10)         | Rainy        |
    /// | precip < 15 && temp > 18                               | Cloudy       |
    /// | wind > 35                                              | Windy        |
    /// | otherwise                                              | Sunny        |
    pub fn classify(temperature: i32, wind_speed: i32, precipitation: i32) -> Self {
        if precipitation >= 70 && wind_speed >= 10 && temperature > 20 {
            Self::Thunderstorm
        } else if precipitation >= 50 || (precipitation >= 30 && temperature <= 10) {
            Self::Rainy
        } else if precipitation < 15 && temperature > 18 {
            Self::Cloudy
        } else if wind_speed > 35 {
            Self::Windy
        } else {
            Self::Sunny
        }
    }

    pub const ALL: [Weather; 5] = [
        Self::Sunny,
        Self::Cloudy,
        Self::Rainy,
        Self::Thunderstorm,
        Self::Windy,
    ];
}

/// Display density mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    Simple,
    Detailed,
}

impl ViewType {
    pub fn toggled(self) -> Self {
        match self {
            Self::Simple => Self::Detailed,
            Self::Detailed => Self::Simple,
        }
    }
}

/// Hourly forecast entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub timestamp: NaiveDateTime,
    pub temperature: i32,
    pub weather: Weather,
}

/// Daily forecast entry. Temperatures are in degrees Celsius, wind in km/h.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DailyForecast {
    pub timestamp: NaiveDateTime,
    pub hourly_forecasts: Vec<HourlyForecast>,
    pub temperature: i32,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub precipitation_probability: i32,
    pub wind_speed: i32,
    pub weather: Weather,
}

/// A city's full forecast, day 0 being today
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Forecast {
    pub city: String,
    pub daily_forecasts: Vec<DailyForecast>,
}

impl Forecast {
    pub fn is_empty(&self) -> bool {
        self.daily_forecasts.is_empty()
    }

    /// First day of the forecast, or the placeholder day when there is none.
    pub fn first_day_or_default(&self) -> DailyForecast {
        self.daily_forecasts.first().cloned().unwrap_or_default()
    }
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Forecast and city repository errors
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Invalid city name: {0:?}")]
    InvalidCity(String),
    #[error("Forecast unavailable for {city}: {reason}")]
    Unavailable { city: String, reason: String },
}

pub type ForecastResult<T> = Result<T, ForecastError>;
