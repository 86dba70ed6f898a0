use serde::{Deserialize, Serialize};

const MPH_PER_KMH: f32 = 0.621_371;

/// Unit system used when presenting readings. Forecasts are always stored
/// in metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherUnit {
    #[default]
    Metric,
    Imperial,
}

impl WeatherUnit {
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    /// Convert a Celsius reading into this unit system.
    pub fn temperature(self, celsius: i32) -> i32 {
        match self {
            Self::Metric => celsius,
            Self::Imperial => c2f(celsius as f32).round() as i32,
        }
    }

    /// Convert a km/h reading into this unit system.
    pub fn speed(self, kmh: i32) -> i32 {
        match self {
            Self::Metric => kmh,
            Self::Imperial => (kmh as f32 * MPH_PER_KMH).round() as i32,
        }
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    pub fn speed_symbol(self) -> &'static str {
        match self {
            Self::Metric => "km/h",
            Self::Imperial => "mph",
        }
    }

    pub fn format_temperature(self, celsius: i32) -> String {
        format!("{}{}", self.temperature(celsius), self.temperature_symbol())
    }

    pub fn format_speed(self, kmh: i32) -> String {
        format!("{} {}", self.speed(kmh), self.speed_symbol())
    }
}

fn c2f(temp_c: f32) -> f32 {
    temp_c * 9.0 / 5.0 + 32.0
}
