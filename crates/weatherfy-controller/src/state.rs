//! View state published by the controller.
//!
//! Snapshots are plain values: every change produces a new one.

use serde::Serialize;
use weatherfy_forecast::{DailyForecast, Forecast, ViewType, WeatherUnit};

/// Top-level position of the forecast screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    #[default]
    Loading,
    Idle,
    Running,
    HandlingErrors,
}

impl ViewStatus {
    /// True while a forecast is on screen.
    pub fn is_running(self) -> bool {
        matches!(self, ViewStatus::Running)
    }

    /// True if this status reverts to idle on its own after the error cool-down.
    pub fn auto_reverts(self) -> bool {
        matches!(self, ViewStatus::HandlingErrors)
    }

    /// Status after an empty search query.
    pub fn on_empty_query(self) -> Self {
        if self.is_running() {
            self
        } else {
            ViewStatus::Idle
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForecastViewState {
    pub forecast: Forecast,
    pub selected_daily_forecast: DailyForecast,
    pub view_status: ViewStatus,
    pub view_type: ViewType,
    pub weather_unit: WeatherUnit,
}

impl ForecastViewState {
    pub fn new(view_type: ViewType, weather_unit: WeatherUnit) -> Self {
        Self {
            view_type,
            weather_unit,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LocationViewState {
    pub query: String,
    pub cities: Vec<String>,
    pub error_getting_location: bool,
    pub error_getting_permissions: bool,
}

impl LocationViewState {
    pub fn has_error(&self) -> bool {
        self.error_getting_location || self.error_getting_permissions
    }
}
