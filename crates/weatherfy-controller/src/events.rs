use weatherfy_forecast::{DailyForecast, LocationError, ViewType, WeatherUnit};

use crate::state::ViewStatus;

/// Events raised by the forecast screen
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastViewEvent {
    GetForecast(String),
    SetSelectedDailyForecast(DailyForecast),
    SetViewStatus(ViewStatus),
    SetViewType(ViewType),
    SetWeatherUnit(WeatherUnit),
}

/// Events raised by search and the location collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationViewEvent {
    SetLocation(String),
    SearchCities(String),
    LocationError,
    PermissionsError,
}

impl From<Result<String, LocationError>> for LocationViewEvent {
    fn from(result: Result<String, LocationError>) -> Self {
        match result {
            Ok(city) => LocationViewEvent::SetLocation(city),
            Err(LocationError::PermissionDenied) => LocationViewEvent::PermissionsError,
            Err(_) => LocationViewEvent::LocationError,
        }
    }
}
