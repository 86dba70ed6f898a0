//! Forecast domain for Weatherfy
//!
//! Provides the forecast model, the synthetic forecast generator, the city
//! and forecast repositories, and the lookup data the UI layer renders from.

pub mod types;
pub mod generator;
pub mod labels;
pub mod location;
pub mod repository;
pub mod units;
pub mod visuals;

pub use types::*;
pub use generator::{ForecastGenerator, GeneratorBounds, FORECAST_DAYS};
pub use location::{FixedLocation, LocationProvider, NoLocation};
pub use repository::{
    CityRepository, ForecastRepository, GeneratedForecastRepository, InMemoryCityRepository,
};
pub use units::WeatherUnit;
