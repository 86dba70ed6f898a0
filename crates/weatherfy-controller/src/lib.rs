//! Event-driven view state for the forecast and location screens.

pub mod controller;
pub mod events;
pub mod state;

pub use controller::{ControllerSettings, ForecastController};
pub use events::{ForecastViewEvent, LocationViewEvent};
pub use state::{ForecastViewState, LocationViewState, ViewStatus};
