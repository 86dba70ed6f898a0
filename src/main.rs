use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use weatherfy_controller::{
    ControllerSettings, ForecastController, ForecastViewEvent, ForecastViewState,
    LocationViewEvent, ViewStatus,
};
use weatherfy_core::Config;
use weatherfy_forecast::labels::{daily_label, hourly_label};
use weatherfy_forecast::visuals::DayVisuals;
use weatherfy_forecast::{
    CityRepository, ForecastGenerator, GeneratedForecastRepository, GeneratorBounds,
    InMemoryCityRepository,
};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    weatherfy_core::init()?;

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => {
            tracing::warn!("Using default configuration: {}", e.user_message());
            Config::default()
        }
    };

    let cities = Arc::new(
        InMemoryCityRepository::with_known_cities()
            .with_default_city(config.controller.default_city.clone()),
    );

    // First argument overrides the configured start city
    let city = match std::env::args().nth(1) {
        Some(city) => city,
        None => cities.default_city().await?,
    };

    let controller = ForecastController::spawn(
        Arc::new(GeneratedForecastRepository::new(ForecastGenerator::new(
            config.forecast,
        ))),
        cities,
        ControllerSettings::from(&config.controller),
    );
    tracing::info!("Weatherfy started for {}", city);

    let mut forecast_rx = controller.forecast_state();
    controller.on_location_event(LocationViewEvent::SetLocation(city));
    let state = tokio::time::timeout(
        STARTUP_TIMEOUT,
        forecast_rx.wait_for(|s| s.view_status == ViewStatus::Running),
    )
    .await
    .context("Timed out waiting for forecast")?
    .context("Controller stopped before the forecast arrived")?
    .clone();

    print_forecast(&state, &config.forecast);
    println!("\n{}", serde_json::to_string_pretty(&state)?);

    let unit = state.weather_unit.toggled();
    controller.on_forecast_event(ForecastViewEvent::SetWeatherUnit(unit));
    let state = forecast_rx
        .wait_for(|s| s.weather_unit == unit)
        .await
        .context("Controller stopped before the unit change")?
        .clone();
    print_forecast(&state, &config.forecast);

    controller.shutdown().await;
    Ok(())
}

fn print_forecast(state: &ForecastViewState, bounds: &GeneratorBounds) {
    let unit = state.weather_unit;
    let today = chrono::Local::now().date_naive();

    println!("\n{}", state.forecast.city);
    for day in &state.forecast.daily_forecasts {
        let visuals = DayVisuals::for_day(day, bounds);
        println!(
            "  {:<12} {:>6} ({} / {})  {:<13} wind {:>8}  rain {:>3}%  {} on {} ({:?} text)",
            daily_label(day.timestamp, today),
            unit.format_temperature(day.temperature),
            unit.format_temperature(day.min_temperature),
            unit.format_temperature(day.max_temperature),
            visuals.resources.description,
            unit.format_speed(day.wind_speed),
            day.precipitation_probability,
            visuals.color.to_hex(),
            visuals.background.top.to_hex(),
            visuals.content_tone,
        );
    }

    let selected = &state.selected_daily_forecast;
    if !selected.hourly_forecasts.is_empty() {
        println!("\n  Hourly");
        for hour in &selected.hourly_forecasts {
            println!(
                "  {:>8}  {:>6}  {:?}",
                hourly_label(hour.timestamp),
                unit.format_temperature(hour.temperature),
                hour.weather,
            );
        }
    }
}
