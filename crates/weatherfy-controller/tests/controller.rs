//! Controller behaviour tests.
//!
//! Run on a paused tokio clock so the error cool-down and slow repositories
//! resolve instantly and deterministically.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use weatherfy_controller::{
    ControllerSettings, ForecastController, ForecastViewEvent, ForecastViewState,
    LocationViewEvent, LocationViewState, ViewStatus,
};
use weatherfy_forecast::types::{ForecastError, ForecastResult};
use weatherfy_forecast::{
    CityRepository, DailyForecast, FixedLocation, Forecast, ForecastGenerator, ForecastRepository,
    GeneratedForecastRepository, InMemoryCityRepository, LocationError, LocationProvider,
    NoLocation, ViewType, Weather, WeatherUnit,
};

const COOLDOWN: Duration = Duration::from_millis(2000);

/// Canned forecasts, optionally slowed down per city
#[derive(Default)]
struct FixtureForecastRepository {
    delays: HashMap<String, Duration>,
}

impl FixtureForecastRepository {
    fn with_delay(mut self, city: &str, delay: Duration) -> Self {
        self.delays.insert(city.to_string(), delay);
        self
    }
}

fn one_day(city: &str) -> Forecast {
    Forecast {
        city: city.to_string(),
        daily_forecasts: vec![DailyForecast {
            temperature: 21,
            weather: Weather::Cloudy,
            ..DailyForecast::default()
        }],
    }
}

#[async_trait]
impl ForecastRepository for FixtureForecastRepository {
    async fn get_forecast(&self, city: &str) -> ForecastResult<Forecast> {
        if let Some(delay) = self.delays.get(city) {
            tokio::time::sleep(*delay).await;
        }
        Ok(match city {
            "Lisbon" => Forecast {
                city: "Lisbon".to_string(),
                daily_forecasts: vec![],
            },
            "London" | "Paris" => one_day(city),
            _ => Forecast::default(),
        })
    }
}

struct FailingForecastRepository;

#[async_trait]
impl ForecastRepository for FailingForecastRepository {
    async fn get_forecast(&self, city: &str) -> ForecastResult<Forecast> {
        Err(ForecastError::Unavailable {
            city: city.to_string(),
            reason: "offline".to_string(),
        })
    }
}

/// Sample cities with slow lookups for chosen queries
struct SlowCityRepository {
    inner: InMemoryCityRepository,
    slow_query: String,
}

#[async_trait]
impl CityRepository for SlowCityRepository {
    async fn get_cities(&self, query: &str) -> ForecastResult<Vec<String>> {
        if query == self.slow_query {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        self.inner.get_cities(query).await
    }

    async fn default_city(&self) -> ForecastResult<String> {
        self.inner.default_city().await
    }

    async fn add_city(&self, city: &str) -> ForecastResult<()> {
        self.inner.add_city(city).await
    }
}

struct DeniedLocation;

#[async_trait]
impl LocationProvider for DeniedLocation {
    async fn current_city(&self) -> Result<String, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Reports a city only after a delay
struct SlowLocation {
    city: &'static str,
    delay: Duration,
}

#[async_trait]
impl LocationProvider for SlowLocation {
    async fn current_city(&self) -> Result<String, LocationError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.city.to_string())
    }
}

fn slow_paris() -> Arc<SlowLocation> {
    Arc::new(SlowLocation {
        city: "Paris",
        delay: Duration::from_secs(3),
    })
}

fn controller_with(forecasts: impl ForecastRepository + 'static) -> ForecastController {
    ForecastController::spawn(
        Arc::new(forecasts),
        Arc::new(InMemoryCityRepository::with_sample_cities()),
        ControllerSettings::default(),
    )
}

fn controller() -> ForecastController {
    controller_with(FixtureForecastRepository::default())
}

async fn wait_forecast(
    rx: &mut watch::Receiver<ForecastViewState>,
    predicate: impl FnMut(&ForecastViewState) -> bool,
) -> ForecastViewState {
    let state = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for forecast state")
        .expect("controller stopped");
    ForecastViewState::clone(&state)
}

async fn wait_location(
    rx: &mut watch::Receiver<LocationViewState>,
    predicate: impl FnMut(&LocationViewState) -> bool,
) -> LocationViewState {
    let state = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for location state")
        .expect("controller stopped");
    LocationViewState::clone(&state)
}

fn status(rx: &watch::Receiver<ForecastViewState>) -> ViewStatus {
    rx.borrow().view_status
}

#[tokio::test(start_paused = true)]
async fn test_initial_state_is_loading() {
    let controller = controller();
    let state = controller.forecast_snapshot();
    assert_eq!(state.view_status, ViewStatus::Loading);
    assert!(state.forecast.is_empty());
    assert_eq!(controller.location_snapshot(), LocationViewState::default());
}

#[tokio::test(start_paused = true)]
async fn test_initial_preferences_come_from_settings() {
    let controller = ForecastController::spawn(
        Arc::new(FixtureForecastRepository::default()),
        Arc::new(InMemoryCityRepository::with_sample_cities()),
        ControllerSettings {
            view_type: ViewType::Detailed,
            weather_unit: WeatherUnit::Imperial,
            ..ControllerSettings::default()
        },
    );
    let state = controller.forecast_snapshot();
    assert_eq!(state.view_type, ViewType::Detailed);
    assert_eq!(state.weather_unit, WeatherUnit::Imperial);
}

#[tokio::test(start_paused = true)]
async fn test_get_forecast_runs_and_selects_first_day() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("London".to_string()));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    assert_eq!(state.forecast.city, "London");
    assert_eq!(state.forecast.daily_forecasts.len(), 1);
    assert_eq!(state.selected_daily_forecast, state.forecast.daily_forecasts[0]);
}

#[tokio::test(start_paused = true)]
async fn test_get_forecast_without_days_selects_placeholder() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("Lisbon".to_string()));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    assert_eq!(state.forecast.city, "Lisbon");
    assert!(state.forecast.daily_forecasts.is_empty());
    assert_eq!(state.selected_daily_forecast, DailyForecast::default());
}

#[tokio::test(start_paused = true)]
async fn test_repository_failure_falls_back_to_empty_forecast() {
    let controller = controller_with(FailingForecastRepository);
    let mut rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("London".to_string()));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    assert_eq!(state.forecast, Forecast::default());
}

#[tokio::test(start_paused = true)]
async fn test_field_updates_preserve_status() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("London".to_string()));
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    let picked = DailyForecast {
        temperature: 30,
        ..DailyForecast::default()
    };
    controller.on_forecast_event(ForecastViewEvent::SetSelectedDailyForecast(picked.clone()));
    controller.on_forecast_event(ForecastViewEvent::SetViewType(ViewType::Detailed));
    controller.on_forecast_event(ForecastViewEvent::SetWeatherUnit(WeatherUnit::Imperial));

    let state = wait_forecast(&mut rx, |s| s.weather_unit == WeatherUnit::Imperial).await;
    assert_eq!(state.selected_daily_forecast, picked);
    assert_eq!(state.view_type, ViewType::Detailed);
    assert_eq!(state.view_status, ViewStatus::Running);
    assert_eq!(state.forecast.city, "London");
}

#[tokio::test(start_paused = true)]
async fn test_location_error_reverts_to_idle_after_cooldown() {
    let controller = controller();
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.on_location_event(LocationViewEvent::LocationError);
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::HandlingErrors).await;
    let loc = wait_location(&mut location, |s| s.error_getting_location).await;
    assert!(!loc.error_getting_permissions);

    tokio::time::sleep(COOLDOWN - Duration::from_millis(100)).await;
    assert_eq!(status(&rx), ViewStatus::HandlingErrors);

    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Idle).await;
}

#[tokio::test(start_paused = true)]
async fn test_permissions_error_sets_flag_and_reverts() {
    let controller = controller();
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.on_location_event(LocationViewEvent::PermissionsError);
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::HandlingErrors).await;
    let loc = wait_location(&mut location, |s| s.error_getting_permissions).await;
    assert!(!loc.error_getting_location);

    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Idle).await;
}

#[tokio::test(start_paused = true)]
async fn test_set_location_during_cooldown_cancels_revert() {
    let controller = controller();
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.on_location_event(LocationViewEvent::LocationError);
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::HandlingErrors).await;
    wait_location(&mut location, |s| s.error_getting_location).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    controller.on_location_event(LocationViewEvent::SetLocation("London".to_string()));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;
    assert_eq!(state.forecast.city, "London");

    tokio::time::sleep(COOLDOWN * 2).await;
    assert_eq!(status(&rx), ViewStatus::Running);

    let loc = wait_location(&mut location, |s| s.query == "London").await;
    assert_eq!(loc.cities, vec!["London"]);
    assert!(!loc.has_error());
}

#[tokio::test(start_paused = true)]
async fn test_status_change_during_cooldown_cancels_revert() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::SetViewStatus(ViewStatus::HandlingErrors));
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::HandlingErrors).await;

    controller.on_forecast_event(ForecastViewEvent::SetViewStatus(ViewStatus::Running));
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    tokio::time::sleep(COOLDOWN * 2).await;
    assert_eq!(status(&rx), ViewStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_errors_restart_cooldown() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.on_location_event(LocationViewEvent::LocationError);
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::HandlingErrors).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    controller.on_location_event(LocationViewEvent::PermissionsError);
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(status(&rx), ViewStatus::HandlingErrors);

    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Idle).await;
}

#[tokio::test(start_paused = true)]
async fn test_set_location_adds_city_and_refreshes_search() {
    let controller = controller();
    let mut location = controller.location_state();

    controller.on_location_event(LocationViewEvent::SetLocation("lisbon".to_string()));
    let loc = wait_location(&mut location, |s| s.query == "lisbon").await;

    assert_eq!(loc.cities, vec!["Lisbon"]);
}

#[tokio::test(start_paused = true)]
async fn test_search_cities_filters_by_prefix() {
    let controller = controller();
    let rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.on_location_event(LocationViewEvent::SearchCities("To".to_string()));
    let loc = wait_location(&mut location, |s| s.query == "To").await;

    assert_eq!(loc.cities, vec!["Tokyo", "Toronto"]);
    assert_eq!(status(&rx), ViewStatus::Loading);
}

#[tokio::test(start_paused = true)]
async fn test_empty_search_idles_when_not_running() {
    let controller = controller();
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.on_location_event(LocationViewEvent::SearchCities(String::new()));
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Idle).await;
    let loc = wait_location(&mut location, |s| s.cities.len() == 8).await;
    assert_eq!(loc.query, "");
}

#[tokio::test(start_paused = true)]
async fn test_empty_search_keeps_running() {
    let controller = controller();
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("Paris".to_string()));
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    controller.on_location_event(LocationViewEvent::SearchCities(String::new()));
    wait_location(&mut location, |s| s.cities.len() == 8).await;
    assert_eq!(status(&rx), ViewStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn test_stale_forecast_does_not_overwrite_newer() {
    let controller = controller_with(
        FixtureForecastRepository::default().with_delay("Paris", Duration::from_secs(1)),
    );
    let mut rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("Paris".to_string()));
    controller.on_forecast_event(ForecastViewEvent::GetForecast("London".to_string()));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;
    assert_eq!(state.forecast.city, "London");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(rx.borrow().forecast.city, "London");
}

#[tokio::test(start_paused = true)]
async fn test_stale_search_does_not_overwrite_newer() {
    let controller = ForecastController::spawn(
        Arc::new(FixtureForecastRepository::default()),
        Arc::new(SlowCityRepository {
            inner: InMemoryCityRepository::with_sample_cities(),
            slow_query: "P".to_string(),
        }),
        ControllerSettings::default(),
    );
    let mut location = controller.location_state();

    controller.on_location_event(LocationViewEvent::SearchCities("P".to_string()));
    controller.on_location_event(LocationViewEvent::SearchCities("To".to_string()));
    wait_location(&mut location, |s| s.query == "To").await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    let loc = location.borrow().clone();
    assert_eq!(loc.query, "To");
    assert_eq!(loc.cities, vec!["Tokyo", "Toronto"]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drops_pending_revert() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.on_location_event(LocationViewEvent::LocationError);
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::HandlingErrors).await;

    controller.shutdown().await;
    tokio::time::sleep(COOLDOWN * 2).await;
    assert_eq!(status(&rx), ViewStatus::HandlingErrors);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_pending_fetch() {
    let controller = controller_with(
        FixtureForecastRepository::default().with_delay("London", Duration::from_secs(1)),
    );
    let rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("London".to_string()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(controller);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(status(&rx), ViewStatus::Loading);
    assert!(rx.borrow().forecast.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_locate_fetches_forecast_for_device_city() {
    let controller = ForecastController::spawn(
        Arc::new(GeneratedForecastRepository::seeded(ForecastGenerator::default(), 9)),
        Arc::new(InMemoryCityRepository::with_sample_cities()),
        ControllerSettings::default(),
    );
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.locate(Arc::new(FixedLocation("Lisbon".to_string())));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;
    assert_eq!(state.forecast.city, "Lisbon");
    assert_eq!(state.forecast.daily_forecasts.len(), 7);
    assert_eq!(state.selected_daily_forecast, state.forecast.daily_forecasts[0]);

    let loc = wait_location(&mut location, |s| s.query == "Lisbon").await;
    assert_eq!(loc.cities, vec!["Lisbon"]);
}

#[tokio::test(start_paused = true)]
async fn test_locate_without_service_reports_location_error() {
    let controller = controller();
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.locate(Arc::new(NoLocation));
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::HandlingErrors).await;
    wait_location(&mut location, |s| s.error_getting_location).await;
}

#[tokio::test(start_paused = true)]
async fn test_locate_denied_reports_permissions_error() {
    let controller = controller();
    let mut location = controller.location_state();

    controller.locate(Arc::new(DeniedLocation));
    let loc = wait_location(&mut location, |s| s.error_getting_permissions).await;
    assert!(!loc.error_getting_location);
}

#[tokio::test(start_paused = true)]
async fn test_stale_locate_does_not_overwrite_newer() {
    let controller = controller();
    let mut rx = controller.forecast_state();
    let mut location = controller.location_state();

    controller.locate(slow_paris());
    controller.locate(Arc::new(FixedLocation("London".to_string())));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;
    assert_eq!(state.forecast.city, "London");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(rx.borrow().forecast.city, "London");
    let loc = wait_location(&mut location, |s| s.query == "London").await;
    assert_eq!(loc.cities, vec!["London"]);
}

#[tokio::test(start_paused = true)]
async fn test_set_location_discards_pending_locate() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.locate(slow_paris());
    tokio::time::sleep(Duration::from_secs(1)).await;
    controller.on_location_event(LocationViewEvent::SetLocation("London".to_string()));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;
    assert_eq!(state.forecast.city, "London");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(rx.borrow().forecast.city, "London");
    assert_eq!(controller.location_snapshot().query, "London");
}

#[tokio::test(start_paused = true)]
async fn test_get_forecast_discards_pending_locate() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.locate(slow_paris());
    controller.on_forecast_event(ForecastViewEvent::GetForecast("London".to_string()));
    wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(rx.borrow().forecast.city, "London");
    assert_eq!(controller.location_snapshot(), LocationViewState::default());
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_serializes_for_ui() {
    let controller = controller();
    let mut rx = controller.forecast_state();

    controller.on_forecast_event(ForecastViewEvent::GetForecast("London".to_string()));
    let state = wait_forecast(&mut rx, |s| s.view_status == ViewStatus::Running).await;

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["view_status"], "running");
    assert_eq!(json["forecast"]["city"], "London");
    assert_eq!(json["weather_unit"], "metric");
    assert_eq!(json["selected_daily_forecast"]["weather"], "cloudy");
}
