//! Forecast/location controller.
//!
//! A single worker task owns both view states. UI events, repository
//! completions and timer expiries all arrive on one channel and are handled
//! in order, so state is only ever written from one place. Each async stream
//! (forecast fetch, city search, error revert) keeps a sequence number and
//! only its newest completion is applied.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use weatherfy_core::ControllerConfig;
use weatherfy_forecast::{
    CityRepository, Forecast, ForecastRepository, LocationError, LocationProvider, ViewType,
    WeatherUnit,
};

use crate::events::{ForecastViewEvent, LocationViewEvent};
use crate::state::{ForecastViewState, LocationViewState, ViewStatus};

const DEFAULT_ERROR_COOLDOWN_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// How long `HandlingErrors` is held before reverting to `Idle`
    pub error_cooldown: Duration,
    pub view_type: ViewType,
    pub weather_unit: WeatherUnit,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            error_cooldown: Duration::from_millis(DEFAULT_ERROR_COOLDOWN_MS),
            view_type: ViewType::default(),
            weather_unit: WeatherUnit::default(),
        }
    }
}

impl From<&ControllerConfig> for ControllerSettings {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            error_cooldown: config.error_cooldown(),
            view_type: config.view_type,
            weather_unit: config.weather_unit,
        }
    }
}

enum Command {
    Forecast(ForecastViewEvent),
    Location(LocationViewEvent),
    Locate(Arc<dyn LocationProvider>),
    Located { seq: u64, result: Result<String, LocationError> },
    ForecastLoaded { seq: u64, forecast: Forecast },
    CitiesLoaded { seq: u64, query: String, cities: Vec<String> },
    RevertToIdle { seq: u64 },
}

/// Handle to the controller worker.
///
/// Dropping the handle (or calling [`ForecastController::shutdown`]) cancels
/// every pending fetch and the pending error revert.
pub struct ForecastController {
    commands: mpsc::UnboundedSender<Command>,
    forecast_state: watch::Receiver<ForecastViewState>,
    location_state: watch::Receiver<LocationViewState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ForecastController {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(
        forecasts: Arc<dyn ForecastRepository>,
        cities: Arc<dyn CityRepository>,
        settings: ControllerSettings,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (forecast_tx, forecast_rx) = watch::channel(ForecastViewState::new(
            settings.view_type,
            settings.weather_unit,
        ));
        let (location_tx, location_rx) = watch::channel(LocationViewState::default());
        let shutdown = CancellationToken::new();

        let worker = Worker {
            forecasts,
            cities,
            settings,
            forecast_tx,
            location_tx,
            commands: commands_tx.clone(),
            shutdown: shutdown.clone(),
            location_lookup: Latest::default(),
            forecast_fetch: Latest::default(),
            city_search: Latest::default(),
            revert: Latest::default(),
        };
        let task = tokio::spawn(worker.run(commands_rx));

        Self {
            commands: commands_tx,
            forecast_state: forecast_rx,
            location_state: location_rx,
            shutdown,
            task: Some(task),
        }
    }

    pub fn on_forecast_event(&self, event: ForecastViewEvent) {
        self.send(Command::Forecast(event));
    }

    pub fn on_location_event(&self, event: LocationViewEvent) {
        self.send(Command::Location(event));
    }

    /// Ask `provider` for the device city and feed the outcome back as a
    /// location event.
    ///
    /// Only the newest lookup is applied, and an explicit `SetLocation` or
    /// `GetForecast` made while a lookup is pending discards it.
    pub fn locate(&self, provider: Arc<dyn LocationProvider>) {
        self.send(Command::Locate(provider));
    }

    /// Subscribe to forecast snapshots.
    pub fn forecast_state(&self) -> watch::Receiver<ForecastViewState> {
        self.forecast_state.clone()
    }

    /// Subscribe to location snapshots.
    pub fn location_state(&self) -> watch::Receiver<LocationViewState> {
        self.location_state.clone()
    }

    pub fn forecast_snapshot(&self) -> ForecastViewState {
        self.forecast_state.borrow().clone()
    }

    pub fn location_snapshot(&self) -> LocationViewState {
        self.location_state.borrow().clone()
    }

    /// Stop the worker and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Controller worker ended abnormally: {}", e);
            }
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Controller stopped, dropping event");
        }
    }
}

impl Drop for ForecastController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Newest in-flight task of one logical stream
#[derive(Debug, Default)]
struct Latest {
    seq: u64,
    task: Option<JoinHandle<()>>,
}

impl Latest {
    /// Cancel whatever is in flight and reserve the next sequence number.
    fn next(&mut self) -> u64 {
        self.cancel();
        self.seq += 1;
        self.seq
    }

    fn track(&mut self, task: JoinHandle<()>) {
        self.task = Some(task);
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// True exactly once for the completion of the newest, uncancelled task.
    fn finish(&mut self, seq: u64) -> bool {
        if self.seq == seq && self.task.is_some() {
            self.task = None;
            true
        } else {
            false
        }
    }
}

struct Worker {
    forecasts: Arc<dyn ForecastRepository>,
    cities: Arc<dyn CityRepository>,
    settings: ControllerSettings,
    forecast_tx: watch::Sender<ForecastViewState>,
    location_tx: watch::Sender<LocationViewState>,
    commands: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
    location_lookup: Latest,
    forecast_fetch: Latest,
    city_search: Latest,
    revert: Latest,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::info!("Forecast controller started");
        let shutdown = self.shutdown.clone();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        self.location_lookup.cancel();
        self.forecast_fetch.cancel();
        self.city_search.cancel();
        self.revert.cancel();
        tracing::info!("Forecast controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Forecast(event) => self.on_forecast_event(event),
            Command::Location(event) => self.on_location_event(event),
            Command::Locate(provider) => self.locate(provider),
            Command::Located { seq, result } => {
                if !self.location_lookup.finish(seq) {
                    tracing::debug!("Dropping stale location lookup #{}", seq);
                    return;
                }
                match &result {
                    Ok(city) => tracing::info!("Device located in {}", city),
                    Err(e) => tracing::warn!("Location lookup failed: {}", e),
                }
                match LocationViewEvent::from(result) {
                    LocationViewEvent::SetLocation(city) => self.set_location(city),
                    event => self.on_location_event(event),
                }
            }
            Command::ForecastLoaded { seq, forecast } => {
                if self.forecast_fetch.finish(seq) {
                    self.apply_forecast(forecast);
                } else {
                    tracing::debug!("Dropping stale forecast #{} for {:?}", seq, forecast.city);
                }
            }
            Command::CitiesLoaded { seq, query, cities } => {
                if self.city_search.finish(seq) {
                    self.update_location(|s| {
                        s.query = query;
                        s.cities = cities;
                        s.error_getting_location = false;
                        s.error_getting_permissions = false;
                    });
                } else {
                    tracing::debug!("Dropping stale city search #{} for {:?}", seq, query);
                }
            }
            Command::RevertToIdle { seq } => {
                if self.revert.finish(seq) {
                    tracing::debug!("Error cool-down elapsed");
                    self.set_view_status(ViewStatus::Idle);
                }
            }
        }
    }

    fn on_forecast_event(&mut self, event: ForecastViewEvent) {
        match event {
            ForecastViewEvent::GetForecast(city) => {
                self.location_lookup.cancel();
                self.fetch_forecast(city);
            }
            ForecastViewEvent::SetSelectedDailyForecast(day) => {
                self.update_forecast(|s| s.selected_daily_forecast = day);
            }
            ForecastViewEvent::SetViewStatus(status) => self.set_view_status(status),
            ForecastViewEvent::SetViewType(view_type) => {
                self.update_forecast(|s| s.view_type = view_type);
            }
            ForecastViewEvent::SetWeatherUnit(unit) => {
                self.update_forecast(|s| s.weather_unit = unit);
            }
        }
    }

    fn on_location_event(&mut self, event: LocationViewEvent) {
        match event {
            LocationViewEvent::SetLocation(city) => {
                // The user's pick outranks a pending device lookup
                self.location_lookup.cancel();
                self.set_location(city);
            }
            LocationViewEvent::SearchCities(query) => {
                if query.is_empty() {
                    let status = self.forecast_tx.borrow().view_status;
                    let next = status.on_empty_query();
                    if next != status {
                        self.set_view_status(next);
                    }
                }
                self.search_cities(query, false);
            }
            LocationViewEvent::LocationError => {
                self.set_view_status(ViewStatus::HandlingErrors);
                self.update_location(|s| s.error_getting_location = true);
            }
            LocationViewEvent::PermissionsError => {
                self.set_view_status(ViewStatus::HandlingErrors);
                self.update_location(|s| s.error_getting_permissions = true);
            }
        }
    }

    fn locate(&mut self, provider: Arc<dyn LocationProvider>) {
        let seq = self.location_lookup.next();
        let commands = self.commands.clone();
        let token = self.shutdown.child_token();
        tracing::debug!("Locating device #{}", seq);

        let task = tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = provider.current_city() => result,
            };
            let _ = commands.send(Command::Located { seq, result });
        });
        self.location_lookup.track(task);
    }

    fn set_location(&mut self, city: String) {
        self.fetch_forecast(city.clone());
        self.search_cities(city, true);
    }

    fn fetch_forecast(&mut self, city: String) {
        // A pending fetch will settle the status, so the revert is obsolete
        self.revert.cancel();

        let seq = self.forecast_fetch.next();
        let repository = Arc::clone(&self.forecasts);
        let commands = self.commands.clone();
        let token = self.shutdown.child_token();
        tracing::debug!("Fetching forecast #{} for {:?}", seq, city);

        let task = tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = repository.get_forecast(&city) => result,
            };
            let forecast = result.unwrap_or_else(|e| {
                tracing::warn!("Forecast for {:?} unavailable: {}", city, e);
                Forecast::default()
            });
            let _ = commands.send(Command::ForecastLoaded { seq, forecast });
        });
        self.forecast_fetch.track(task);
    }

    fn search_cities(&mut self, query: String, add_first: bool) {
        let seq = self.city_search.next();
        let repository = Arc::clone(&self.cities);
        let commands = self.commands.clone();
        let token = self.shutdown.child_token();

        let task = tokio::spawn(async move {
            let lookup_query = query.clone();
            let lookup = async move {
                if add_first {
                    if let Err(e) = repository.add_city(&lookup_query).await {
                        tracing::warn!("Could not add city {:?}: {}", lookup_query, e);
                    }
                }
                repository.get_cities(&lookup_query).await.unwrap_or_else(|e| {
                    tracing::warn!("City search for {:?} failed: {}", lookup_query, e);
                    Vec::new()
                })
            };
            let cities = tokio::select! {
                _ = token.cancelled() => return,
                cities = lookup => cities,
            };
            let _ = commands.send(Command::CitiesLoaded { seq, query, cities });
        });
        self.city_search.track(task);
    }

    fn apply_forecast(&mut self, forecast: Forecast) {
        self.revert.cancel();
        let selected = forecast.first_day_or_default();
        tracing::info!(
            "Forecast ready for {:?} ({} days)",
            forecast.city,
            forecast.daily_forecasts.len()
        );
        self.update_forecast(|s| {
            s.forecast = forecast;
            s.selected_daily_forecast = selected;
            s.view_status = ViewStatus::Running;
        });
    }

    fn set_view_status(&mut self, status: ViewStatus) {
        self.revert.cancel();
        self.update_forecast(|s| s.view_status = status);
        if status.auto_reverts() {
            self.schedule_revert();
        }
    }

    fn schedule_revert(&mut self) {
        let seq = self.revert.next();
        let delay = self.settings.error_cooldown;
        let commands = self.commands.clone();
        let token = self.shutdown.child_token();

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = commands.send(Command::RevertToIdle { seq });
                }
            }
        });
        self.revert.track(task);
    }

    fn update_forecast(&self, apply: impl FnOnce(&mut ForecastViewState)) {
        let mut next = self.forecast_tx.borrow().clone();
        apply(&mut next);
        self.forecast_tx.send_replace(next);
    }

    fn update_location(&self, apply: impl FnOnce(&mut LocationViewState)) {
        let mut next = self.location_tx.borrow().clone();
        apply(&mut next);
        self.location_tx.send_replace(next);
    }
}
