//! Synthetic forecast generation.
//!
//! Produces a week of daily readings, each with hourly entries for the rest
//! of that day. Values are random but stay inside [`GeneratorBounds`], and
//! every reading is classified with [`Weather::classify`].

use chrono::{Duration, Local, NaiveDateTime, NaiveTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{DailyForecast, Forecast, HourlyForecast, Weather};

/// Number of days in a generated forecast
pub const FORECAST_DAYS: u32 = 7;

const LAST_HOUR: u32 = 23;
const SPREAD_FACTOR: f32 = 1.2;

/// Upper bounds (exclusive) for generated readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorBounds {
    /// Degrees Celsius
    pub max_temperature: i32,
    /// km/h
    pub max_wind_speed: i32,
    /// Percent
    pub max_precipitation: i32,
}

impl Default for GeneratorBounds {
    fn default() -> Self {
        Self {
            max_temperature: 35,
            max_wind_speed: 40,
            max_precipitation: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForecastGenerator {
    bounds: GeneratorBounds,
}

impl ForecastGenerator {
    pub fn new(bounds: GeneratorBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> GeneratorBounds {
        self.bounds
    }

    /// Generate a forecast for `city` starting at the current local hour.
    pub fn generate(&self, city: &str) -> Forecast {
        self.generate_with(&mut rand::thread_rng(), city, Local::now().naive_local())
    }

    /// Generate a forecast from an explicit random source and clock.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        city: &str,
        now: NaiveDateTime,
    ) -> Forecast {
        let today = now.date();
        let current_hour = now.hour();

        let daily_forecasts = (0..FORECAST_DAYS)
            .map(|day_number| {
                let start_hour = if day_number == 0 { current_hour } else { 0 };
                let day_start = (today + Duration::days(i64::from(day_number)))
                    .and_time(NaiveTime::default())
                    + Duration::hours(i64::from(start_hour));
                self.generate_day(rng, day_start)
            })
            .collect();

        tracing::debug!("Generated {}-day forecast for {:?}", FORECAST_DAYS, city);

        Forecast {
            city: city.to_string(),
            daily_forecasts,
        }
    }

    fn generate_day<R: Rng + ?Sized>(&self, rng: &mut R, day_start: NaiveDateTime) -> DailyForecast {
        let temperature = draw(rng, 0, self.bounds.max_temperature);
        let max_temperature =
            ((temperature as f32 * SPREAD_FACTOR).round() as i32).min(self.bounds.max_temperature);
        let min_temperature = ((temperature as f32 / SPREAD_FACTOR).round() as i32).max(0);
        let wind_speed = draw(rng, 0, self.bounds.max_wind_speed);
        let precipitation = draw(rng, 0, self.bounds.max_precipitation);

        DailyForecast {
            timestamp: day_start,
            hourly_forecasts: self.generate_hours(
                rng,
                day_start,
                temperature,
                min_temperature,
                max_temperature,
            ),
            temperature,
            min_temperature,
            max_temperature,
            precipitation_probability: precipitation,
            wind_speed,
            weather: Weather::classify(temperature, wind_speed, precipitation),
        }
    }

    fn generate_hours<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        day_start: NaiveDateTime,
        first_temperature: i32,
        min_temperature: i32,
        max_temperature: i32,
    ) -> Vec<HourlyForecast> {
        let first_hour = day_start.hour();

        (first_hour..=LAST_HOUR)
            .map(|hour| {
                let temperature = if hour == first_hour {
                    first_temperature
                } else {
                    draw(rng, min_temperature, max_temperature)
                };
                let wind_speed = draw(rng, 0, self.bounds.max_wind_speed);
                let precipitation = draw(rng, 0, self.bounds.max_precipitation);

                HourlyForecast {
                    timestamp: day_start + Duration::hours(i64::from(hour - first_hour)),
                    temperature,
                    weather: Weather::classify(temperature, wind_speed, precipitation),
                }
            })
            .collect()
    }
}

/// Uniform draw from `[low, high)`, or `low` for an empty range.
fn draw<R: Rng + ?Sized>(rng: &mut R, low: i32, high: i32) -> i32 {
    if high <= low {
        low
    } else {
        rng.gen_range(low..high)
    }
}
