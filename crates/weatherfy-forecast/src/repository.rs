//! Forecast and city repositories.
//!
//! The controller only talks to the [`ForecastRepository`] and
//! [`CityRepository`] traits; the implementations here are in-process and
//! never touch the network.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::generator::ForecastGenerator;
use crate::types::{Forecast, ForecastError, ForecastResult};

pub const DEFAULT_CITY: &str = "San Francisco";

const SAMPLE_CITIES: [&str; 8] = [
    "San Francisco",
    "London",
    "New York",
    "Paris",
    "Moscow",
    "Tokyo",
    "Dubai",
    "Toronto",
];

const KNOWN_CITIES: [&str; 45] = [
    "London",
    "New York",
    "Paris",
    "Moscow",
    "Tokyo",
    "Dubai",
    "Singapore",
    "Barcelona",
    "Los Angeles",
    "San Francisco",
    "Madrid",
    "Rome",
    "Chicago",
    "Toronto",
    "Abu Dhabi",
    "St. Petersburg",
    "Amsterdam",
    "Berlin",
    "Prague",
    "Lisbon",
    "Washington",
    "Istanbul",
    "Las Vegas",
    "Seoul",
    "Sydney",
    "Miami",
    "Munich",
    "Milan",
    "San Diego",
    "Bangkok",
    "Vienna",
    "Dublin",
    "Vancouver",
    "Boston",
    "Zurich",
    "Budapest",
    "Houston",
    "Seattle",
    "Montreal",
    "Hong Kong",
    "Frankfurt",
    "São Paulo",
    "Copenhagen",
    "Atlanta",
    "Buenos Aires",
];

#[async_trait]
pub trait ForecastRepository: Send + Sync {
    /// Forecast for `city`.
    ///
    /// # Errors
    /// Implementations backed by a remote source report failures as
    /// [`ForecastError::Unavailable`].
    async fn get_forecast(&self, city: &str) -> ForecastResult<Forecast>;
}

#[async_trait]
pub trait CityRepository: Send + Sync {
    /// Cities whose name starts with `query`, ignoring case.
    async fn get_cities(&self, query: &str) -> ForecastResult<Vec<String>>;

    async fn default_city(&self) -> ForecastResult<String>;

    /// Store `city` with normalised capitalisation unless it is already known.
    ///
    /// # Errors
    /// Returns [`ForecastError::InvalidCity`] for a blank name.
    async fn add_city(&self, city: &str) -> ForecastResult<()>;
}

/// Forecast repository backed by the synthetic generator
#[derive(Debug)]
pub struct GeneratedForecastRepository {
    generator: ForecastGenerator,
    /// Shared reproducible source; `None` draws from the thread RNG
    rng: Option<Mutex<StdRng>>,
}

impl GeneratedForecastRepository {
    pub fn new(generator: ForecastGenerator) -> Self {
        Self {
            generator,
            rng: None,
        }
    }

    /// Repository with a reproducible random source.
    pub fn seeded(generator: ForecastGenerator, seed: u64) -> Self {
        Self {
            generator,
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

#[async_trait]
impl ForecastRepository for GeneratedForecastRepository {
    async fn get_forecast(&self, city: &str) -> ForecastResult<Forecast> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(Forecast::default());
        }
        Ok(match &self.rng {
            Some(rng) => {
                let now = chrono::Local::now().naive_local();
                self.generator.generate_with(&mut *rng.lock(), city, now)
            }
            None => self.generator.generate(city),
        })
    }
}

/// City list kept in memory, in insertion order
#[derive(Debug)]
pub struct InMemoryCityRepository {
    cities: RwLock<Vec<String>>,
    default_city: String,
}

impl InMemoryCityRepository {
    pub fn new<I, S>(cities: I, default_city: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cities: RwLock::new(cities.into_iter().map(Into::into).collect()),
            default_city: default_city.into(),
        }
    }

    pub fn with_sample_cities() -> Self {
        Self::new(SAMPLE_CITIES, DEFAULT_CITY)
    }

    pub fn with_known_cities() -> Self {
        Self::new(KNOWN_CITIES, DEFAULT_CITY)
    }

    /// Replace the city reported by [`CityRepository::default_city`].
    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    pub fn len(&self) -> usize {
        self.cities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.read().is_empty()
    }
}

#[async_trait]
impl CityRepository for InMemoryCityRepository {
    async fn get_cities(&self, query: &str) -> ForecastResult<Vec<String>> {
        let query = query.to_lowercase();
        Ok(self
            .cities
            .read()
            .iter()
            .filter(|city| city.to_lowercase().starts_with(&query))
            .cloned()
            .collect())
    }

    async fn default_city(&self) -> ForecastResult<String> {
        Ok(self.default_city.clone())
    }

    async fn add_city(&self, city: &str) -> ForecastResult<()> {
        let formatted = format_city(city);
        if formatted.is_empty() {
            return Err(ForecastError::InvalidCity(city.to_string()));
        }

        let key = formatted.to_lowercase();
        let mut cities = self.cities.write();
        if cities.iter().any(|c| c.to_lowercase() == key) {
            return Ok(());
        }
        tracing::debug!("Adding city {:?}", formatted);
        cities.push(formatted);
        Ok(())
    }
}

/// Lowercase everything, then capitalise the first letter of each word.
pub fn format_city(city: &str) -> String {
    city.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_city() {
        assert_eq!(format_city("new york"), "New York");
        assert_eq!(format_city("  SAN   francisco "), "San Francisco");
        assert_eq!(format_city("são paulo"), "São Paulo");
        assert_eq!(format_city("   "), "");
    }

    #[tokio::test]
    async fn test_add_blank_city_is_rejected() {
        let repo = InMemoryCityRepository::with_sample_cities();
        let result = repo.add_city("  ").await;
        assert!(matches!(result, Err(ForecastError::InvalidCity(_))));
        assert_eq!(repo.len(), 8);
    }

    #[tokio::test]
    async fn test_add_city_ignores_case_duplicates() {
        let repo = InMemoryCityRepository::with_sample_cities();
        repo.add_city("lONDON").await.unwrap();
        assert_eq!(repo.len(), 8);
    }

    #[tokio::test]
    async fn test_add_city_normalises() {
        let repo = InMemoryCityRepository::new(Vec::<String>::new(), DEFAULT_CITY);
        assert!(repo.is_empty());
        repo.add_city("buenos aires").await.unwrap();
        assert_eq!(repo.get_cities("b").await.unwrap(), vec!["Buenos Aires"]);
    }

    #[tokio::test]
    async fn test_generated_blank_city_is_empty() {
        let repo = GeneratedForecastRepository::seeded(ForecastGenerator::default(), 1);
        assert_eq!(repo.get_forecast(" ").await.unwrap(), Forecast::default());
    }

    #[tokio::test]
    async fn test_unseeded_repository_generates_a_week() {
        let repo = GeneratedForecastRepository::new(ForecastGenerator::default());
        let forecast = repo.get_forecast("Dubai").await.unwrap();
        assert_eq!(forecast.city, "Dubai");
        assert_eq!(forecast.daily_forecasts.len(), 7);
        assert!(forecast.daily_forecasts.iter().all(|d| !d.hourly_forecasts.is_empty()));
    }

    #[tokio::test]
    async fn test_default_city_override() {
        let repo = InMemoryCityRepository::with_known_cities().with_default_city("Lisbon");
        assert_eq!(repo.default_city().await.unwrap(), "Lisbon");
        assert_eq!(
            InMemoryCityRepository::with_known_cities().default_city().await.unwrap(),
            DEFAULT_CITY
        );
    }

    #[tokio::test]
    async fn test_generated_forecast_is_labelled() {
        let repo = GeneratedForecastRepository::seeded(ForecastGenerator::default(), 1);
        let forecast = repo.get_forecast("Lisbon").await.unwrap();
        assert_eq!(forecast.city, "Lisbon");
        assert_eq!(forecast.daily_forecasts.len(), 7);
    }

    #[test]
    fn test_known_cities_include_default() {
        assert!(KNOWN_CITIES.contains(&DEFAULT_CITY));
    }
}
