//! Device location seam. Platform lookups live outside this crate; these
//! implementations cover fixed setups and devices without a location service.

use async_trait::async_trait;

use crate::types::LocationError;

/// Resolves the device position to a city name
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_city(&self) -> Result<String, LocationError>;
}

/// Always reports the same city
#[derive(Debug, Clone)]
pub struct FixedLocation(pub String);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_city(&self) -> Result<String, LocationError> {
        Ok(self.0.clone())
    }
}

/// Device without a usable location service
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_city(&self) -> Result<String, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_location() {
        let provider = FixedLocation("Lisbon".to_string());
        assert_eq!(provider.current_city().await.unwrap(), "Lisbon");
    }

    #[tokio::test]
    async fn test_no_location_is_unavailable() {
        assert_eq!(
            NoLocation.current_city().await,
            Err(LocationError::ServiceUnavailable)
        );
    }
}
