pub mod distance_matrix;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const FALLBACK_MINUTES_PER_KM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration_minutes: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("routing provider unavailable: {0}")]
    Unavailable(String),

    #[error("routing provider timed out after {0:?}")]
    Timeout(Duration),
}

/// Driving distance/duration lookup backed by an external service.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn distance_duration(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<RouteEstimate, RoutingError>;
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn fallback_estimate(origin: &Coordinates, destination: &Coordinates) -> RouteEstimate {
    let distance_km = haversine_km(origin, destination);
    RouteEstimate {
        distance_km,
        duration_minutes: (distance_km * FALLBACK_MINUTES_PER_KM).ceil() as i64,
    }
}

/// Resolves a route estimate and never fails: provider errors and timeouts degrade to the
/// haversine estimate.
pub struct RouteEstimator {
    provider: Option<Box<dyn RoutingProvider>>,
    timeout: Duration,
}

impl RouteEstimator {
    pub fn new(provider: Option<Box<dyn RoutingProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn fallback_only() -> Self {
        Self {
            provider: None,
            timeout: Duration::from_secs(3),
        }
    }

    pub async fn estimate(&self, origin: &Coordinates, destination: &Coordinates) -> RouteEstimate {
        let Some(provider) = &self.provider else {
            return fallback_estimate(origin, destination);
        };

        let result = tokio::time::timeout(self.timeout, provider.distance_duration(origin, destination))
            .await
            .unwrap_or(Err(RoutingError::Timeout(self.timeout)));

        match result {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(error = %e, "routing provider failed, using straight-line estimate");
                fallback_estimate(origin, destination)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRoute(RouteEstimate);

    #[async_trait]
    impl RoutingProvider for FixedRoute {
        async fn distance_duration(
            &self,
            _origin: &Coordinates,
            _destination: &Coordinates,
        ) -> Result<RouteEstimate, RoutingError> {
            Ok(self.0)
        }
    }

    struct Failing;

    #[async_trait]
    impl RoutingProvider for Failing {
        async fn distance_duration(
            &self,
            _origin: &Coordinates,
            _destination: &Coordinates,
        ) -> Result<RouteEstimate, RoutingError> {
            Err(RoutingError::Unavailable("ZERO_RESULTS".to_string()))
        }
    }

    struct Hanging;

    #[async_trait]
    impl RoutingProvider for Hanging {
        async fn distance_duration(
            &self,
            _origin: &Coordinates,
            _destination: &Coordinates,
        ) -> Result<RouteEstimate, RoutingError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(RoutingError::Unavailable("unreachable".to_string()))
        }
    }

    #[test]
    fn test_haversine_one_degree_of_longitude_at_equator() {
        let d = haversine_km(&Coordinates::new(0.0, 0.0), &Coordinates::new(0.0, 1.0));
        assert!((d - 111.2).abs() < 111.2 * 0.01, "got {d}");
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        let p = Coordinates::new(51.5, -0.12);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn test_fallback_duration_is_three_minutes_per_km_rounded_up() {
        let route = fallback_estimate(&Coordinates::new(0.0, 0.0), &Coordinates::new(0.0, 1.0));
        assert_eq!(route.duration_minutes, (route.distance_km * 3.0).ceil() as i64);
        assert_eq!(route.duration_minutes, 334);
    }

    #[tokio::test]
    async fn test_no_provider_uses_haversine() {
        let estimator = RouteEstimator::fallback_only();
        let route = estimator
            .estimate(&Coordinates::new(0.0, 0.0), &Coordinates::new(0.0, 1.0))
            .await;
        assert!((route.distance_km - 111.19).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_provider_result_is_used() {
        let fixed = RouteEstimate {
            distance_km: 4.0,
            duration_minutes: 9,
        };
        let estimator = RouteEstimator::new(Some(Box::new(FixedRoute(fixed))), Duration::from_secs(1));
        let route = estimator
            .estimate(&Coordinates::new(0.0, 0.0), &Coordinates::new(0.0, 1.0))
            .await;
        assert_eq!(route, fixed);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let estimator = RouteEstimator::new(Some(Box::new(Failing)), Duration::from_secs(1));
        let route = estimator
            .estimate(&Coordinates::new(0.0, 0.0), &Coordinates::new(0.0, 1.0))
            .await;
        assert!((route.distance_km - 111.19).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_provider_timeout_falls_back() {
        let estimator = RouteEstimator::new(Some(Box::new(Hanging)), Duration::from_millis(50));
        let route = estimator
            .estimate(&Coordinates::new(0.0, 0.0), &Coordinates::new(0.0, 1.0))
            .await;
        assert!((route.distance_km - 111.19).abs() < 0.1);
    }
}
