use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flycast_core::ride::{ProviderError, ResolvedTrip, RideEstimate, RideProvider};

const SANDBOX_BASE_URL: &str = "https://sandbox-api.uber.com";
const PRODUCTION_BASE_URL: &str = "https://api.uber.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Which Uber API environment the configured token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UberEnvironment {
    Sandbox,
    Production,
}

impl UberEnvironment {
    /// Case-insensitive; anything that is not "production" stays in the
    /// sandbox, the safer default for a guest-scope token.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Sandbox
        }
    }

    fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// Guest trip estimates with a bearer token (guests.trips scope). Requires
/// resolved pickup/dropoff coordinates; trips without them fall through to
/// the next provider.
pub struct UberProvider {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct EstimateRequest {
    pickup: Coordinates,
    dropoff: Coordinates,
    /// Requested pickup time, epoch milliseconds.
    pickup_time: i64,
}

#[derive(Debug, Serialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct EstimatesResponse {
    #[serde(default)]
    product_estimates: Vec<ProductEstimate>,
}

#[derive(Debug, Deserialize)]
struct ProductEstimate {
    estimate_info: Option<EstimateInfo>,
    trip_information: Option<TripInformation>,
}

#[derive(Debug, Deserialize)]
struct EstimateInfo {
    fare: Option<Fare>,
}

#[derive(Debug, Deserialize)]
struct Fare {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct TripInformation {
    estimated_trip_time_seconds: Option<i64>,
}

impl UberProvider {
    pub fn new(token: impl Into<String>, environment: UberEnvironment) -> Result<Self, ProviderError> {
        Self::with_base_url(token, environment.base_url())
    }

    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl RideProvider for UberProvider {
    fn label(&self) -> &'static str {
        "uber"
    }

    async fn estimate(
        &self,
        trip: &ResolvedTrip,
        when: DateTime<Utc>,
    ) -> Result<RideEstimate, ProviderError> {
        let (pickup, dropoff) = trip
            .coords
            .ok_or_else(|| ProviderError::Geocoding("no coordinates resolved for trip".into()))?;

        let url = format!("{}/v1/guest/trips/estimates", self.base_url);
        let request = EstimateRequest {
            pickup: Coordinates { latitude: pickup.lat, longitude: pickup.lng },
            dropoff: Coordinates { latitude: dropoff.lat, longitude: dropoff.lng },
            pickup_time: when.timestamp_millis(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Http(format!(
                "estimates API returned {}",
                response.status()
            )));
        }

        let body: EstimatesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let first = body
            .product_estimates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no product estimates".into()))?;

        let fare = first
            .estimate_info
            .and_then(|info| info.fare)
            .ok_or_else(|| ProviderError::MalformedResponse("estimate missing fare".into()))?;
        let seconds = first
            .trip_information
            .and_then(|t| t.estimated_trip_time_seconds)
            .ok_or_else(|| ProviderError::MalformedResponse("estimate missing trip time".into()))?;

        Ok(RideEstimate {
            cost_cents: (fare.value * 100.0).round() as i64,
            duration_minutes: (seconds as f64 / 60.0).ceil() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flycast_core::ride::GeoPoint;

    fn trip_with_coords() -> ResolvedTrip {
        ResolvedTrip {
            coords: Some((
                GeoPoint { lat: 32.8801, lng: -117.2340 },
                GeoPoint { lat: 32.7336, lng: -117.1897 },
            )),
            distance_miles: Some(10.3),
        }
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(UberEnvironment::parse("production"), UberEnvironment::Production);
        assert_eq!(UberEnvironment::parse("Production"), UberEnvironment::Production);
        assert_eq!(UberEnvironment::parse("sandbox"), UberEnvironment::Sandbox);
        assert_eq!(UberEnvironment::parse(""), UberEnvironment::Sandbox);
        assert_eq!(UberEnvironment::parse("staging"), UberEnvironment::Sandbox);
    }

    #[tokio::test]
    async fn test_estimate_parses_fare_and_duration() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/guest/trips/estimates")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(
                r#"{"product_estimates": [{
                    "estimate_info": {"fare": {"value": 24.49}},
                    "trip_information": {"estimated_trip_time_seconds": 1250}
                }]}"#,
            )
            .create_async()
            .await;

        let provider = UberProvider::with_base_url("test-token", server.url()).unwrap();
        let estimate = provider.estimate(&trip_with_coords(), Utc::now()).await.unwrap();
        assert_eq!(estimate.cost_cents, 2449);
        assert_eq!(estimate.duration_minutes, 21);
    }

    #[tokio::test]
    async fn test_auth_failure_is_a_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/guest/trips/estimates")
            .with_status(401)
            .create_async()
            .await;

        let provider = UberProvider::with_base_url("bad-token", server.url()).unwrap();
        let err = provider.estimate(&trip_with_coords(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
    }

    #[tokio::test]
    async fn test_missing_fare_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/guest/trips/estimates")
            .with_status(200)
            .with_body(r#"{"product_estimates": [{"trip_information": {"estimated_trip_time_seconds": 900}}]}"#)
            .create_async()
            .await;

        let provider = UberProvider::with_base_url("test-token", server.url()).unwrap();
        let err = provider.estimate(&trip_with_coords(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_trip_without_coordinates_is_skipped() {
        let provider =
            UberProvider::with_base_url("test-token", "http://127.0.0.1:1").unwrap();
        let trip = ResolvedTrip { coords: None, distance_miles: Some(8.0) };
        let err = provider.estimate(&trip, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Geocoding(_)));
    }
}
