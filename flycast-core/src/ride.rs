use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trip input as entered by the user: a pair of addresses to be geocoded,
/// or a direct distance that bypasses geocoding entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum TripSpec {
    Addresses { pickup: String, dropoff: String },
    DistanceMiles(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A trip after address resolution. Providers consume this rather than the
/// raw `TripSpec` so each one sees the same resolved inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrip {
    pub coords: Option<(GeoPoint, GeoPoint)>,
    pub distance_miles: Option<f64>,
}

/// A cost/time estimate. Cost is integer cents; which provider produced it
/// is deliberately not part of the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RideEstimate {
    pub cost_cents: i64,
    pub duration_minutes: i64,
}

impl RideEstimate {
    pub fn cost_dollars(&self) -> f64 {
        self.cost_cents as f64 / 100.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider not configured: {0}")]
    NotConfigured(&'static str),
    #[error("provider request failed: {0}")]
    Http(String),
    #[error("provider returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("could not resolve trip geometry: {0}")]
    Geocoding(String),
}

/// One rideshare estimate source. Implementations must be independent: a
/// failure here never aborts the chain, the estimator just moves on.
#[async_trait]
pub trait RideProvider: Send + Sync {
    /// Short name used in diagnostic logs only; never shown in results.
    fn label(&self) -> &'static str;

    async fn estimate(
        &self,
        trip: &ResolvedTrip,
        when: DateTime<Utc>,
    ) -> Result<RideEstimate, ProviderError>;
}
