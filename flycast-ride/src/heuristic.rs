use async_trait::async_trait;
use chrono::{DateTime, Utc};

use flycast_core::ride::{ProviderError, ResolvedTrip, RideEstimate, RideProvider};

/// Flat rate applied when no live provider answered.
const RATE_CENTS_PER_MILE: f64 = 245.0;
/// Fixed pace, roughly city driving with some slack.
const MINUTES_PER_MILE: f64 = 2.1;

/// The zero-configuration floor of the provider chain: needs only a
/// positive distance, so the user always gets a number even with no
/// credentials configured.
pub struct HeuristicEstimator;

#[async_trait]
impl RideProvider for HeuristicEstimator {
    fn label(&self) -> &'static str {
        "heuristic"
    }

    async fn estimate(
        &self,
        trip: &ResolvedTrip,
        _when: DateTime<Utc>,
    ) -> Result<RideEstimate, ProviderError> {
        let miles = trip
            .distance_miles
            .filter(|m| m.is_finite() && *m > 0.0)
            .ok_or_else(|| ProviderError::Geocoding("no trip distance available".into()))?;

        Ok(RideEstimate {
            cost_cents: (miles * RATE_CENTS_PER_MILE).round() as i64,
            duration_minutes: (miles * MINUTES_PER_MILE).ceil() as i64,
        })
    }
}
