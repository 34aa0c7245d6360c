use std::sync::Arc;

use chrono::{DateTime, Utc};

use flycast_core::ride::{ResolvedTrip, RideEstimate, RideProvider, TripSpec};

use crate::geocode::{haversine_miles, MapsGeocoder};
use crate::heuristic::HeuristicEstimator;

/// Tries providers in fixed priority order; the first valid estimate wins.
/// The heuristic floor is always appended, so as long as a positive trip
/// distance can be established the caller gets a number. Which provider won
/// is logged at debug and never exposed in the result.
pub struct RideshareEstimator {
    geocoder: Option<MapsGeocoder>,
    providers: Vec<Arc<dyn RideProvider>>,
}

impl RideshareEstimator {
    pub fn new(geocoder: Option<MapsGeocoder>, configured: Vec<Arc<dyn RideProvider>>) -> Self {
        let mut providers = configured;
        providers.push(Arc::new(HeuristicEstimator));
        Self { geocoder, providers }
    }

    pub async fn estimate(&self, trip: &TripSpec, when: DateTime<Utc>) -> Option<RideEstimate> {
        let resolved = self.resolve(trip).await;

        for provider in &self.providers {
            match provider.estimate(&resolved, when).await {
                Ok(estimate) => {
                    tracing::debug!(path = provider.label(), "estimate path used");
                    return Some(estimate);
                }
                Err(e) => {
                    tracing::debug!(path = provider.label(), error = %e, "provider failed, trying next");
                }
            }
        }

        tracing::debug!("no estimate path produced a result");
        None
    }

    /// Resolve user input to coordinates and a distance. Geocoding failures
    /// leave both unset; the chain then decides what it can still do.
    async fn resolve(&self, trip: &TripSpec) -> ResolvedTrip {
        match trip {
            TripSpec::DistanceMiles(miles) => {
                ResolvedTrip { coords: None, distance_miles: Some(*miles) }
            }
            TripSpec::Addresses { pickup, dropoff } => {
                let geocoder = match &self.geocoder {
                    Some(g) => g,
                    None => {
                        tracing::debug!("no maps provider configured, cannot resolve addresses");
                        return ResolvedTrip { coords: None, distance_miles: None };
                    }
                };

                match (geocoder.geocode(pickup).await, geocoder.geocode(dropoff).await) {
                    (Ok(from), Ok(to)) => ResolvedTrip {
                        coords: Some((from, to)),
                        distance_miles: Some(haversine_miles(from, to)),
                    },
                    (from, to) => {
                        for err in [from.err(), to.err()].into_iter().flatten() {
                            tracing::debug!(error = %err, "geocoding failed");
                        }
                        ResolvedTrip { coords: None, distance_miles: None }
                    }
                }
            }
        }
    }
}
