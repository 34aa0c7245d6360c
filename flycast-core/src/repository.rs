use async_trait::async_trait;
use uuid::Uuid;

use crate::flight::{FlightNumber, FlightQuery};
use crate::ride::RideEstimate;
use crate::user::UserProfile;

/// Identifiers produced by a successful trip save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedTrip {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub ride_id: Option<Uuid>,
}

/// Repository trait for the user -> flight -> rideshare result graph.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Persist the user (insert-or-update by email), the flight query, and
    /// the optional rideshare estimate as one transaction. Either all three
    /// land or none do.
    async fn save_trip(
        &self,
        user: &UserProfile,
        query: &FlightQuery,
        ride: Option<&RideEstimate>,
    ) -> Result<SavedTrip, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the same-flight match aggregate.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Add a consented user to the match row for a flight number. Adding an
    /// already-present id is a no-op.
    async fn record_match(
        &self,
        flight: &FlightNumber,
        user_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
