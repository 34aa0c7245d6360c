use async_trait::async_trait;

use crate::flight::{FlightAttributes, FlightNumber};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The live source timed out or was unreachable. The orchestrator
    /// offers the mock path as degraded service instead of aborting.
    #[error("flight data source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed response from flight data source: {0}")]
    MalformedResponse(String),
    #[error("no data found for flight {0}")]
    NotFound(String),
}

/// Resolves a flight number to its scheduled attributes. One attempt, no
/// retries: failures surface immediately to keep interactive latency
/// bounded.
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn fetch(&self, flight: &FlightNumber) -> Result<FlightAttributes, LookupError>;
}
