use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use flycast_core::flight::{FlightAttributes, FlightNumber};
use flycast_core::lookup::{FlightSource, LookupError};

const DEFAULT_BASE_URL: &str = "http://api.aviationstack.com";

/// The user is waiting at a prompt, so one short attempt and no retries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Live flight lookup against the AviationStack flights endpoint.
pub struct AviationStackClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

// Wire types for the slice of the flights payload we consume.

#[derive(Debug, Deserialize)]
struct FlightsResponse {
    #[serde(default)]
    data: Vec<FlightRecord>,
}

#[derive(Debug, Deserialize)]
struct FlightRecord {
    #[serde(default)]
    flight_status: Option<String>,
    departure: Option<EndpointRecord>,
    arrival: Option<EndpointRecord>,
    airline: Option<AirlineRecord>,
}

#[derive(Debug, Deserialize)]
struct EndpointRecord {
    #[serde(default)]
    iata: Option<String>,
    #[serde(default)]
    scheduled: Option<String>,
    #[serde(default)]
    gate: Option<String>,
    #[serde(default)]
    terminal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirlineRecord {
    #[serde(default)]
    name: Option<String>,
}

impl AviationStackClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, LookupError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    fn extract(
        flight: &FlightNumber,
        record: FlightRecord,
    ) -> Result<FlightAttributes, LookupError> {
        let departure = record
            .departure
            .ok_or_else(|| LookupError::MalformedResponse("missing departure block".into()))?;
        let arrival = record
            .arrival
            .ok_or_else(|| LookupError::MalformedResponse("missing arrival block".into()))?;

        let airline = record
            .airline
            .and_then(|a| a.name)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LookupError::MalformedResponse("missing airline name".into()))?;

        let origin = departure
            .iata
            .filter(|code| !code.is_empty())
            .ok_or_else(|| LookupError::MalformedResponse("missing departure airport".into()))?;
        let destination = arrival
            .iata
            .filter(|code| !code.is_empty())
            .ok_or_else(|| LookupError::MalformedResponse("missing arrival airport".into()))?;

        let scheduled_departure = parse_schedule(departure.scheduled.as_deref())?;
        let scheduled_arrival = parse_schedule(arrival.scheduled.as_deref())?;

        Ok(FlightAttributes {
            flight_number: flight.clone(),
            airline,
            origin,
            destination,
            scheduled_departure,
            scheduled_arrival,
            gate: departure.gate,
            terminal: departure.terminal,
            status: record.flight_status,
        })
    }
}

fn parse_schedule(raw: Option<&str>) -> Result<DateTime<Utc>, LookupError> {
    let raw = raw
        .ok_or_else(|| LookupError::MalformedResponse("missing scheduled time".into()))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LookupError::MalformedResponse(format!("bad scheduled time '{raw}': {e}")))
}

#[async_trait]
impl FlightSource for AviationStackClient {
    async fn fetch(&self, flight: &FlightNumber) -> Result<FlightAttributes, LookupError> {
        let url = format!("{}/v1/flights", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", self.api_key.as_str()), ("flight_iata", flight.as_str())])
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Unavailable(format!(
                "flight API returned {}",
                response.status()
            )));
        }

        let body: FlightsResponse = response
            .json()
            .await
            .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

        let record = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(flight.to_string()))?;

        tracing::debug!(flight = %flight, "resolved flight from live source");
        Self::extract(flight, record)
    }
}
