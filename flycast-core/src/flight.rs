use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Validated IATA-style flight number: a 2-3 character airline designator
/// followed by 1-4 digits, e.g. "WN1254" or "B62214".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightNumber(String);

impl FlightNumber {
    /// Parse user input into a flight number. Input is trimmed and
    /// uppercased before validation.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let code = input.trim().to_ascii_uppercase();

        if code.len() < 3 || code.len() > 7 {
            return Err(CoreError::InvalidInput(format!(
                "flight number '{}' must be an airline code followed by 1-4 digits",
                input.trim()
            )));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidInput(format!(
                "flight number '{}' contains non-alphanumeric characters",
                input.trim()
            )));
        }

        // Designator is 3 characters when the third is a letter ("SWA123"),
        // otherwise 2 ("WN1254", "B62214").
        let split = if code.as_bytes()[2].is_ascii_alphabetic() { 3 } else { 2 };
        if code.len() <= split {
            return Err(CoreError::InvalidInput(format!(
                "flight number '{}' is missing its numeric part",
                input.trim()
            )));
        }

        let (designator, number) = code.split_at(split);
        if !designator.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::InvalidInput(format!(
                "flight number '{}' has no airline designator",
                input.trim()
            )));
        }
        if number.len() > 4 || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::InvalidInput(format!(
                "flight number '{}' must end in 1-4 digits",
                input.trim()
            )));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The airline designator portion, e.g. "WN" for "WN1254".
    pub fn designator(&self) -> &str {
        let split = if self.0.as_bytes()[2].is_ascii_alphabetic() { 3 } else { 2 };
        &self.0[..split]
    }
}

impl std::fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attributes of a scheduled flight as resolved by a lookup source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightAttributes {
    pub flight_number: FlightNumber,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub status: Option<String>,
}

/// A resolved flight plus its delay prediction. Immutable once persisted;
/// each CLI run that saves produces a new row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightQuery {
    pub attributes: FlightAttributes,
    pub predicted_delay_minutes: i32,
}
