use chrono::{Datelike, Timelike};

use flycast_core::flight::FlightAttributes;

use crate::model::{CategoryEncoders, NUM_FEATURES};

/// The fixed-shape input vector for delay inference, in schema order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub origin_encoded: f64,
    pub destination_encoded: f64,
    pub airline_encoded: f64,
    pub hour: f64,
    /// Monday = 0 .. Sunday = 6, matching the training pipeline.
    pub weekday: f64,
}

impl FeatureVector {
    pub fn extract(attrs: &FlightAttributes, encoders: &CategoryEncoders) -> Self {
        let departure = attrs.scheduled_departure;
        Self {
            origin_encoded: encode(&encoders.origin, &attrs.origin),
            destination_encoded: encode(&encoders.destination, &attrs.destination),
            airline_encoded: encode(&encoders.airline, &attrs.airline),
            hour: departure.hour() as f64,
            weekday: departure.weekday().num_days_from_monday() as f64,
        }
    }

    pub fn as_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.origin_encoded,
            self.destination_encoded,
            self.airline_encoded,
            self.hour,
            self.weekday,
        ]
    }
}

fn encode(table: &std::collections::HashMap<String, i64>, value: &str) -> f64 {
    table.get(value).copied().unwrap_or(0) as f64
}
