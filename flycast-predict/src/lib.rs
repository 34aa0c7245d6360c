pub mod features;
pub mod model;

pub use features::FeatureVector;
pub use model::{DelayModel, PredictError};

use flycast_core::flight::FlightAttributes;

/// Delay inference over a loaded model artifact. Stateless and
/// side-effect free: the same attributes always produce the same estimate.
pub struct DelayPredictor {
    model: DelayModel,
}

impl DelayPredictor {
    pub fn new(model: DelayModel) -> Self {
        Self { model }
    }

    /// Predicted delay in whole minutes, floored at zero. A negative raw
    /// score means "early", which is not a user-facing concept here.
    pub fn predict(&self, attrs: &FlightAttributes) -> Result<i32, PredictError> {
        let features = FeatureVector::extract(attrs, &self.model.encoders);
        let inputs = features.as_array();

        if self.model.weights.len() != inputs.len() {
            return Err(PredictError::FeatureSchemaMismatch {
                expected: model::FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect(),
                found: self.model.feature_names.clone(),
            });
        }

        let raw: f64 = self
            .model
            .weights
            .iter()
            .zip(inputs.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.model.intercept;

        tracing::debug!(raw_score = raw, "delay inference complete");
        Ok(raw.round().max(0.0) as i32)
    }

    pub fn model(&self) -> &DelayModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use flycast_core::flight::FlightNumber;
    use crate::model::CategoryEncoders;
    use std::collections::HashMap;

    fn attrs(airline: &str, origin: &str, destination: &str, hour: u32) -> FlightAttributes {
        let departure = Utc.with_ymd_and_hms(2025, 7, 8, hour, 5, 0).unwrap();
        FlightAttributes {
            flight_number: FlightNumber::parse("WN1254").unwrap(),
            airline: airline.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            scheduled_departure: departure,
            scheduled_arrival: departure + chrono::Duration::minutes(95),
            gate: None,
            terminal: None,
            status: None,
        }
    }

    fn test_model(weights: [f64; 5], intercept: f64) -> DelayModel {
        let mut airline = HashMap::new();
        airline.insert("Southwest Airlines".to_string(), 3i64);
        let mut airports = HashMap::new();
        airports.insert("SAN".to_string(), 2i64);
        airports.insert("SMF".to_string(), 5i64);

        DelayModel {
            schema_version: 1,
            feature_names: model::FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect(),
            encoders: CategoryEncoders {
                airline,
                origin: airports.clone(),
                destination: airports,
            },
            weights: weights.to_vec(),
            intercept,
            mae: None,
        }
    }

    #[test]
    fn test_predict_is_deterministic_and_nonnegative() {
        let predictor = DelayPredictor::new(test_model([0.1, 0.1, 0.5, 0.4, 1.0], 5.0));
        let a = attrs("Southwest Airlines", "SAN", "SMF", 15);
        let first = predictor.predict(&a).unwrap();
        let second = predictor.predict(&a).unwrap();
        assert_eq!(first, second);
        assert!(first >= 0);
    }

    #[test]
    fn test_negative_raw_score_clamps_to_zero() {
        let predictor = DelayPredictor::new(test_model([0.0, 0.0, 0.0, 0.0, 0.0], -25.0));
        let delay = predictor.predict(&attrs("Southwest Airlines", "SAN", "SMF", 9)).unwrap();
        assert_eq!(delay, 0);
    }

    #[test]
    fn test_unknown_categories_encode_to_zero() {
        let predictor = DelayPredictor::new(test_model([1.0, 1.0, 1.0, 0.0, 0.0], 0.0));
        // None of these values exist in the encoder maps.
        let delay = predictor.predict(&attrs("Mystery Air", "XXX", "YYY", 0)).unwrap();
        assert_eq!(delay, 0);
    }

    #[test]
    fn test_hour_and_weekday_feed_the_score() {
        let predictor = DelayPredictor::new(test_model([0.0, 0.0, 0.0, 1.0, 0.0], 0.0));
        let delay = predictor.predict(&attrs("Southwest Airlines", "SAN", "SMF", 17)).unwrap();
        assert_eq!(delay, 17);
    }
}
