pub mod estimator;
pub mod geocode;
pub mod heuristic;
pub mod uber;

pub use estimator::RideshareEstimator;
pub use geocode::MapsGeocoder;
pub use heuristic::HeuristicEstimator;
pub use uber::{UberEnvironment, UberProvider};
