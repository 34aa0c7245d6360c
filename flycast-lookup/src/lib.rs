pub mod live;
pub mod mock;

pub use live::AviationStackClient;
pub use mock::MockFlightSource;
