mod orchestrator;
mod prompts;

use std::io;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flycast_core::lookup::FlightSource;
use flycast_core::ride::RideProvider;
use flycast_lookup::{AviationStackClient, MockFlightSource};
use flycast_predict::{DelayModel, DelayPredictor};
use flycast_ride::{MapsGeocoder, RideshareEstimator, UberEnvironment, UberProvider};
use flycast_store::{Config, DbClient, PostgresMatchRepository, PostgresTripRepository};

use orchestrator::{Orchestrator, Persistence};
use prompts::Console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let default_filter = if config.debug {
        "flycast_cli=debug,flycast_lookup=debug,flycast_predict=debug,flycast_ride=debug,flycast_store=debug"
    } else {
        "flycast_cli=info,flycast_lookup=info,flycast_predict=info,flycast_ride=info,flycast_store=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Model artifact: the configured path, or the embedded default so the
    // tool works from a fresh checkout. A schema mismatch here is fatal.
    let model = match &config.model.path {
        Some(path) => DelayModel::load(path)?,
        None => DelayModel::embedded_default()?,
    };
    let predictor = DelayPredictor::new(model);

    let live_source: Option<Arc<dyn FlightSource>> = if config.lookup.use_mock {
        None
    } else {
        match &config.lookup.api_key {
            Some(key) => Some(Arc::new(AviationStackClient::new(key.clone())?)),
            None => {
                tracing::warn!("live lookup enabled but no API key configured; using local flight data");
                None
            }
        }
    };

    let geocoder = match &config.maps.api_key {
        Some(key) => Some(MapsGeocoder::new(key.clone())?),
        None => None,
    };
    let mut providers: Vec<Arc<dyn RideProvider>> = Vec::new();
    if let Some(token) = &config.uber.token {
        let environment = UberEnvironment::parse(&config.uber.environment);
        providers.push(Arc::new(UberProvider::new(token.clone(), environment)?));
    }
    let estimator = RideshareEstimator::new(geocoder, providers);

    // The database is optional at startup: without it the run still
    // completes, it just cannot save.
    let persistence = match DbClient::connect(&config.database).await {
        Ok(db) => match db.migrate().await {
            Ok(()) => Some(Persistence {
                trips: Arc::new(PostgresTripRepository::new(db.pool.clone())),
                matches: Arc::new(PostgresMatchRepository::new(db.pool.clone())),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "database migrations failed; saving disabled");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "database unavailable; saving disabled");
            None
        }
    };

    let orchestrator = Orchestrator::new(
        config.lookup.use_mock,
        live_source,
        Arc::new(MockFlightSource::new()),
        predictor,
        estimator,
        persistence,
    );

    let stdin = io::stdin().lock();
    let stdout = io::stdout();
    let mut console = Console::new(stdin, stdout);
    orchestrator.run(&mut console).await
}
