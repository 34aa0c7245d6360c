use std::io::{self, BufRead, Write};
use std::sync::Arc;

use chrono::Utc;

use flycast_core::flight::{FlightAttributes, FlightNumber, FlightQuery};
use flycast_core::lookup::FlightSource;
use flycast_core::repository::{MatchRepository, TripRepository};
use flycast_core::ride::{RideEstimate, TripSpec};
use flycast_core::user::{is_valid_email, UserProfile};
use flycast_predict::DelayPredictor;
use flycast_ride::RideshareEstimator;

use crate::prompts::Console;

/// Repositories behind the save step. Absent when the database could not be
/// reached at startup; the run then completes without persisting.
pub struct Persistence {
    pub trips: Arc<dyn TripRepository>,
    pub matches: Arc<dyn MatchRepository>,
}

/// Sequences one interactive run: collect identity, look up the flight,
/// predict the delay, optionally estimate a ride, optionally persist.
/// Every optional step is skippable and skipping never blocks completion.
pub struct Orchestrator {
    use_mock: bool,
    live_source: Option<Arc<dyn FlightSource>>,
    mock_source: Arc<dyn FlightSource>,
    predictor: DelayPredictor,
    estimator: RideshareEstimator,
    persistence: Option<Persistence>,
}

impl Orchestrator {
    pub fn new(
        use_mock: bool,
        live_source: Option<Arc<dyn FlightSource>>,
        mock_source: Arc<dyn FlightSource>,
        predictor: DelayPredictor,
        estimator: RideshareEstimator,
        persistence: Option<Persistence>,
    ) -> Self {
        Self { use_mock, live_source, mock_source, predictor, estimator, persistence }
    }

    pub async fn run<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> anyhow::Result<()> {
        console.say("=== FlyCast ===")?;

        // 1. Identity and consent
        let name = console.prompt_nonempty("Your name: ")?;
        let email = loop {
            let value = console.prompt_nonempty("Your email (used to save your flights): ")?;
            if is_valid_email(&value) {
                break value;
            }
            console.warn("That doesn't look like a valid email. Try again.")?;
        };
        let school_year = console
            .prompt_optional("School year (freshman/sophomore/junior/senior/grad) [optional]: ")?;
        let consented = console
            .prompt_yes_no("Opt in to public matching with other students on the same flight?", false)?;
        let user = UserProfile { name, email, school_year, consented };

        // 2. Flight number, reprompting until well-formed
        let flight = loop {
            let raw = console.prompt_nonempty("Enter flight number (e.g., WN1254): ")?;
            match FlightNumber::parse(&raw) {
                Ok(flight) => break flight,
                Err(e) => {
                    tracing::debug!(error = %e, "rejected flight number input");
                    console.warn("Invalid flight number format. Please enter something like 'WN1254'.")?;
                }
            }
        };

        // 3. Lookup, degrading to the local dataset when the live source fails
        let attrs = match self.lookup(console, &flight).await? {
            Some(attrs) => attrs,
            None => {
                console.say("Done.")?;
                return Ok(());
            }
        };
        console.say(&format!(
            "\n{} {} from {} to {}, departs {}",
            attrs.airline,
            flight,
            attrs.origin,
            attrs.destination,
            attrs.scheduled_departure.format("%Y-%m-%d %H:%M UTC")
        ))?;
        if attrs.gate.is_some() || attrs.terminal.is_some() {
            console.say(&format!(
                "Gate {}, Terminal {}",
                attrs.gate.as_deref().unwrap_or("TBD"),
                attrs.terminal.as_deref().unwrap_or("TBD")
            ))?;
        }

        // 4. Predict. A schema mismatch here means a stale model artifact,
        //    which is a defect rather than a runtime condition.
        let delay = self.predictor.predict(&attrs).map_err(|e| {
            tracing::error!(error = %e, "delay prediction failed, model artifact is stale");
            e
        })?;
        console.say(&format!("Predicted delay for {flight}: {delay} minutes"))?;

        // 5. Optional rideshare estimate
        let mut ride: Option<RideEstimate> = None;
        if console.prompt_yes_no("Estimate a rideshare to the airport?", false)? {
            let trip = self.prompt_trip(console)?;
            let lead_minutes = self.prompt_lead_minutes(console)?;
            let when = Utc::now() + chrono::Duration::minutes(lead_minutes);

            match self.estimator.estimate(&trip, when).await {
                Some(estimate) => {
                    console.say(&format!(
                        "Estimated ride: ${:.2}, about {} minutes",
                        estimate.cost_dollars(),
                        estimate.duration_minutes
                    ))?;
                    ride = Some(estimate);
                }
                None => console.warn("Could not estimate a ride for that trip.")?,
            }
        }

        // 6. Optional save
        if console.prompt_yes_no("Save this to your FlyCast history?", true)? {
            let query = FlightQuery { attributes: attrs, predicted_delay_minutes: delay };
            self.save(console, &user, &query, ride.as_ref()).await?;
        }

        console.say("Done.")?;
        Ok(())
    }

    async fn lookup<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        flight: &FlightNumber,
    ) -> anyhow::Result<Option<FlightAttributes>> {
        let live = match &self.live_source {
            Some(live) if !self.use_mock => live,
            _ => return Ok(Some(self.mock_source.fetch(flight).await?)),
        };

        match live.fetch(flight).await {
            Ok(attrs) => Ok(Some(attrs)),
            Err(e) => {
                tracing::warn!(error = %e, "live flight lookup failed");
                console.warn("Live flight lookup is unavailable right now.")?;
                if console.prompt_yes_no("Use local flight data instead?", true)? {
                    Ok(Some(self.mock_source.fetch(flight).await?))
                } else {
                    console.warn("Could not fetch flight data.")?;
                    Ok(None)
                }
            }
        }
    }

    fn prompt_trip<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> io::Result<TripSpec> {
        loop {
            match console.prompt_optional("Trip distance in miles (press Enter to give addresses): ")? {
                Some(raw) => match raw.parse::<f64>() {
                    Ok(miles) if miles > 0.0 && miles.is_finite() => {
                        return Ok(TripSpec::DistanceMiles(miles))
                    }
                    _ => console.warn("Please enter a positive number of miles.")?,
                },
                None => {
                    let pickup = console.prompt_nonempty("Pickup address: ")?;
                    let dropoff = console.prompt_nonempty("Dropoff address: ")?;
                    return Ok(TripSpec::Addresses { pickup, dropoff });
                }
            }
        }
    }

    fn prompt_lead_minutes<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> io::Result<i64> {
        loop {
            match console.prompt_optional("Minutes until pickup [now]: ")? {
                None => return Ok(0),
                Some(raw) => match raw.parse::<i64>() {
                    Ok(minutes) if minutes >= 0 => return Ok(minutes),
                    _ => console.warn("Please enter a whole number of minutes.")?,
                },
            }
        }
    }

    async fn save<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        user: &UserProfile,
        query: &FlightQuery,
        ride: Option<&RideEstimate>,
    ) -> anyhow::Result<()> {
        let persistence = match &self.persistence {
            Some(persistence) => persistence,
            None => {
                console.warn("Database is unavailable. This run was not saved.")?;
                return Ok(());
            }
        };

        match persistence.trips.save_trip(user, query, ride).await {
            Ok(saved) => {
                console.say("Saved to database.")?;
                // The match table is experimental: a failure here is logged
                // and never unwinds the committed trip save.
                if user.consented {
                    if let Err(e) = persistence
                        .matches
                        .record_match(&query.attributes.flight_number, saved.user_id)
                        .await
                    {
                        tracing::warn!(error = %e, "flight match update failed");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "trip save failed");
                console.warn("Could not save to the database. This run was not saved.")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flycast_core::lookup::LookupError;
    use flycast_core::repository::SavedTrip;
    use flycast_lookup::MockFlightSource;
    use flycast_predict::DelayModel;
    use std::io::Cursor;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeTripRepository {
        saved: Mutex<Vec<(UserProfile, FlightQuery, Option<RideEstimate>)>>,
        fail: bool,
    }

    #[async_trait]
    impl TripRepository for FakeTripRepository {
        async fn save_trip(
            &self,
            user: &UserProfile,
            query: &FlightQuery,
            ride: Option<&RideEstimate>,
        ) -> Result<SavedTrip, Box<dyn std::error::Error + Send + Sync>> {
            if self.fail {
                return Err("database unreachable".into());
            }
            self.saved
                .lock()
                .unwrap()
                .push((user.clone(), query.clone(), ride.copied()));
            Ok(SavedTrip {
                user_id: Uuid::new_v4(),
                flight_id: Uuid::new_v4(),
                ride_id: ride.map(|_| Uuid::new_v4()),
            })
        }
    }

    #[derive(Default)]
    struct FakeMatchRepository {
        recorded: Mutex<Vec<(String, Uuid)>>,
    }

    #[async_trait]
    impl MatchRepository for FakeMatchRepository {
        async fn record_match(
            &self,
            flight: &FlightNumber,
            user_id: Uuid,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.recorded
                .lock()
                .unwrap()
                .push((flight.as_str().to_string(), user_id));
            Ok(())
        }
    }

    struct UnavailableSource;

    #[async_trait]
    impl FlightSource for UnavailableSource {
        async fn fetch(
            &self,
            _flight: &FlightNumber,
        ) -> Result<FlightAttributes, LookupError> {
            Err(LookupError::Unavailable("connection timed out".into()))
        }
    }

    struct Harness {
        trips: Arc<FakeTripRepository>,
        matches: Arc<FakeMatchRepository>,
        orchestrator: Orchestrator,
    }

    fn harness() -> Harness {
        harness_with(false, true, None)
    }

    fn harness_with(
        trips_fail: bool,
        with_persistence: bool,
        live_source: Option<Arc<dyn FlightSource>>,
    ) -> Harness {
        let trips = Arc::new(FakeTripRepository { fail: trips_fail, ..Default::default() });
        let matches = Arc::new(FakeMatchRepository::default());
        let persistence = with_persistence.then(|| Persistence {
            trips: trips.clone() as Arc<dyn TripRepository>,
            matches: matches.clone() as Arc<dyn MatchRepository>,
        });

        let use_mock = live_source.is_none();
        let orchestrator = Orchestrator::new(
            use_mock,
            live_source,
            Arc::new(MockFlightSource::new()),
            DelayPredictor::new(DelayModel::embedded_default().unwrap()),
            RideshareEstimator::new(None, Vec::new()),
            persistence,
        );

        Harness { trips, matches, orchestrator }
    }

    async fn run(harness: &Harness, script: &str) -> String {
        let mut output = Vec::new();
        {
            let mut console = Console::new(Cursor::new(script.to_string()), &mut output);
            harness.orchestrator.run(&mut console).await.unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_mock_run_without_consent() {
        let harness = harness();
        // name, email, no school year, consent default (no), flight, ride
        // yes, 10 direct miles, pickup now, save default (yes).
        let output = run(
            &harness,
            "Ishaan\nishaan@ucsd.edu\n\n\nWN1254\ny\n10\n\n\n",
        )
        .await;

        assert!(output.contains("Predicted delay for WN1254"), "output: {output}");
        assert!(output.contains("$24.50"), "output: {output}");
        assert!(output.contains("Saved to database."), "output: {output}");
        assert!(output.contains("Done."), "output: {output}");

        let saved = harness.trips.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        let (user, query, ride) = &saved[0];
        assert!(!user.consented);
        assert!(query.predicted_delay_minutes >= 0);
        assert_eq!(ride.unwrap().cost_cents, 2450);

        // consent=false must never touch the match table
        assert!(harness.matches.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_consented_save_records_a_match() {
        let harness = harness();
        let output = run(
            &harness,
            "Ishaan\nishaan@ucsd.edu\nsenior\ny\nWN1254\nn\n\n",
        )
        .await;

        assert!(output.contains("Saved to database."), "output: {output}");
        let recorded = harness.matches.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "WN1254");
    }

    #[tokio::test]
    async fn test_declining_save_reaches_done_without_writes() {
        let harness = harness();
        let output = run(&harness, "Ishaan\nishaan@ucsd.edu\n\n\nWN1254\nn\nn\n").await;

        assert!(output.contains("Done."));
        assert!(harness.trips.saved.lock().unwrap().is_empty());
        assert!(harness.matches.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_inputs_reprompt() {
        let harness = harness();
        let output = run(
            &harness,
            "Ishaan\nnot-an-email\nishaan@ucsd.edu\n\n\n12!!\nWN1254\nn\nn\n",
        )
        .await;

        assert!(output.contains("That doesn't look like a valid email."));
        assert!(output.contains("Invalid flight number format."));
        assert!(output.contains("Predicted delay for WN1254"));
        assert!(output.contains("Done."));
    }

    #[tokio::test]
    async fn test_save_failure_reports_not_saved_and_completes() {
        let harness = harness_with(true, true, None);
        let output = run(&harness, "Ishaan\nishaan@ucsd.edu\n\ny\nWN1254\nn\ny\n").await;

        assert!(output.contains("not saved"), "output: {output}");
        assert!(output.contains("Done."));
        // Even with consent, no match write happens when the save failed.
        assert!(harness.matches.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_database_reports_not_saved() {
        let harness = harness_with(false, false, None);
        let output = run(&harness, "Ishaan\nishaan@ucsd.edu\n\n\nWN1254\nn\ny\n").await;

        assert!(output.contains("not saved"), "output: {output}");
        assert!(output.contains("Done."));
    }

    #[tokio::test]
    async fn test_live_failure_degrades_to_mock() {
        let harness =
            harness_with(false, true, Some(Arc::new(UnavailableSource) as Arc<dyn FlightSource>));
        // Extra blank line accepts the "use local data" offer.
        let output = run(&harness, "Ishaan\nishaan@ucsd.edu\n\n\nWN1254\n\nn\nn\n").await;

        assert!(output.contains("unavailable"), "output: {output}");
        assert!(output.contains("Predicted delay for WN1254"), "output: {output}");
        assert!(output.contains("Done."));
    }

    #[tokio::test]
    async fn test_live_failure_with_declined_fallback_still_completes() {
        let harness =
            harness_with(false, true, Some(Arc::new(UnavailableSource) as Arc<dyn FlightSource>));
        let output = run(&harness, "Ishaan\nishaan@ucsd.edu\n\n\nWN1254\nn\n").await;

        assert!(output.contains("Could not fetch flight data."), "output: {output}");
        assert!(output.contains("Done."));
        assert!(harness.trips.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_address_trip_without_geocoder_reports_no_estimate() {
        let harness = harness();
        let output = run(
            &harness,
            "Ishaan\nishaan@ucsd.edu\n\n\nWN1254\ny\n\nUCSD\nSAN airport\n\nn\n",
        )
        .await;

        assert!(output.contains("Could not estimate a ride"), "output: {output}");
        assert!(output.contains("Done."));
    }
}
