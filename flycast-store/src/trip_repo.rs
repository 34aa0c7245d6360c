use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use flycast_core::flight::FlightQuery;
use flycast_core::repository::{SavedTrip, TripRepository};
use flycast_core::ride::RideEstimate;
use flycast_core::user::UserProfile;

pub struct PostgresTripRepository {
    pool: PgPool,
}

impl PostgresTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRepository for PostgresTripRepository {
    async fn save_trip(
        &self,
        user: &UserProfile,
        query: &FlightQuery,
        ride: Option<&RideEstimate>,
    ) -> Result<SavedTrip, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // 1. Insert-or-update the user by unique email inside the
        //    transaction, so two concurrent runs cannot duplicate a row.
        let user_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (id, name, email, school_year, consented)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
              SET name = EXCLUDED.name,
                  school_year = EXCLUDED.school_year,
                  consented = EXCLUDED.consented
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.school_year)
        .bind(user.consented)
        .fetch_one(&mut *tx)
        .await?;

        // 2. The flight query row. Every run that saves appends a new row.
        let attrs = &query.attributes;
        let flight_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO user_flights (
                id, user_id, flight_number, airline, departure_time, arrival_time,
                origin_airport, destination_airport, gate, terminal, predicted_delay_minutes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(flight_id)
        .bind(user_id)
        .bind(attrs.flight_number.as_str())
        .bind(&attrs.airline)
        .bind(attrs.scheduled_departure)
        .bind(attrs.scheduled_arrival)
        .bind(&attrs.origin)
        .bind(&attrs.destination)
        .bind(&attrs.gate)
        .bind(&attrs.terminal)
        .bind(query.predicted_delay_minutes)
        .execute(&mut *tx)
        .await?;

        // 3. The optional rideshare estimate, owned by this flight query.
        let ride_id = match ride {
            Some(estimate) => {
                let id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO rideshare_estimates (id, user_flight_id, cost_cents, duration_minutes)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(id)
                .bind(flight_id)
                .bind(estimate.cost_cents)
                .bind(estimate.duration_minutes)
                .execute(&mut *tx)
                .await?;
                Some(id)
            }
            None => None,
        };

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            flight = attrs.flight_number.as_str(),
            "trip saved"
        );

        Ok(SavedTrip { user_id, flight_id, ride_id })
    }
}
