use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use flycast_core::flight::FlightNumber;
use flycast_core::repository::MatchRepository;

pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    /// Single upsert statement: the append happens inside the conflict
    /// branch, so concurrent runs for the same flight cannot double-add an
    /// id. Existing ids are retained even if the user later revokes
    /// consent; the caller gates on consent at write time.
    async fn record_match(
        &self,
        flight: &FlightNumber,
        user_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO flight_matches (flight_number, user_ids, matched_at)
            VALUES ($1, ARRAY[$2]::uuid[], NOW())
            ON CONFLICT (flight_number) DO UPDATE
              SET user_ids = CASE
                    WHEN flight_matches.user_ids @> ARRAY[$2]::uuid[]
                      THEN flight_matches.user_ids
                    ELSE array_append(flight_matches.user_ids, $2)
                  END,
                  matched_at = NOW()
            "#,
        )
        .bind(flight.as_str())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(flight = flight.as_str(), user_id = %user_id, "match record updated");
        Ok(())
    }
}
