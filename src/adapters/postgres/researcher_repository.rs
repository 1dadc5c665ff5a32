//! PostgreSQL implementation of ResearcherRepository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ResearcherId, Timestamp, UserId};
use crate::domain::researcher::{normalize_email, Researcher, ResearcherProfile};
use crate::ports::ResearcherRepository;

use super::db_error;

const COLUMNS: &str = "id, email, name, affiliation, bio, hourly_rate_cents, availability, \
                       user_id, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresResearcherRepository {
    pool: PgPool,
}

impl PostgresResearcherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResearcherRow {
    id: Uuid,
    email: String,
    name: String,
    affiliation: Option<String>,
    bio: Option<String>,
    hourly_rate_cents: Option<i64>,
    availability: Json<BTreeMap<String, Vec<String>>>,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResearcherRow> for Researcher {
    fn from(row: ResearcherRow) -> Self {
        Researcher {
            id: ResearcherId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            affiliation: row.affiliation,
            bio: row.bio,
            hourly_rate_cents: row.hourly_rate_cents,
            availability: row.availability.0,
            user_id: row.user_id.map(UserId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

#[async_trait]
impl ResearcherRepository for PostgresResearcherRepository {
    async fn find_by_id(&self, id: &ResearcherId) -> Result<Option<Researcher>, DomainError> {
        let row: Option<ResearcherRow> =
            sqlx::query_as(&format!("SELECT {} FROM researchers WHERE id = $1", COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch researcher"))?;
        Ok(row.map(Researcher::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Researcher>, DomainError> {
        let row: Option<ResearcherRow> =
            sqlx::query_as(&format!("SELECT {} FROM researchers WHERE email = $1", COLUMNS))
                .bind(normalize_email(email))
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch researcher by email"))?;
        Ok(row.map(Researcher::from))
    }

    async fn upsert_by_email(
        &self,
        profile: ResearcherProfile,
        user_id: Option<UserId>,
    ) -> Result<Researcher, DomainError> {
        let candidate = Researcher::from_profile(profile, user_id);

        // A concurrent registration for the same email lands on the same row.
        let row: ResearcherRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO researchers ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                affiliation = EXCLUDED.affiliation,
                bio = EXCLUDED.bio,
                hourly_rate_cents = EXCLUDED.hourly_rate_cents,
                availability = EXCLUDED.availability,
                user_id = COALESCE(EXCLUDED.user_id, researchers.user_id),
                updated_at = EXCLUDED.updated_at
            RETURNING {cols}
            "#,
            cols = COLUMNS
        ))
        .bind(candidate.id.as_uuid())
        .bind(&candidate.email)
        .bind(&candidate.name)
        .bind(&candidate.affiliation)
        .bind(&candidate.bio)
        .bind(candidate.hourly_rate_cents)
        .bind(Json(&candidate.availability))
        .bind(candidate.user_id.map(|u| *u.as_uuid()))
        .bind(candidate.created_at.as_datetime())
        .bind(candidate.updated_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to upsert researcher"))?;

        Ok(row.into())
    }
}
