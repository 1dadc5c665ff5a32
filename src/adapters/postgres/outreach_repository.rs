//! PostgreSQL implementation of OutreachRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, OutreachRequestId, PaperId, Timestamp, UserId};
use crate::domain::outreach::{OutreachRequest, OutreachStatus};
use crate::ports::OutreachRepository;

use super::{corrupt_column, db_error};

const COLUMNS: &str = "id, user_id, researcher_email, paper_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresOutreachRepository {
    pool: PgPool,
}

impl PostgresOutreachRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OutreachRow {
    id: Uuid,
    user_id: Uuid,
    researcher_email: String,
    paper_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OutreachRow> for OutreachRequest {
    type Error = DomainError;

    fn try_from(row: OutreachRow) -> Result<Self, Self::Error> {
        let status = OutreachStatus::parse(&row.status)
            .ok_or_else(|| corrupt_column("outreach_requests.status", &row.status))?;
        Ok(OutreachRequest::reconstitute(
            OutreachRequestId::from_uuid(row.id),
            UserId::from_uuid(row.user_id),
            row.researcher_email,
            row.paper_id.map(PaperId::from_uuid),
            status,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        ))
    }
}

#[async_trait]
impl OutreachRepository for PostgresOutreachRepository {
    async fn save(&self, request: &OutreachRequest) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO outreach_requests ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            COLUMNS
        ))
        .bind(request.id().as_uuid())
        .bind(request.user_id().as_uuid())
        .bind(request.researcher_email())
        .bind(request.paper_id().map(|p| *p.as_uuid()))
        .bind(request.status().as_str())
        .bind(request.created_at().as_datetime())
        .bind(request.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert outreach request"))?;
        Ok(())
    }

    async fn update_if_status(
        &self,
        request: &OutreachRequest,
        expected: OutreachStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE outreach_requests SET status = $2, updated_at = $3 \
             WHERE id = $1 AND status = $4",
        )
        .bind(request.id().as_uuid())
        .bind(request.status().as_str())
        .bind(request.updated_at().as_datetime())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update outreach request"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(
        &self,
        id: &OutreachRequestId,
    ) -> Result<Option<OutreachRequest>, DomainError> {
        let row: Option<OutreachRow> = sqlx::query_as(&format!(
            "SELECT {} FROM outreach_requests WHERE id = $1",
            COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch outreach request"))?;

        row.map(OutreachRequest::try_from).transpose()
    }

    async fn find_by_status_created_before(
        &self,
        status: OutreachStatus,
        created_before: Timestamp,
    ) -> Result<Vec<OutreachRequest>, DomainError> {
        let rows: Vec<OutreachRow> = sqlx::query_as(&format!(
            "SELECT {} FROM outreach_requests \
             WHERE status = $1 AND created_at < $2 ORDER BY created_at",
            COLUMNS
        ))
        .bind(status.as_str())
        .bind(created_before.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list outreach requests"))?;

        rows.into_iter().map(OutreachRequest::try_from).collect()
    }
}
