//! PostgreSQL implementation of SessionRepository.
//!
//! Persists consultation sessions to `consulting_sessions`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, PaperId, ResearcherId, SessionId, Timestamp, UserId,
};
use crate::domain::session::{ConsultationSession, SessionStatus};
use crate::ports::SessionRepository;

use super::{corrupt_column, db_error};

const COLUMNS: &str = "id, user_id, researcher_id, paper_id, start_time, end_time, status, \
                       meeting_link, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(
        &self,
        column: &'static str,
        value: &Uuid,
    ) -> Result<Vec<ConsultationSession>, DomainError> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM consulting_sessions WHERE {} = $1 ORDER BY start_time",
            COLUMNS, column
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list sessions"))?;

        rows.into_iter().map(ConsultationSession::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    researcher_id: Uuid,
    paper_id: Option<Uuid>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    meeting_link: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for ConsultationSession {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let status = SessionStatus::parse(&row.status)
            .ok_or_else(|| corrupt_column("consulting_sessions.status", &row.status))?;
        Ok(ConsultationSession::reconstitute(
            SessionId::from_uuid(row.id),
            UserId::from_uuid(row.user_id),
            ResearcherId::from_uuid(row.researcher_id),
            row.paper_id.map(PaperId::from_uuid),
            Timestamp::from_datetime(row.start_time),
            Timestamp::from_datetime(row.end_time),
            status,
            row.meeting_link,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        ))
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &ConsultationSession) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO consulting_sessions ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            COLUMNS
        ))
        .bind(session.id().as_uuid())
        .bind(session.user_id().as_uuid())
        .bind(session.researcher_id().as_uuid())
        .bind(session.paper_id().map(|p| *p.as_uuid()))
        .bind(session.start_time().as_datetime())
        .bind(session.end_time().as_datetime())
        .bind(session.status().as_str())
        .bind(session.meeting_link())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert session"))?;
        Ok(())
    }

    async fn update_if_status(
        &self,
        session: &ConsultationSession,
        expected: SessionStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE consulting_sessions SET
                start_time = $2,
                end_time = $3,
                status = $4,
                meeting_link = $5,
                updated_at = $6
            WHERE id = $1 AND status = $7
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.start_time().as_datetime())
        .bind(session.end_time().as_datetime())
        .bind(session.status().as_str())
        .bind(session.meeting_link())
        .bind(session.updated_at().as_datetime())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update session"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<ConsultationSession>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM consulting_sessions WHERE id = $1",
            COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch session"))?;

        row.map(ConsultationSession::try_from).transpose()
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConsultationSession>, DomainError> {
        self.find_where("user_id", user_id.as_uuid()).await
    }

    async fn find_by_researcher_id(
        &self,
        researcher_id: &ResearcherId,
    ) -> Result<Vec<ConsultationSession>, DomainError> {
        self.find_where("researcher_id", researcher_id.as_uuid()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn row(status: &str) -> SessionRow {
        let now = Utc::now();
        SessionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            researcher_id: Uuid::new_v4(),
            paper_id: None,
            start_time: now,
            end_time: now + chrono::Duration::minutes(45),
            status: status.to_string(),
            meeting_link: Some("https://zoom.us/j/123".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_session() {
        let row = row("scheduled");
        let id = row.id;

        let session = ConsultationSession::try_from(row).unwrap();

        assert_eq!(*session.id().as_uuid(), id);
        assert_eq!(session.status(), SessionStatus::Scheduled);
        assert_eq!(session.duration_minutes(), 45);
        assert_eq!(session.meeting_link(), Some("https://zoom.us/j/123"));
    }

    #[test]
    fn unknown_status_is_reported_as_database_error() {
        let err = ConsultationSession::try_from(row("cancelled")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
