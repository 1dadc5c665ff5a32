//! Read-only lookups into the platform's `users` and `papers` tables.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, PaperId, UserId};
use crate::ports::{PaperCatalog, PaperSummary, UserContact, UserDirectory};

use super::db_error;

#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_contact(&self, user_id: &UserId) -> Result<Option<UserContact>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, full_name FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch user"))?;

        Ok(row.map(|r| UserContact {
            id: UserId::from_uuid(r.id),
            email: r.email,
            full_name: r.full_name,
        }))
    }
}

#[derive(Clone)]
pub struct PostgresPaperCatalog {
    pool: PgPool,
}

impl PostgresPaperCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaperCatalog for PostgresPaperCatalog {
    async fn find_summary(&self, paper_id: &PaperId) -> Result<Option<PaperSummary>, DomainError> {
        let row: Option<(Uuid, String)> = sqlx::query_as("SELECT id, title FROM papers WHERE id = $1")
            .bind(paper_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch paper"))?;

        Ok(row.map(|(id, title)| PaperSummary {
            id: PaperId::from_uuid(id),
            title,
        }))
    }
}
