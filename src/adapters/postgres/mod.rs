//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! Queries are built at runtime with `sqlx::query`/`query_as`; every table
//! has a `FromRow` record that converts into its domain type.
//!
//! - `PostgresResearcherRepository` - upsert keyed on `researchers.email`
//! - `PostgresOutreachRepository` - invitation requests
//! - `PostgresSessionRepository` - consultation sessions
//! - `PostgresPaymentRepository` - unique on `payments.transaction_id`
//! - `PostgresSubscriptionRepository` - append-only subscription rows
//! - `PostgresUserDirectory` / `PostgresPaperCatalog` - read-only lookups
//!   into tables owned by other services

mod directory;
mod outreach_repository;
mod payment_repository;
mod researcher_repository;
mod session_repository;
mod subscription_repository;

pub use directory::{PostgresPaperCatalog, PostgresUserDirectory};
pub use outreach_repository::PostgresOutreachRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use researcher_repository::PostgresResearcherRepository;
pub use session_repository::PostgresSessionRepository;
pub use subscription_repository::PostgresSubscriptionRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Opens a connection pool sized from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
}

/// Applies the bundled `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn corrupt_column(column: &'static str, value: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Unexpected value in {}: {}", column, value),
    )
}
