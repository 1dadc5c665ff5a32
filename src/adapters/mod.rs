//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST surface
//! - `memory` - In-memory repositories and providers
//! - `postgres` - PostgreSQL repositories (sqlx)
//! - `resend` - Transactional email
//! - `stripe` - Payment webhook verification
//! - `tasks` - Background task runner (tokio)
//! - `zoom` - Video meetings

pub mod http;
pub mod memory;
pub mod postgres;
pub mod resend;
pub mod stripe;
pub mod tasks;
pub mod zoom;
