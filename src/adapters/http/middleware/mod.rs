//! HTTP middleware for axum.
//!
//! - `actor` - Caller identity extractors

pub mod actor;

pub use actor::{
    actor_from_headers, ActorRejection, OptionalActor, RequireActor, USER_ID_HEADER,
    USER_ROLE_HEADER,
};
