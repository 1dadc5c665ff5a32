//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and the state machine trait
//! that form the vocabulary of the consulting domain.

mod actor;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use actor::{Actor, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    OutreachRequestId, PaperId, PaymentId, ResearcherId, SessionId, SubscriptionId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
