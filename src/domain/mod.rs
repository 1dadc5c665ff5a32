//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, actor)
//! - `researcher` - Researcher profiles
//! - `outreach` - Invitation requests and registration tokens
//! - `session` - Consultation session lifecycle
//! - `meeting` - Video meeting value types
//! - `payment` - Payment records and gateway events
//! - `subscription` - Consulting subscriptions

pub mod foundation;
pub mod meeting;
pub mod outreach;
pub mod payment;
pub mod researcher;
pub mod session;
pub mod subscription;
