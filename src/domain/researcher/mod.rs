//! Researcher domain module.
//!
//! A researcher is identified by email. Profiles are created either by
//! self-registration through an outreach invitation or by the data
//! collection pipeline, updated in place, and never hard-deleted.

mod profile;

pub use profile::{normalize_email, Researcher, ResearcherProfile};
