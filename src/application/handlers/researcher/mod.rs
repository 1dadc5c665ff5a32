//! Researcher queries.

mod get_researcher;

pub use get_researcher::{GetResearcherHandler, GetResearcherQuery};
