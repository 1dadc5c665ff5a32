//! In-memory adapters.
//!
//! Used by tests and by the binary when no database is configured. Every
//! repository honours the same uniqueness rules as its Postgres counterpart.

mod directory;
mod email;
mod meeting;
mod outreach_repository;
mod payment_repository;
mod researcher_repository;
mod session_repository;
mod subscription_repository;

pub use directory::{InMemoryPaperCatalog, InMemoryUserDirectory};
pub use email::RecordingEmailSender;
pub use meeting::{InMemoryMeetingProvider, MeetingCall};
pub use outreach_repository::InMemoryOutreachRepository;
pub use payment_repository::InMemoryPaymentRepository;
pub use researcher_repository::InMemoryResearcherRepository;
pub use session_repository::InMemorySessionRepository;
pub use subscription_repository::InMemorySubscriptionRepository;
