//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Repository Ports
//!
//! - `ResearcherRepository` - Researcher profiles, upserted by email
//! - `OutreachRepository` - Invitation requests
//! - `SessionRepository` - Consultation sessions
//! - `PaymentRepository` - Payments, unique on gateway transaction id
//! - `SubscriptionRepository` - Consulting subscriptions
//!
//! ## Read-only Collaborators
//!
//! - `UserDirectory` - Platform user contact data
//! - `PaperCatalog` - Paper titles for invitation copy
//!
//! ## Provider Ports
//!
//! - `EmailSender` - Transactional email
//! - `MeetingProvider` - Video conferencing
//! - `PaymentGateway` - Webhook verification
//! - `TaskRunner` - Detached background work with retries

mod email_sender;
mod meeting_provider;
mod outreach_repository;
mod paper_catalog;
mod payment_gateway;
mod payment_repository;
mod researcher_repository;
mod session_repository;
mod subscription_repository;
mod task_runner;
mod user_directory;

pub use email_sender::{EmailError, EmailMessage, EmailSender};
pub use meeting_provider::{MeetingProvider, MeetingProviderError};
pub use outreach_repository::OutreachRepository;
pub use paper_catalog::{PaperCatalog, PaperSummary};
pub use payment_gateway::PaymentGateway;
pub use payment_repository::{PaymentRepository, SaveResult};
pub use researcher_repository::ResearcherRepository;
pub use session_repository::SessionRepository;
pub use subscription_repository::SubscriptionRepository;
pub use task_runner::{BackgroundTask, TaskError, TaskFuture, TaskOutcome, TaskRunner};
pub use user_directory::{UserContact, UserDirectory};
