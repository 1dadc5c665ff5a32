//! Application services shared by several handlers.

mod invitation;
mod meeting_lifecycle;
mod notifier;
pub mod templates;

pub use invitation::InvitationDispatcher;
pub use meeting_lifecycle::{MeetingLifecycle, SessionGuard};
pub use notifier::Notifier;
pub use templates::SessionNotice;
