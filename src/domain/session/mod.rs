//! Session domain module.
//!
//! Consultation sessions move `scheduled → completed | canceled`. Payment
//! confirmation and researcher acknowledgement leave a session `scheduled`.

mod aggregate;
mod errors;
mod status;

pub use aggregate::{validate_window, ConsultationSession};
pub use errors::SessionError;
pub use status::SessionStatus;
