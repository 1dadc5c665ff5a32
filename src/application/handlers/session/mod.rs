//! Session command and query handlers.

mod accept_session;
mod access;
mod cancel_session;
mod complete_session;
mod confirm_session_payment;
mod create_session;
mod list_sessions;
mod reschedule_session;

pub use accept_session::{AcceptSessionCommand, AcceptSessionHandler};
pub use cancel_session::{
    CancelSessionCommand, CancelSessionHandler, DEFAULT_CANCELLATION_NOTICE_HOURS,
};
pub use complete_session::{CompleteSessionCommand, CompleteSessionHandler};
pub use confirm_session_payment::{ConfirmSessionPaymentCommand, ConfirmSessionPaymentHandler};
pub use create_session::{CreateSessionCommand, CreateSessionHandler};
pub use list_sessions::{ListSessionsHandler, ListSessionsQuery, SessionOwner};
pub use reschedule_session::{RescheduleSessionCommand, RescheduleSessionHandler};
