//! Resend adapter - implements `EmailSender` against the Resend HTTP API.

mod sender;

pub use sender::{ResendConfig, ResendEmailSender};
