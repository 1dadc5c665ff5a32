//! Outreach domain module.
//!
//! An outreach request invites a researcher, by email, to consult for a
//! platform user. The researcher answers directly or by registering through
//! the signed link carried in the invitation.

mod errors;
mod registration_token;
mod request;
mod status;

pub use errors::OutreachError;
pub use registration_token::{
    RegistrationClaims, RegistrationTokenCodec, TokenError, DEFAULT_TOKEN_TTL_DAYS,
};
pub use request::{OutreachRequest, OutreachResponse};
pub use status::OutreachStatus;
