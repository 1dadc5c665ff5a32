//! Strongly-typed identifier value objects.
//!
//! Every persisted entity is keyed by a UUID. The newtypes keep a
//! `SessionId` from being passed where a `ResearcherId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Platform user (the person requesting and paying for consultations).
    UserId
);
uuid_id!(
    /// Researcher profile.
    ResearcherId
);
uuid_id!(
    /// Paper known to the platform.
    PaperId
);
uuid_id!(
    /// Outreach request sent to a researcher on behalf of a user.
    OutreachRequestId
);
uuid_id!(
    /// Consultation session between a user and a researcher.
    SessionId
);
uuid_id!(
    /// Payment row reconciled from gateway events.
    PaymentId
);
uuid_id!(
    /// Consulting subscription.
    SubscriptionId
);
