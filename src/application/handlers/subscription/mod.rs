//! Subscription handlers.

mod check_subscription;
mod create_or_renew;

pub use check_subscription::{CheckSubscriptionHandler, CheckSubscriptionQuery, SubscriptionAccess};
pub use create_or_renew::{
    CreateOrRenewSubscriptionCommand, CreateOrRenewSubscriptionHandler,
    CreateOrRenewSubscriptionResult, SubscriptionPlan,
};
