//! CreateOrRenewSubscriptionHandler - Grants a consulting subscription.
//!
//! Every purchase inserts a fresh 30-day row; an existing active
//! subscription is not extended. When the purchase came from a payment,
//! the payment's subscription reference makes the grant happen once even
//! if the task runs again.

use std::sync::Arc;

use crate::application::services::Notifier;
use crate::domain::foundation::UserId;
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{PaymentRepository, SubscriptionRepository, TaskError};

/// Price and length of a subscription period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPlan {
    pub price_cents: i64,
    pub validity_days: i64,
}

impl Default for SubscriptionPlan {
    fn default() -> Self {
        Self {
            price_cents: 4_900,
            validity_days: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateOrRenewSubscriptionCommand {
    pub user_id: UserId,
    /// Gateway transaction that paid for this period, if any.
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOrRenewSubscriptionResult {
    Created(Subscription),
    /// The payment already bought a subscription.
    AlreadyFulfilled,
}

pub struct CreateOrRenewSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentRepository>,
    notifier: Notifier,
    plan: SubscriptionPlan,
}

impl CreateOrRenewSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
        notifier: Notifier,
        plan: SubscriptionPlan,
    ) -> Self {
        Self {
            subscriptions,
            payments,
            notifier,
            plan,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateOrRenewSubscriptionCommand,
    ) -> Result<CreateOrRenewSubscriptionResult, SubscriptionError> {
        let payment = match &cmd.transaction_id {
            Some(transaction_id) => self.payments.find_by_transaction_id(transaction_id).await?,
            None => None,
        };
        if payment.as_ref().is_some_and(|p| p.subscription_id.is_some()) {
            return Ok(CreateOrRenewSubscriptionResult::AlreadyFulfilled);
        }

        let subscription =
            Subscription::activate(cmd.user_id, self.plan.price_cents, self.plan.validity_days);
        self.subscriptions.save(&subscription).await?;

        if let Some(payment) = payment {
            self.payments
                .link_subscription(&payment.id, &subscription.id)
                .await?;
        }

        tracing::info!(
            subscription_id = %subscription.id,
            user_id = %subscription.user_id,
            end_date = %subscription.end_date,
            "Subscription activated"
        );
        self.notifier.subscription_confirmed(&subscription);

        Ok(CreateOrRenewSubscriptionResult::Created(subscription))
    }

    /// Same as `handle`, with errors classified for the task runner.
    pub async fn run_task(&self, cmd: CreateOrRenewSubscriptionCommand) -> Result<(), TaskError> {
        match self.handle(cmd).await {
            Ok(_) => Ok(()),
            Err(SubscriptionError::Infrastructure(msg)) => Err(TaskError::retryable(msg)),
            Err(e) => Err(TaskError::permanent(e.to_string())),
        }
    }
}
