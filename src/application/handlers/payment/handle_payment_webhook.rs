//! HandlePaymentWebhookHandler - Reconciles gateway webhook deliveries.
//!
//! Deliveries are at-least-once and unordered, so every path is
//! idempotent on the gateway transaction id:
//!
//! | Stored row | `payment_succeeded` | `payment_failed` |
//! |------------|---------------------|------------------|
//! | none | insert `completed`, side effect | insert `failed` |
//! | `failed` | upgrade to `completed`, side effect | duplicate |
//! | `completed` | duplicate | ignored, never downgraded |
//!
//! Only an unverifiable delivery is an error. Everything after
//! verification is acknowledged, because a gateway retry cannot fix a bad
//! payload or a business rule.

use std::sync::Arc;

use crate::application::handlers::session::{
    ConfirmSessionPaymentCommand, ConfirmSessionPaymentHandler,
};
use crate::application::handlers::subscription::{
    CreateOrRenewSubscriptionCommand, CreateOrRenewSubscriptionHandler,
};
use crate::domain::foundation::DomainError;
use crate::domain::payment::{
    GatewayEvent, GatewayEventKind, Payment, PaymentIntentObject, PaymentMetadata,
    PaymentPurpose, PaymentStatus, WebhookError,
};
use crate::ports::{BackgroundTask, PaymentGateway, PaymentRepository, SaveResult, TaskRunner};

/// Command carrying a raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as signed.
    pub payload: Vec<u8>,
    /// Signature header, if present.
    pub signature: Option<String>,
}

/// What the reconciler did with a verified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// First sighting of this transaction.
    PaymentRecorded {
        transaction_id: String,
        status: PaymentStatus,
    },
    /// A failed payment was retried successfully.
    StatusUpgraded { transaction_id: String },
    /// Already applied.
    Duplicate { transaction_id: String },
    /// Subscription lifecycle event, accepted without action.
    Acknowledged,
    /// Event could not be applied and never will be.
    Ignored { reason: String },
    /// Storage failed while applying the event.
    Failed(String),
}

pub struct HandlePaymentWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
    confirm_session: Arc<ConfirmSessionPaymentHandler>,
    subscriptions: Arc<CreateOrRenewSubscriptionHandler>,
    tasks: Arc<dyn TaskRunner>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentRepository>,
        confirm_session: Arc<ConfirmSessionPaymentHandler>,
        subscriptions: Arc<CreateOrRenewSubscriptionHandler>,
        tasks: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            gateway,
            payments,
            confirm_session,
            subscriptions,
            tasks,
        }
    }

    pub async fn handle(&self, cmd: HandlePaymentWebhookCommand) -> Result<WebhookOutcome, WebhookError> {
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, cmd.signature.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected webhook delivery");
                e
            })?;

        Ok(self.process(&event).await)
    }

    /// Applies a verified event.
    pub async fn process(&self, event: &GatewayEvent) -> WebhookOutcome {
        let kind = event.kind();
        let outcome = match kind {
            GatewayEventKind::PaymentSucceeded | GatewayEventKind::PaymentFailed => {
                self.process_payment(event, kind).await
            }
            GatewayEventKind::SubscriptionCreated
            | GatewayEventKind::SubscriptionUpdated
            | GatewayEventKind::SubscriptionDeleted => WebhookOutcome::Acknowledged,
            GatewayEventKind::Unknown => WebhookOutcome::Ignored {
                reason: format!("unhandled event type {}", event.event_type),
            },
        };

        match &outcome {
            WebhookOutcome::Ignored { reason } => {
                tracing::warn!(event_type = %event.event_type, event_id = ?event.id, %reason, "Webhook ignored");
            }
            WebhookOutcome::Failed(error) => {
                tracing::error!(event_type = %event.event_type, event_id = ?event.id, %error, "Webhook processing failed");
            }
            other => {
                tracing::info!(event_type = %event.event_type, event_id = ?event.id, outcome = ?other, "Webhook processed");
            }
        }
        outcome
    }

    async fn process_payment(&self, event: &GatewayEvent, kind: GatewayEventKind) -> WebhookOutcome {
        let parsed = event
            .payment_intent()
            .and_then(|intent| PaymentMetadata::from_map(&intent.metadata).map(|m| (intent, m)));
        let (intent, metadata) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                return WebhookOutcome::Ignored {
                    reason: e.to_string(),
                }
            }
        };

        let result = if kind == GatewayEventKind::PaymentSucceeded {
            self.record_success(&intent, &metadata).await
        } else {
            self.record_failure(&intent, &metadata).await
        };
        result.unwrap_or_else(|e| WebhookOutcome::Failed(e.to_string()))
    }

    async fn record_success(
        &self,
        intent: &PaymentIntentObject,
        metadata: &PaymentMetadata,
    ) -> Result<WebhookOutcome, DomainError> {
        if self.payments.find_by_transaction_id(&intent.id).await?.is_none() {
            let payment = Payment::new(
                metadata.user_id,
                metadata.session_id,
                intent.amount,
                PaymentStatus::Completed,
                intent.id.clone(),
            );
            if self.payments.insert(&payment).await? == SaveResult::Inserted {
                self.schedule_side_effect(&intent.id, metadata);
                return Ok(WebhookOutcome::PaymentRecorded {
                    transaction_id: intent.id.clone(),
                    status: PaymentStatus::Completed,
                });
            }
            // Lost the insert race; fall through to the upgrade path.
        }

        let upgraded = self
            .payments
            .transition_status(&intent.id, PaymentStatus::Failed, PaymentStatus::Completed)
            .await?;
        if upgraded {
            self.schedule_side_effect(&intent.id, metadata);
            Ok(WebhookOutcome::StatusUpgraded {
                transaction_id: intent.id.clone(),
            })
        } else {
            Ok(WebhookOutcome::Duplicate {
                transaction_id: intent.id.clone(),
            })
        }
    }

    async fn record_failure(
        &self,
        intent: &PaymentIntentObject,
        metadata: &PaymentMetadata,
    ) -> Result<WebhookOutcome, DomainError> {
        let existing = match self.payments.find_by_transaction_id(&intent.id).await? {
            Some(existing) => existing,
            None => {
                let payment = Payment::new(
                    metadata.user_id,
                    metadata.session_id,
                    intent.amount,
                    PaymentStatus::Failed,
                    intent.id.clone(),
                );
                return Ok(match self.payments.insert(&payment).await? {
                    SaveResult::Inserted => WebhookOutcome::PaymentRecorded {
                        transaction_id: intent.id.clone(),
                        status: PaymentStatus::Failed,
                    },
                    SaveResult::AlreadyExists => WebhookOutcome::Duplicate {
                        transaction_id: intent.id.clone(),
                    },
                });
            }
        };

        Ok(match existing.status {
            PaymentStatus::Failed => WebhookOutcome::Duplicate {
                transaction_id: intent.id.clone(),
            },
            PaymentStatus::Completed => WebhookOutcome::Ignored {
                reason: format!("payment {} already completed", intent.id),
            },
        })
    }

    fn schedule_side_effect(&self, transaction_id: &str, metadata: &PaymentMetadata) {
        match &metadata.purpose {
            PaymentPurpose::Session => {
                let Some(session_id) = metadata.session_id else {
                    tracing::warn!(transaction_id, "Session payment without session_id");
                    return;
                };
                let handler = self.confirm_session.clone();
                let cmd = ConfirmSessionPaymentCommand { session_id };
                self.tasks.submit(BackgroundTask::new(
                    format!("confirm_session_payment:{}", session_id),
                    move || {
                        let handler = handler.clone();
                        async move { handler.run_task(cmd).await }
                    },
                ));
            }
            PaymentPurpose::Subscription => {
                let handler = self.subscriptions.clone();
                let cmd = CreateOrRenewSubscriptionCommand {
                    user_id: metadata.user_id,
                    transaction_id: Some(transaction_id.to_string()),
                };
                self.tasks.submit(BackgroundTask::new(
                    format!("create_subscription:{}", transaction_id),
                    move || {
                        let (handler, cmd) = (handler.clone(), cmd.clone());
                        async move { handler.run_task(cmd).await }
                    },
                ));
            }
            PaymentPurpose::Other(purpose) => {
                tracing::debug!(transaction_id, purpose = %purpose, "Payment has no side effect");
            }
        }
    }
}
