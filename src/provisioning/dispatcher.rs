//! # Request Dispatcher
//!
//! Level-triggered consumer of the work queue. Each call to
//! [`RequestDispatcher::dispatch_one`] handles at most one work item; backpressure comes
//! from the external scheduler's cadence plus the [`ConcurrencyGate`].
//!
//! ## Message lifecycle
//!
//! | Situation | Provider write | Message |
//! |---|---|---|
//! | gate closed | none | not received |
//! | queue empty | none | n/a |
//! | malformed body | none | deleted |
//! | validation rejected | none | deleted |
//! | provider accepted | one | deleted |
//! | provider failed | attempted | left for redelivery |

use super::gate::ConcurrencyGate;
use super::provisioner::ProductProvisioner;
use super::validator::{RejectionReason, RequestValidator, ValidationOutcome};
use crate::error::Result;
use crate::messaging::{QueuedMessage, WorkQueue};
use crate::models::{WorkItem, WorkOperation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Result of one dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// In-flight operations at or above the threshold; nothing was received
    GateClosed { in_flight: usize, threshold: u32 },
    QueueEmpty,
    Provisioned {
        message_id: String,
        operation: WorkOperation,
        account_email: String,
        record_id: String,
        provisioned_product_id: String,
        dispatched_at: DateTime<Utc>,
    },
    /// The request was discarded; not a system fault
    Rejected {
        message_id: String,
        reason: RejectionReason,
    },
}

impl DispatchOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    queue: Arc<dyn WorkQueue>,
    queue_name: String,
    gate: ConcurrencyGate,
    validator: RequestValidator,
    provisioner: ProductProvisioner,
    threshold: u32,
}

impl RequestDispatcher {
    pub fn new(
        queue: Arc<dyn WorkQueue>,
        queue_name: impl Into<String>,
        gate: ConcurrencyGate,
        validator: RequestValidator,
        provisioner: ProductProvisioner,
        threshold: u32,
    ) -> Self {
        Self {
            queue,
            queue_name: queue_name.into(),
            gate,
            validator,
            provisioner,
            threshold,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Process at most one queued work item
    #[instrument(skip(self), fields(queue = %self.queue_name, threshold = self.threshold))]
    pub async fn dispatch_one(&self) -> Result<DispatchOutcome> {
        let gate = self.gate.check(self.threshold).await?;
        if gate.is_closed() {
            return Ok(DispatchOutcome::GateClosed {
                in_flight: gate.in_flight,
                threshold: gate.threshold,
            });
        }

        let Some(message) = self.queue.receive_one(&self.queue_name).await? else {
            info!("Work queue is empty");
            return Ok(DispatchOutcome::QueueEmpty);
        };

        let item = match WorkItem::from_json(&message.body) {
            Ok(item) => item,
            Err(parse_error) => {
                error!(
                    message_id = %message.message_id,
                    error = %parse_error,
                    "Discarding unparseable work item"
                );
                return self
                    .reject(
                        &message,
                        RejectionReason::MalformedMessage {
                            message: parse_error.to_string(),
                        },
                    )
                    .await;
            }
        };

        if let ValidationOutcome::Rejected(reason) = self.validate(&item).await? {
            return self.reject(&message, reason).await;
        }

        let parameters = &item.control_tower_parameters;
        let record = match item.operation {
            WorkOperation::Add => self.provisioner.create(parameters).await,
            WorkOperation::Update => self.provisioner.update(parameters).await,
        }?;

        self.queue
            .delete(&self.queue_name, &message.receipt_handle)
            .await?;

        info!(
            message_id = %message.message_id,
            operation = %item.operation,
            account_email = %parameters.account_email,
            record_id = %record.record_id,
            "✅ Work item dispatched"
        );

        Ok(DispatchOutcome::Provisioned {
            message_id: message.message_id,
            operation: item.operation,
            account_email: parameters.account_email.clone(),
            record_id: record.record_id,
            provisioned_product_id: record.provisioned_product_id,
            dispatched_at: Utc::now(),
        })
    }

    async fn validate(&self, item: &WorkItem) -> Result<ValidationOutcome> {
        match item.operation {
            WorkOperation::Add => Ok(self
                .validator
                .validate_new_request(&item.control_tower_parameters)
                .await?),
            WorkOperation::Update => match &item.old_control_tower_parameters {
                Some(old) => Ok(RequestValidator::validate_modify_request(
                    old,
                    &item.control_tower_parameters,
                )),
                None => Ok(ValidationOutcome::Rejected(RejectionReason::MalformedMessage {
                    message: "update work item carries no old_control_tower_parameters".to_string(),
                })),
            },
        }
    }

    async fn reject(&self, message: &QueuedMessage, reason: RejectionReason) -> Result<DispatchOutcome> {
        self.queue
            .delete(&self.queue_name, &message.receipt_handle)
            .await?;

        warn!(
            message_id = %message.message_id,
            reason = %reason,
            "🚫 Work item rejected and removed from queue"
        );

        Ok(DispatchOutcome::Rejected {
            message_id: message.message_id.clone(),
            reason,
        })
    }
}
