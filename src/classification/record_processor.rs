//! # Record Processor
//!
//! Entry point for change-log notifications: decode the first record, classify it,
//! then carry out the action.
//!
//! | Action | Effect |
//! |---|---|
//! | `Remove` | cleanup function invoked with `{account_request}` (old image) |
//! | `EnqueueCreate` | `ADD` work item sent |
//! | `EnqueueUpdate` | `UPDATE` work item sent, carrying the old parameters |
//! | `InvokeCustomizationOnly` | provisioning framework invoked with `{account_request, control_tower_event}` |

use super::action::LifecycleAction;
use super::classifier::EventClassifier;
use crate::error::{ClassificationError, Result};
use crate::messaging::{enqueue_work_item, WorkQueue};
use crate::models::{AccountRequestImage, AccountRequestRecord, WorkItem};
use crate::providers::DownstreamInvoker;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Downstream targets of the record processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorTargets {
    pub request_queue_name: String,
    pub cleanup_function_name: String,
    pub provisioning_framework_function_name: String,
}

/// What processing a record did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub action: LifecycleAction,
    pub account_email: Option<String>,
    /// Queue message id when a work item was sent
    pub message_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordProcessor {
    classifier: EventClassifier,
    queue: Arc<dyn WorkQueue>,
    invoker: Arc<dyn DownstreamInvoker>,
    targets: ProcessorTargets,
}

impl RecordProcessor {
    pub fn new(
        classifier: EventClassifier,
        queue: Arc<dyn WorkQueue>,
        invoker: Arc<dyn DownstreamInvoker>,
        targets: ProcessorTargets,
    ) -> Self {
        Self {
            classifier,
            queue,
            invoker,
            targets,
        }
    }

    /// Decode and process a raw change-log notification
    pub async fn process_event(&self, event: &Value) -> Result<ProcessedRecord> {
        let record = AccountRequestRecord::from_event(event).map_err(ClassificationError::from)?;
        self.process(&record).await
    }

    #[instrument(skip_all, fields(event_kind = %record.event_kind))]
    pub async fn process(&self, record: &AccountRequestRecord) -> Result<ProcessedRecord> {
        let action = self.classifier.classify(record).await?;
        let account_email = record.account_email().map(str::to_string);

        let message_id = match action {
            LifecycleAction::Remove => {
                let old_image = required_image(record, record.old_image.as_ref(), "old")?;
                self.invoke(
                    &self.targets.cleanup_function_name,
                    json!({ "account_request": old_image.to_json() }),
                )
                .await?;
                None
            }
            LifecycleAction::EnqueueCreate => {
                let new_image = required_image(record, record.new_image.as_ref(), "new")?;
                let item = WorkItem::create(new_image.control_tower_parameters.clone());
                Some(self.enqueue(&item).await?)
            }
            LifecycleAction::EnqueueUpdate => {
                let old_image = required_image(record, record.old_image.as_ref(), "old")?;
                let new_image = required_image(record, record.new_image.as_ref(), "new")?;
                let item = WorkItem::update(
                    old_image.control_tower_parameters.clone(),
                    new_image.control_tower_parameters.clone(),
                );
                Some(self.enqueue(&item).await?)
            }
            LifecycleAction::InvokeCustomizationOnly => {
                let new_image = required_image(record, record.new_image.as_ref(), "new")?;
                self.invoke(
                    &self.targets.provisioning_framework_function_name,
                    json!({
                        "account_request": new_image.to_json(),
                        "control_tower_event": {},
                    }),
                )
                .await?;
                None
            }
            LifecycleAction::Unsupported => {
                return Err(ClassificationError::unsupported(
                    record.event_kind,
                    "no effect defined for unsupported action",
                )
                .into())
            }
        };

        Ok(ProcessedRecord {
            action,
            account_email,
            message_id,
        })
    }

    async fn enqueue(&self, item: &WorkItem) -> Result<String> {
        Ok(enqueue_work_item(self.queue.as_ref(), &self.targets.request_queue_name, item).await?)
    }

    async fn invoke(&self, function_name: &str, payload: Value) -> Result<()> {
        self.invoker.invoke(function_name, payload).await?;
        info!(function = %function_name, "📨 Downstream function invoked");
        Ok(())
    }
}

fn required_image<'a>(
    record: &AccountRequestRecord,
    image: Option<&'a AccountRequestImage>,
    which: &str,
) -> std::result::Result<&'a AccountRequestImage, ClassificationError> {
    image.ok_or_else(|| {
        ClassificationError::unsupported(record.event_kind, format!("record carries no {which} image"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{AccountExistence, ProtectedAccounts};
    use crate::messaging::InMemoryWorkQueue;
    use crate::models::{ControlTowerParameters, WorkOperation};
    use crate::providers::{ProviderResult, RecordingInvoker};
    use async_trait::async_trait;

    const QUEUE: &str = "account-request.fifo";

    #[derive(Debug)]
    struct Exists(bool);

    #[async_trait]
    impl AccountExistence for Exists {
        async fn healthy_product_exists(&self, _account_email: &str) -> ProviderResult<bool> {
            Ok(self.0)
        }
    }

    #[derive(Debug)]
    struct NeverProtected;

    #[async_trait]
    impl ProtectedAccounts for NeverProtected {
        async fn is_protected(
            &self,
            _parameters: &ControlTowerParameters,
        ) -> std::result::Result<bool, ClassificationError> {
            Ok(false)
        }
    }

    fn processor(exists: bool) -> (RecordProcessor, Arc<InMemoryWorkQueue>, Arc<RecordingInvoker>) {
        let queue = Arc::new(InMemoryWorkQueue::new());
        queue.ensure_queue(QUEUE);
        let invoker = Arc::new(RecordingInvoker::new());
        let classifier = EventClassifier::new(Arc::new(Exists(exists)), Arc::new(NeverProtected));
        let processor = RecordProcessor::new(
            classifier,
            queue.clone(),
            invoker.clone(),
            ProcessorTargets {
                request_queue_name: QUEUE.to_string(),
                cleanup_function_name: "cleanup".to_string(),
                provisioning_framework_function_name: "provisioning-framework".to_string(),
            },
        );
        (processor, queue, invoker)
    }

    fn image(ou: &str, name: &str) -> AccountRequestImage {
        AccountRequestImage::new("a@x.com", ControlTowerParameters::new("a@x.com", name, ou))
    }

    #[tokio::test]
    async fn test_update_enqueues_old_and_new_parameters() {
        let (processor, queue, invoker) = processor(true);
        let record = AccountRequestRecord::modify(image("Sandbox", "Team-A"), image("Sandbox", "Team-B"));

        let processed = processor.process(&record).await.unwrap();
        assert_eq!(processed.action, LifecycleAction::EnqueueUpdate);
        assert!(processed.message_id.is_some());
        assert!(invoker.invocations().is_empty());

        let bodies = queue.peek_bodies(QUEUE);
        let item = WorkItem::from_json(&bodies[0]).unwrap();
        assert_eq!(item.operation, WorkOperation::Update);
        assert_eq!(
            item.old_control_tower_parameters.unwrap().account_name,
            "Team-A"
        );

        let options = &queue.sent_options(QUEUE)[0];
        assert_eq!(options.deduplication_id, options.group_id);
    }

    #[tokio::test]
    async fn test_remove_invokes_cleanup_with_old_image() {
        let (processor, queue, invoker) = processor(true);
        let record = AccountRequestRecord::remove(image("Sandbox", "Team-A"));

        processor.process(&record).await.unwrap();

        let invocations = invoker.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].0, "cleanup");
        assert_eq!(invocations[0].1["account_request"]["id"], "a@x.com");
        assert_eq!(queue.queue_length(QUEUE), 0);
    }

    #[tokio::test]
    async fn test_customization_payload_shape() {
        let (processor, _, invoker) = processor(true);
        let record = AccountRequestRecord::insert(image("Sandbox", "Team-A"));

        let processed = processor.process(&record).await.unwrap();
        assert_eq!(processed.action, LifecycleAction::InvokeCustomizationOnly);

        let invocations = invoker.invocations();
        let (function, payload) = &invocations[0];
        assert_eq!(function, "provisioning-framework");
        assert_eq!(payload["control_tower_event"], json!({}));
        assert_eq!(
            payload["account_request"]["control_tower_parameters"]["AccountName"],
            "Team-A"
        );
    }

    #[tokio::test]
    async fn test_foreign_event_source_is_malformed() {
        let (processor, _, _) = processor(false);
        let event = json!({
            "Records": [{
                "eventName": "INSERT",
                "eventSource": "aws:s3",
                "dynamodb": {}
            }]
        });

        let err = processor.process_event(&event).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Classification);
    }
}
