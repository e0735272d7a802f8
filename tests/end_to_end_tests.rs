//! Change-log event through classification, queueing and dispatch.

mod common;

use account_lifecycle::classification::LifecycleAction;
use account_lifecycle::models::{EventKind, WorkOperation};
use account_lifecycle::provisioning::{DispatchOutcome, RejectionReason};
use common::*;
use uuid::Uuid;

#[tokio::test]
async fn test_new_request_is_queued_then_provisioned() {
    let world = TestWorld::new();
    let context = world.context().await;

    let request = RequestImageBuilder::new("a@x.com", "Team-A", "Sandbox")
        .with_extension("SSOUserEmail", "owner@x.com")
        .with_extension("SSOUserFirstName", "Ada")
        .build();
    let event = change_log_event(EventKind::Insert, None, Some(&request));

    let processed = context.record_processor().process_event(&event).await.unwrap();
    assert_eq!(processed.action, LifecycleAction::EnqueueCreate);
    let message_id = processed.message_id.unwrap();
    assert_eq!(world.queue.queue_length(QUEUE), 1);
    assert!(world.invoker.invocations().is_empty());

    let outcome = context.dispatcher().dispatch_one().await.unwrap();
    match &outcome {
        DispatchOutcome::Provisioned {
            message_id: dispatched_id,
            operation,
            account_email,
            ..
        } => {
            assert_eq!(dispatched_id, &message_id);
            assert_eq!(*operation, WorkOperation::Add);
            assert_eq!(account_email, "a@x.com");
        }
        other => panic!("expected provisioning, got {other:?}"),
    }

    let requests = world.catalog.provision_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(Uuid::parse_str(&request.provision_token).is_ok());
    assert_eq!(request.product_id, "prod-acctfactory");
    assert_eq!(request.provisioning_artifact_id, "pa-current");
    assert!(request
        .provisioning_parameters
        .iter()
        .any(|p| p.key == "AccountName" && p.value == "Team-A"));
    assert!(request
        .provisioning_parameters
        .iter()
        .any(|p| p.key == "SSOUserFirstName" && p.value == "Ada"));

    assert_eq!(world.queue.deleted(QUEUE), vec![message_id]);
    assert_eq!(world.queue.queue_length(QUEUE), 0);
    assert_eq!(world.queue.in_flight_count(QUEUE), 0);

    // The outcome is reported as JSON by the dispatch entry point
    let reported = serde_json::to_value(&outcome).unwrap();
    assert_eq!(reported["outcome"], "provisioned");
    assert_eq!(reported["operation"], "ADD");
}

#[tokio::test]
async fn test_ou_only_change_runs_customizations_without_queueing() {
    let world = TestWorld::new();
    world
        .catalog
        .add_provisioned_product(ProvisionedProductBuilder::new("pp-a", "a@x.com").build());
    let context = world.context().await;

    let old = RequestImageBuilder::new("a@x.com", "Team-A", "Sandbox").build();
    let new = RequestImageBuilder::new("a@x.com", "Team-A", "Workloads").build();
    let event = change_log_event(EventKind::Modify, Some(&old), Some(&new));

    let processed = context.record_processor().process_event(&event).await.unwrap();

    assert_eq!(processed.action, LifecycleAction::InvokeCustomizationOnly);
    assert!(processed.message_id.is_none());
    assert_eq!(world.queue.queue_length(QUEUE), 0);

    let invocations = world.invoker.invocations();
    assert_eq!(invocations.len(), 1);
    let (function, payload) = &invocations[0];
    assert_eq!(function, FRAMEWORK_FUNCTION);
    assert_eq!(
        payload["account_request"]["control_tower_parameters"]["ManagedOrganizationalUnit"],
        "Workloads"
    );

    let outcome = context.dispatcher().dispatch_one().await.unwrap();
    assert_eq!(outcome, DispatchOutcome::QueueEmpty);
    assert_eq!(world.catalog.write_count(), 0);
}

// Classification queues the change; dispatch then refuses anything but an OU move.
#[tokio::test]
async fn test_attribute_change_is_queued_then_rejected() {
    let world = TestWorld::new();
    world
        .catalog
        .add_provisioned_product(ProvisionedProductBuilder::new("pp-a", "a@x.com").build());
    let context = world.context().await;

    let old = RequestImageBuilder::new("a@x.com", "Team-A", "Sandbox")
        .with_extension("SSOUserEmail", "owner@x.com")
        .build();
    let new = RequestImageBuilder::new("a@x.com", "Team-A", "Sandbox")
        .with_extension("SSOUserEmail", "new-owner@x.com")
        .build();
    let event = change_log_event(EventKind::Modify, Some(&old), Some(&new));

    let processed = context.record_processor().process_event(&event).await.unwrap();
    assert_eq!(processed.action, LifecycleAction::EnqueueUpdate);

    let outcome = context.dispatcher().dispatch_one().await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Rejected {
            message_id: processed.message_id.unwrap(),
            reason: RejectionReason::ImmutableFieldChanged {
                fields: vec!["SSOUserEmail".to_string()]
            },
        }
    );
    assert!(world.catalog.update_requests().is_empty());
    assert_eq!(world.queue.in_flight_count(QUEUE), 0);
}

#[tokio::test]
async fn test_duplicate_create_is_rejected_at_dispatch() {
    let world = TestWorld::new();
    let context = world.context().await;

    let request = RequestImageBuilder::new("a@x.com", "Team-A", "Sandbox").build();
    let event = change_log_event(EventKind::Insert, None, Some(&request));
    context.record_processor().process_event(&event).await.unwrap();

    // Account appears in the organization before the work item is dispatched
    world.orgs.add_account("555555555555", "Team-A", "a@x.com", SANDBOX_OU);

    let outcome = context.dispatcher().dispatch_one().await.unwrap();
    assert!(outcome.is_rejected());
    assert_eq!(world.catalog.write_count(), 0);
    assert_eq!(world.queue.queue_length(QUEUE), 0);
    assert_eq!(world.queue.in_flight_count(QUEUE), 0);
}
