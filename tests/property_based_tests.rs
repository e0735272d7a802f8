//! Property tests for the classifier decision table, OU naming, request validation
//! and throttle backoff.

mod common;

use account_lifecycle::classification::{decide, LifecycleAction, RecordFacts};
use account_lifecycle::models::EventKind;
use account_lifecycle::organizations::{format_nested, parse_nested, OuReference};
use account_lifecycle::providers::ProviderError;
use account_lifecycle::provisioning::RequestValidator;
use account_lifecycle::resilience::{RecordingSleeper, RetryPolicy, ThrottleRetry};
use common::strategies::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn policy_strategy() -> impl Strategy<Value = RetryPolicy> {
    (1u32..8, 1u64..5_000, 0u64..2_000, 1u64..120_000).prop_map(
        |(max_attempts, base_ms, jitter_ms, extra_max_ms)| RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(base_ms + extra_max_ms),
            max_jitter: Duration::from_millis(jitter_ms),
        },
    )
}

proptest! {
    #[test]
    fn prop_remove_always_classifies_as_remove(facts in record_facts_strategy()) {
        let facts = RecordFacts {
            event_kind: EventKind::Remove,
            ..facts
        };
        prop_assert_eq!(decide(facts), LifecycleAction::Remove);
    }

    #[test]
    fn prop_protected_unchanged_never_provisions(
        facts in record_facts_strategy(),
        event_kind in prop_oneof![Just(EventKind::Insert), Just(EventKind::Modify)],
    ) {
        let facts = RecordFacts {
            event_kind,
            protected: true,
            control_tower_parameters_changed: false,
            ..facts
        };
        prop_assert_eq!(decide(facts), LifecycleAction::InvokeCustomizationOnly);
    }

    #[test]
    fn prop_decision_is_deterministic(facts in record_facts_strategy()) {
        prop_assert_eq!(decide(facts), decide(facts));
    }

    #[test]
    fn prop_nested_reference_round_trips(name in ou_name_strategy(), id in ou_id_strategy()) {
        let nested = format_nested(&name, &id);
        prop_assert_eq!(parse_nested(&nested), Some((name.as_str(), id.as_str())));
        prop_assert_eq!(OuReference::parse(&nested).to_string(), nested);
    }

    #[test]
    fn prop_plain_names_are_not_nested(name in ou_name_strategy()) {
        prop_assert_eq!(parse_nested(&name), None);
        prop_assert_eq!(OuReference::parse(&name), OuReference::Plain(name.clone()));
    }

    #[test]
    fn prop_ou_only_change_is_a_valid_modify(
        parameters in control_tower_parameters_strategy(),
        new_ou in ou_name_strategy(),
    ) {
        let mut moved = parameters.clone();
        moved.managed_organizational_unit = new_ou;

        prop_assert!(RequestValidator::modify_request_is_valid(&parameters, &moved));
        prop_assert!(RequestValidator::modify_request_is_valid(&parameters, &parameters));
    }

    #[test]
    fn prop_renaming_is_an_invalid_modify(
        parameters in control_tower_parameters_strategy(),
        new_name in account_name_strategy(),
    ) {
        prop_assume!(new_name != parameters.account_name);
        let mut renamed = parameters.clone();
        renamed.account_name = new_name;

        let first = RequestValidator::validate_modify_request(&parameters, &renamed);
        let second = RequestValidator::validate_modify_request(&parameters, &renamed);
        prop_assert!(!first.is_valid());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_backoff_is_monotone_and_capped(policy in policy_strategy(), jitter_ms in 0u64..2_000) {
        let jitter = Duration::from_millis(jitter_ms);
        let schedule = policy.backoff_schedule(jitter);

        prop_assert_eq!(schedule.len() as u32, policy.max_attempts - 1);
        for pair in schedule.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        for delay in &schedule {
            prop_assert!(*delay <= policy.max_delay);
        }
    }

    #[test]
    fn prop_fewer_throttles_than_attempts_succeed(policy in policy_strategy(), seed in 0u32..64) {
        let max_attempts = policy.max_attempts;
        let throttles = seed % max_attempts;
        let sleeper = Arc::new(RecordingSleeper::new());
        let retry = ThrottleRetry::new(policy).with_sleeper(sleeper.clone()).with_jitter_seed(1);
        let calls = AtomicU32::new(0);

        let result = tokio_test::block_on(retry.call("describe_account", || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call < throttles {
                    Err(ProviderError::throttled("describe_account", "Rate exceeded"))
                } else {
                    Ok(call)
                }
            }
        }));

        prop_assert_eq!(result.ok(), Some(throttles));
        prop_assert_eq!(calls.load(Ordering::SeqCst), throttles + 1);
        prop_assert_eq!(sleeper.recorded().len() as u32, throttles);
        prop_assert!(calls.load(Ordering::SeqCst) <= max_attempts);
    }

    #[test]
    fn prop_persistent_throttling_gives_up_after_max_attempts(policy in policy_strategy()) {
        let max_attempts = policy.max_attempts;
        let retry = ThrottleRetry::new(policy).with_sleeper(Arc::new(RecordingSleeper::new()));
        let calls = AtomicU32::new(0);

        let result: Result<(), ProviderError> = tokio_test::block_on(retry.call("list_accounts", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::throttled("list_accounts", "Rate exceeded")) }
        }));

        prop_assert!(result.unwrap_err().is_throttle_exhausted());
        prop_assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
    }
}
