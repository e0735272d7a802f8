//! Proptest strategies for request parameters, OU names and classifier facts.

use account_lifecycle::classification::RecordFacts;
use account_lifecycle::models::{ControlTowerParameters, EventKind};
use proptest::prelude::*;

pub fn email_strategy() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9]{0,11}", "[a-z]{2,10}\\.(com|org|io)").prop_map(|(local, domain)| format!("{local}@{domain}"))
}

pub fn account_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9-]{0,20}"
}

/// OU names, including ones that themselves contain parentheses
pub fn ou_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][A-Za-z0-9 _-]{0,20}[A-Za-z0-9]",
        "[A-Z][a-z]{1,8} \\([A-Z]{2}\\)",
    ]
}

pub fn ou_id_strategy() -> impl Strategy<Value = String> {
    ("[0-9a-z]{4,8}", "[0-9a-z]{8,16}").prop_map(|(root_part, ou_part)| format!("ou-{root_part}-{ou_part}"))
}

pub fn extensions_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("SSO[A-Z][a-z]{2,10}", "[A-Za-z0-9@.]{1,16}"), 0..4)
}

pub fn control_tower_parameters_strategy() -> impl Strategy<Value = ControlTowerParameters> {
    (
        email_strategy(),
        account_name_strategy(),
        ou_name_strategy(),
        extensions_strategy(),
    )
        .prop_map(|(email, name, ou, extensions)| {
            extensions
                .into_iter()
                .fold(ControlTowerParameters::new(email, name, ou), |parameters, (key, value)| {
                    parameters.with_extension(key, value)
                })
        })
}

pub fn event_kind_strategy() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Insert),
        Just(EventKind::Modify),
        Just(EventKind::Remove),
    ]
}

/// Arbitrary fact combinations, including ones no real record produces
pub fn record_facts_strategy() -> impl Strategy<Value = RecordFacts> {
    (
        event_kind_strategy(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(event_kind, is_create, is_update, control_tower_parameters_changed, protected, product_exists)| {
                RecordFacts {
                    event_kind,
                    is_create,
                    is_update,
                    control_tower_parameters_changed,
                    protected,
                    product_exists,
                }
            },
        )
}
