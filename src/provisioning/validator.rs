//! # Request Validator
//!
//! Structural legality of account requests. A rejected request is an expected outcome
//! reported as [`ValidationOutcome::Rejected`], never as an error.

use crate::constants::ct_parameters;
use crate::models::account_request::field_values_equal;
use crate::models::{emails_are_equal, ControlTowerParameters, OrgAccount};
use crate::organizations::list_all_accounts;
use crate::providers::{OrganizationsApi, ProviderResult};
use crate::resilience::ThrottleRetry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    EmailInUse { account_email: String },
    NameInUse { account_name: String },
    ImmutableFieldChanged { fields: Vec<String> },
    MalformedMessage { message: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailInUse { account_email } => {
                write!(f, "account email {account_email} already exists in the organization")
            }
            Self::NameInUse { account_name } => {
                write!(f, "account name {account_name} already exists in the organization")
            }
            Self::ImmutableFieldChanged { fields } => {
                write!(f, "fields cannot be modified: {}", fields.join(", "))
            }
            Self::MalformedMessage { message } => write!(f, "malformed work item: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Valid,
    Rejected(RejectionReason),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

#[derive(Debug, Clone)]
pub struct RequestValidator {
    orgs: Arc<dyn OrganizationsApi>,
    retry: Arc<ThrottleRetry>,
}

impl RequestValidator {
    pub fn new(orgs: Arc<dyn OrganizationsApi>, retry: Arc<ThrottleRetry>) -> Self {
        Self { orgs, retry }
    }

    /// A new request must not reuse an existing account's email or name
    pub async fn validate_new_request(
        &self,
        parameters: &ControlTowerParameters,
    ) -> ProviderResult<ValidationOutcome> {
        let accounts = list_all_accounts(self.orgs.as_ref(), &self.retry).await?;
        let outcome = check_collisions(&accounts, parameters);

        match &outcome {
            ValidationOutcome::Valid => info!(
                account_email = %parameters.account_email,
                account_name = %parameters.account_name,
                "New account request is valid"
            ),
            ValidationOutcome::Rejected(reason) => warn!(
                account_email = %parameters.account_email,
                reason = %reason,
                "New account request rejected"
            ),
        }
        Ok(outcome)
    }

    pub async fn new_request_is_valid(&self, parameters: &ControlTowerParameters) -> ProviderResult<bool> {
        Ok(self.validate_new_request(parameters).await?.is_valid())
    }

    /// Only the OU assignment of an existing request may change
    pub fn validate_modify_request(
        old: &ControlTowerParameters,
        new: &ControlTowerParameters,
    ) -> ValidationOutcome {
        let new_fields = new.fields();
        let changed: Vec<String> = old
            .fields()
            .into_iter()
            .filter(|(key, _)| *key != ct_parameters::MANAGED_ORGANIZATIONAL_UNIT)
            .filter(|(key, value)| !field_values_equal(key, Some(value), new_fields.get(key)))
            .map(|(key, _)| key.to_string())
            .collect();

        if changed.is_empty() {
            ValidationOutcome::Valid
        } else {
            warn!(fields = ?changed, "Modify request changes immutable fields");
            ValidationOutcome::Rejected(RejectionReason::ImmutableFieldChanged { fields: changed })
        }
    }

    pub fn modify_request_is_valid(old: &ControlTowerParameters, new: &ControlTowerParameters) -> bool {
        Self::validate_modify_request(old, new).is_valid()
    }
}

fn check_collisions(accounts: &[OrgAccount], parameters: &ControlTowerParameters) -> ValidationOutcome {
    if accounts
        .iter()
        .any(|account| emails_are_equal(&account.email, &parameters.account_email))
    {
        return ValidationOutcome::Rejected(RejectionReason::EmailInUse {
            account_email: parameters.account_email.clone(),
        });
    }

    if accounts
        .iter()
        .any(|account| account.name == parameters.account_name)
    {
        return ValidationOutcome::Rejected(RejectionReason::NameInUse {
            account_name: parameters.account_name.clone(),
        });
    }

    ValidationOutcome::Valid
}
