//! # Shared Account Guard
//!
//! The log-archive, audit and control-tower management accounts are vended by the
//! landing zone itself, never by the account factory. Requests for them must only
//! ever trigger customizations, and must not try to move them to another OU.
//!
//! A request refers to a shared account when both its email (case-insensitive) and its
//! name match the provider's description of that account. A partial match is logged and
//! treated as an ordinary account.

use crate::error::ClassificationError;
use crate::models::{emails_are_equal, ControlTowerParameters};
use crate::organizations::OuResolver;
use crate::providers::OrganizationsApi;
use crate::resilience::ThrottleRetry;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Predicate over protected (shared) infrastructure accounts
#[async_trait]
pub trait ProtectedAccounts: Send + Sync + fmt::Debug {
    /// Whether `parameters` describe a protected account
    ///
    /// Fails with [`ClassificationError::ProtectedAccountMove`] when the request would
    /// move a protected account to a different OU.
    async fn is_protected(&self, parameters: &ControlTowerParameters) -> Result<bool, ClassificationError>;
}

#[derive(Debug, Clone)]
pub struct SharedAccountGuard {
    orgs: Arc<dyn OrganizationsApi>,
    retry: Arc<ThrottleRetry>,
    resolver: Arc<OuResolver>,
    shared_account_ids: Vec<String>,
}

impl SharedAccountGuard {
    pub fn new(
        orgs: Arc<dyn OrganizationsApi>,
        retry: Arc<ThrottleRetry>,
        resolver: Arc<OuResolver>,
        shared_account_ids: Vec<String>,
    ) -> Self {
        Self {
            orgs,
            retry,
            resolver,
            shared_account_ids,
        }
    }

    pub fn shared_account_ids(&self) -> &[String] {
        &self.shared_account_ids
    }
}

#[async_trait]
impl ProtectedAccounts for SharedAccountGuard {
    async fn is_protected(&self, parameters: &ControlTowerParameters) -> Result<bool, ClassificationError> {
        for account_id in &self.shared_account_ids {
            let account = self
                .retry
                .call("describe_account", || self.orgs.describe_account(account_id))
                .await?;

            let email_matches = emails_are_equal(&account.email, &parameters.account_email);
            let name_matches = account.name == parameters.account_name;

            match (email_matches, name_matches) {
                (true, true) => {
                    let requested_ou = &parameters.managed_organizational_unit;
                    if !self.resolver.account_in_ou(requested_ou, account_id).await? {
                        return Err(ClassificationError::ProtectedAccountMove {
                            account_id: account_id.clone(),
                            account_email: parameters.account_email.clone(),
                            requested_ou: requested_ou.clone(),
                        });
                    }
                    debug!(account_id = %account_id, "Request refers to a shared account");
                    return Ok(true);
                }
                (true, false) => error!(
                    account_email = %parameters.account_email,
                    account_name = %parameters.account_name,
                    shared_account_id = %account_id,
                    "Account email belongs to a shared account but the account name does not match"
                ),
                (false, true) => error!(
                    account_email = %parameters.account_email,
                    account_name = %parameters.account_name,
                    shared_account_id = %account_id,
                    "Account name belongs to a shared account but the account email does not match"
                ),
                (false, false) => {}
            }
        }
        Ok(false)
    }
}
