//! Account lookups over the organization's full account listing.

use crate::error::ResolutionError;
use crate::models::{emails_are_equal, OrgAccount};
use crate::providers::{collect_pages, OrganizationsApi, ProviderResult};
use crate::resilience::ThrottleRetry;

/// Every member account of the organization
pub async fn list_all_accounts(
    orgs: &dyn OrganizationsApi,
    retry: &ThrottleRetry,
) -> ProviderResult<Vec<OrgAccount>> {
    collect_pages(retry, "list_accounts", |token| orgs.list_accounts(token)).await
}

pub async fn account_email_for_id(
    orgs: &dyn OrganizationsApi,
    retry: &ThrottleRetry,
    account_id: &str,
) -> Result<String, ResolutionError> {
    list_all_accounts(orgs, retry)
        .await?
        .into_iter()
        .find(|account| account.id == account_id)
        .map(|account| account.email)
        .ok_or_else(|| ResolutionError::account_not_found(account_id))
}

/// Email match is case-insensitive
pub async fn account_id_for_email(
    orgs: &dyn OrganizationsApi,
    retry: &ThrottleRetry,
    email: &str,
) -> Result<String, ResolutionError> {
    list_all_accounts(orgs, retry)
        .await?
        .into_iter()
        .find(|account| emails_are_equal(&account.email, email))
        .map(|account| account.id)
        .ok_or_else(|| ResolutionError::account_not_found(email))
}
