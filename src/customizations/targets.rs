//! Customization target selection.
//!
//! Targets are computed from include and exclude filters. Duplicates are dropped, the
//! order of first inclusion is preserved, and exclusions always win.

use crate::error::ResolutionError;
use crate::organizations::OuResolver;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// One include or exclude filter
///
/// ```json
/// {"type": "ous", "target_value": ["Sandbox", "Prod (ou-ab12-cdef3456)"]}
/// {"type": "accounts", "target_value": ["111111111111"]}
/// {"type": "core"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target_value", rename_all = "snake_case")]
pub enum TargetFilter {
    Ous(Vec<String>),
    Accounts(Vec<String>),
    /// The shared log-archive, audit and management accounts
    Core,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationRequest {
    #[serde(default)]
    pub include: Vec<TargetFilter>,
    #[serde(default)]
    pub exclude: Vec<TargetFilter>,
}

#[derive(Debug, Clone)]
pub struct TargetSelector {
    resolver: Arc<OuResolver>,
    core_account_ids: Vec<String>,
}

impl TargetSelector {
    pub fn new(resolver: Arc<OuResolver>, core_account_ids: Vec<String>) -> Self {
        Self {
            resolver,
            core_account_ids,
        }
    }

    pub async fn included_accounts(&self, filters: &[TargetFilter]) -> Result<Vec<String>, ResolutionError> {
        self.expand(filters).await
    }

    pub async fn excluded_accounts(&self, filters: &[TargetFilter]) -> Result<Vec<String>, ResolutionError> {
        self.expand(filters).await
    }

    /// Included accounts minus excluded accounts
    pub async fn target_accounts(&self, request: &CustomizationRequest) -> Result<Vec<String>, ResolutionError> {
        let included = self.included_accounts(&request.include).await?;
        let excluded: HashSet<String> = self
            .excluded_accounts(&request.exclude)
            .await?
            .into_iter()
            .collect();

        let targets: Vec<String> = included
            .into_iter()
            .filter(|account_id| !excluded.contains(account_id))
            .collect();

        info!(
            target_count = targets.len(),
            excluded_count = excluded.len(),
            "🎯 Customization targets selected"
        );
        Ok(targets)
    }

    async fn expand(&self, filters: &[TargetFilter]) -> Result<Vec<String>, ResolutionError> {
        let mut accounts = Vec::new();
        for filter in filters {
            match filter {
                TargetFilter::Ous(names) => {
                    accounts.extend(self.resolver.account_ids_in_ous(names).await?);
                }
                TargetFilter::Accounts(ids) => accounts.extend(ids.iter().cloned()),
                TargetFilter::Core => accounts.extend(self.core_account_ids.iter().cloned()),
            }
        }
        Ok(dedup_preserving_order(accounts))
    }
}

fn dedup_preserving_order(accounts: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    accounts
        .into_iter()
        .filter(|account_id| seen.insert(account_id.clone()))
        .collect()
}
