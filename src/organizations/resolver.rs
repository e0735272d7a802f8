//! # OU Resolver
//!
//! Maps OU references to account sets and accounts to their OU, over an [`OuCache`]
//! built for the current invocation.
//!
//! ## Name resolution
//!
//! - `"<Name> (<ou-id>)"` resolves to the OU with that id, provided its name matches.
//! - A plain name resolves to the first OU carrying it in breadth-first traversal
//!   order. When several OUs share the name the choice is ambiguous; every candidate is
//!   logged and the first one wins. Callers needing a specific OU must use the nested
//!   form.
//! - `"Root"` always denotes the organization root.

use super::nested::OuReference;
use super::ou_cache::{build_ou_cache, OuCache};
use crate::constants::ROOT_OU;
use crate::error::ResolutionError;
use crate::models::{OrgAccount, OuNode, ParentKind};
use crate::providers::{collect_pages, OrganizationsApi};
use crate::resilience::ThrottleRetry;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct OuResolver {
    orgs: Arc<dyn OrganizationsApi>,
    retry: Arc<ThrottleRetry>,
    cache: OuCache,
}

impl OuResolver {
    pub fn new(orgs: Arc<dyn OrganizationsApi>, retry: Arc<ThrottleRetry>, cache: OuCache) -> Self {
        Self { orgs, retry, cache }
    }

    /// Build the OU cache, then the resolver over it
    pub async fn build(
        orgs: Arc<dyn OrganizationsApi>,
        retry: Arc<ThrottleRetry>,
    ) -> Result<Self, ResolutionError> {
        let cache = build_ou_cache(orgs.as_ref(), &retry).await?;
        Ok(Self::new(orgs, retry, cache))
    }

    pub fn cache(&self) -> &OuCache {
        &self.cache
    }

    /// Resolve a nested or plain OU reference against the cache
    ///
    /// `"Root"` is not an OU and does not resolve here; see [`Self::resolve_parent_id`].
    pub fn resolve(&self, reference: &str) -> Option<&OuNode> {
        match OuReference::parse(reference) {
            OuReference::Nested { name, id } => {
                let node = self.cache.get(&id)?;
                if node.name == name {
                    Some(node)
                } else {
                    warn!(
                        reference = %reference,
                        actual_name = %node.name,
                        "OU id found under a different name"
                    );
                    None
                }
            }
            OuReference::Plain(name) => {
                let candidates = self.cache.find_by_name(&name);
                if candidates.len() > 1 {
                    let ids: Vec<&str> = candidates.iter().map(|ou| ou.id.as_str()).collect();
                    warn!(
                        ou_name = %name,
                        candidates = ?ids,
                        chosen = %ids[0],
                        "⚠️ Ambiguous OU name, using first match in traversal order"
                    );
                }
                candidates.into_iter().next()
            }
        }
    }

    /// Id of the root or OU a reference denotes
    pub fn resolve_parent_id(&self, reference: &str) -> Option<String> {
        if reference == ROOT_OU {
            return Some(self.cache.root().id.clone());
        }
        self.resolve(reference).map(|ou| ou.id.clone())
    }

    /// Direct member accounts of the named OUs
    ///
    /// Unresolvable names contribute no accounts and are logged.
    pub async fn account_ids_in_ous(&self, names: &[String]) -> Result<Vec<String>, ResolutionError> {
        let mut account_ids = Vec::new();

        for name in names {
            let Some(parent_id) = self.resolve_parent_id(name) else {
                warn!(ou_name = %name, "OU not found, no accounts resolved for it");
                continue;
            };

            let accounts = self.accounts_for_parent(&parent_id).await?;
            debug!(ou_name = %name, ou_id = %parent_id, accounts = accounts.len(), "Resolved OU members");
            account_ids.extend(accounts.into_iter().map(|account| account.id));
        }

        info!(ou_names = ?names, account_count = account_ids.len(), "Resolved accounts in OUs");
        Ok(account_ids)
    }

    /// The OU directly holding an account; the root is reported as an OU named `"Root"`
    pub async fn ou_for_account(&self, account_id: &str) -> Result<OuNode, ResolutionError> {
        let parents = match self
            .retry
            .call("list_parents", || self.orgs.list_parents(account_id))
            .await
        {
            Ok(parents) => parents,
            Err(e) if e.is_not_found() => return Err(ResolutionError::account_not_found(account_id)),
            Err(e) => return Err(e.into()),
        };

        let parent = parents
            .into_iter()
            .next()
            .ok_or_else(|| ResolutionError::account_not_found(account_id))?;

        match parent.kind {
            ParentKind::Root => Ok(OuNode {
                id: parent.id,
                name: ROOT_OU.to_string(),
                parent_id: None,
            }),
            ParentKind::OrganizationalUnit => {
                self.cache
                    .get(&parent.id)
                    .cloned()
                    .ok_or_else(|| ResolutionError::OuNotCached {
                        account_id: account_id.to_string(),
                        parent_id: parent.id,
                    })
            }
        }
    }

    /// Whether an account sits directly in the referenced OU
    ///
    /// Plain names compare OU names, so any OU carrying the name matches. Nested
    /// references go through [`Self::resolve`] and compare ids; one whose name does not
    /// match its id denotes no OU, as it does for [`Self::account_ids_in_ous`].
    /// Unknown accounts are in no OU.
    pub async fn account_in_ou(&self, ou_name: &str, account_id: &str) -> Result<bool, ResolutionError> {
        if ou_name == ROOT_OU {
            return self.account_is_member_of_root(account_id).await;
        }

        let reference = OuReference::parse(ou_name);
        if matches!(reference, OuReference::Nested { .. }) && self.resolve(ou_name).is_none() {
            return Ok(false);
        }

        let current = match self.ou_for_account(account_id).await {
            Ok(ou) => ou,
            Err(ResolutionError::AccountNotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };
        if current.parent_id.is_none() && current.id == self.cache.root().id {
            return Ok(false);
        }

        Ok(match reference {
            OuReference::Nested { id, .. } => current.id == id,
            OuReference::Plain(name) => current.name == name,
        })
    }

    /// Direct child of the root, checked against the provider rather than the cache
    async fn account_is_member_of_root(&self, account_id: &str) -> Result<bool, ResolutionError> {
        let root_id = self.cache.root().id.clone();
        let accounts = self.accounts_for_parent(&root_id).await?;
        Ok(accounts.iter().any(|account| account.id == account_id))
    }

    async fn accounts_for_parent(&self, parent_id: &str) -> Result<Vec<OrgAccount>, ResolutionError> {
        let orgs = self.orgs.as_ref();
        Ok(collect_pages(&self.retry, "list_accounts_for_parent", |token| {
            orgs.list_accounts_for_parent(parent_id, token)
        })
        .await?)
    }
}
