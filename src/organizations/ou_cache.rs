//! # OU Cache
//!
//! Flattened view of the organization tree, built once at the start of an invocation by
//! [`build_ou_cache`] and handed to the [`OuResolver`](super::OuResolver). Tests can
//! construct a fixed cache with [`OuCache::new`] instead of scripting paginated calls.

use crate::error::ResolutionError;
use crate::models::{OrgRoot, OuNode};
use crate::providers::{collect_pages, OrganizationsApi};
use crate::resilience::ThrottleRetry;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

/// Every OU of the organization in breadth-first order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuCache {
    root: OrgRoot,
    ous: Vec<OuNode>,
    index: HashMap<String, usize>,
}

impl OuCache {
    pub fn new(root: OrgRoot, ous: Vec<OuNode>) -> Self {
        let index = ous
            .iter()
            .enumerate()
            .map(|(position, ou)| (ou.id.clone(), position))
            .collect();
        Self { root, ous, index }
    }

    pub fn root(&self) -> &OrgRoot {
        &self.root
    }

    /// All OUs, in traversal order
    pub fn all_ous(&self) -> &[OuNode] {
        &self.ous
    }

    pub fn get(&self, ou_id: &str) -> Option<&OuNode> {
        self.index.get(ou_id).and_then(|&position| self.ous.get(position))
    }

    /// OUs carrying `name`, in traversal order
    pub fn find_by_name(&self, name: &str) -> Vec<&OuNode> {
        self.ous.iter().filter(|ou| ou.name == name).collect()
    }

    pub fn len(&self) -> usize {
        self.ous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ous.is_empty()
    }
}

/// The organization's single root; zero or several roots is a configuration fault
pub async fn resolve_root(
    orgs: &dyn OrganizationsApi,
    retry: &ThrottleRetry,
) -> Result<OrgRoot, ResolutionError> {
    let mut roots = retry.call("list_roots", || orgs.list_roots()).await?;
    match roots.len() {
        0 => Err(ResolutionError::NoRoot),
        1 => Ok(roots.remove(0)),
        count => Err(ResolutionError::MultipleRoots { count }),
    }
}

/// Traverse the whole tree breadth-first from the root
pub async fn build_ou_cache(
    orgs: &dyn OrganizationsApi,
    retry: &ThrottleRetry,
) -> Result<OuCache, ResolutionError> {
    let root = resolve_root(orgs, retry).await?;
    let mut ous = Vec::new();
    let mut pending = VecDeque::from([root.id.clone()]);

    while let Some(parent_id) = pending.pop_front() {
        let children = collect_pages(retry, "list_organizational_units_for_parent", |token| {
            orgs.list_organizational_units_for_parent(&parent_id, token)
        })
        .await?;

        debug!(parent_id = %parent_id, children = children.len(), "Listed child OUs");
        pending.extend(children.iter().map(|ou| ou.id.clone()));
        ous.extend(children);
    }

    info!(root_id = %root.id, ou_count = ous.len(), "🌳 OU cache built");
    Ok(OuCache::new(root, ous))
}
