//! Token-based pagination over provider listings.

use super::errors::ProviderResult;
use crate::resilience::ThrottleRetry;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// One page of a paginated provider listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present while the provider has further pages
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Drain every page of a listing, resubmitting each page request through `retry`
pub async fn collect_pages<T, F, Fut>(
    retry: &ThrottleRetry,
    operation: &str,
    mut fetch: F,
) -> ProviderResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ProviderResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = retry
            .call(operation, || fetch(next_token.clone()))
            .await?;
        items.extend(page.items);

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => return Ok(items),
        }
    }
}
