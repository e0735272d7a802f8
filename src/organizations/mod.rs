//! # Organizations
//!
//! OU hierarchy resolution: the nested naming convention, the per-invocation OU cache
//! and the resolver mapping OU references to accounts and back.

pub mod accounts;
pub mod nested;
pub mod ou_cache;
pub mod resolver;

pub use accounts::{account_email_for_id, account_id_for_email, list_all_accounts};
pub use nested::{format_nested, is_ou_id, parse_nested, OuReference};
pub use ou_cache::{build_ou_cache, resolve_root, OuCache};
pub use resolver::OuResolver;
