//! # Customizations
//!
//! Selection of the accounts a customization run applies to.

pub mod targets;

pub use targets::{CustomizationRequest, TargetFilter, TargetSelector};
