//! # Provisioned Product Records
//!
//! Typed views of the account-vending provider's product catalog: provisioned products,
//! product descriptions, provisioning artifacts and the requests sent to create or update
//! a vended account.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-reported status of a provisioned product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Available,
    UnderChange,
    Tainted,
    Error,
    PlanInProgress,
}

impl ProductStatus {
    /// Only `AVAILABLE` and `TAINTED` count as healthy
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Available | Self::Tainted)
    }

    /// Operations the provider is still working on
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::UnderChange | Self::PlanInProgress)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal = match self {
            Self::Available => "AVAILABLE",
            Self::UnderChange => "UNDER_CHANGE",
            Self::Tainted => "TAINTED",
            Self::Error => "ERROR",
            Self::PlanInProgress => "PLAN_IN_PROGRESS",
        };
        f.write_str(literal)
    }
}

/// A vended account as the provider sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedProductSummary {
    pub id: String,
    pub name: String,
    pub product_id: String,
    pub product_type: String,
    pub status: ProductStatus,
    pub provisioning_artifact_id: String,
    pub last_successful_provisioning_record_id: Option<String>,
    /// Email from the product's `AccountEmail` output, when the provider exposes it
    pub account_email: Option<String>,
}

impl ProvisionedProductSummary {
    /// Healthy status and a completed provisioning behind it
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
            && self
                .last_successful_provisioning_record_id
                .as_deref()
                .is_some_and(|record| !record.is_empty())
    }

    pub fn is_in_progress(&self) -> bool {
        self.status.is_in_progress()
    }
}

/// Artifact (version) of a catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningArtifact {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Catalog product with its artifact summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescription {
    pub product_id: String,
    pub name: String,
    pub artifact_ids: Vec<String>,
}

/// One key/value input passed to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningParameter {
    pub key: String,
    pub value: String,
}

impl ProvisioningParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionProductRequest {
    pub product_id: String,
    pub provisioning_artifact_id: String,
    pub provisioned_product_name: String,
    pub provisioning_parameters: Vec<ProvisioningParameter>,
    /// Idempotency token, fresh per attempt
    pub provision_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProvisionedProductRequest {
    pub provisioned_product_id: String,
    pub product_id: String,
    pub provisioning_artifact_id: String,
    pub provisioning_parameters: Vec<ProvisioningParameter>,
    /// Idempotency token, fresh per attempt
    pub update_token: String,
}

/// Provider acknowledgement of an accepted create or update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRecord {
    pub record_id: String,
    pub provisioned_product_id: String,
}
