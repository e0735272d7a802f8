//! # Models
//!
//! Typed records exchanged between the engine and its collaborators. Untyped provider
//! and change-log payloads are decoded here, once, and fail fast on missing fields.

pub mod account_request;
pub mod attribute_value;
pub mod organizations;
pub mod provisioned_product;
pub mod work_item;

use thiserror::Error;

pub use account_request::{
    emails_are_equal, AccountRequestImage, AccountRequestRecord, ChangeLogEvent,
    ChangeLogRecord, ControlTowerParameters, EventKind, StreamImages,
};
pub use attribute_value::{marshal_image, unmarshal_image, AttributeValue, TaggedImage};
pub use organizations::{OrgAccount, OrgRoot, OuNode, ParentKind, ParentRef};
pub use provisioned_product::{
    ProductDescription, ProductStatus, ProvisionProductRequest, ProvisionedProductSummary,
    ProvisioningArtifact, ProvisioningParameter, ProvisioningRecord,
    UpdateProvisionedProductRequest,
};
pub use work_item::{WorkItem, WorkOperation};

/// Errors raised while decoding change-log records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid change-log structure: {message}")]
    InvalidStructure { message: String },

    #[error("Unexpected event source: {event_source}")]
    InvalidEventSource { event_source: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid attribute value: {message}")]
    InvalidAttribute { message: String },

    #[error("Invalid request image: {message}")]
    InvalidImage { message: String },
}

impl RecordError {
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            message: message.into(),
        }
    }

    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
        }
    }
}
