//! # Account Request Records
//!
//! Typed view of the account-request change log. Change-log entries are validated and
//! decoded at the boundary so the classifier never indexes untyped maps.

use super::attribute_value::{unmarshal_image, TaggedImage};
use super::provisioned_product::ProvisioningParameter;
use super::RecordError;
use crate::constants::{ct_parameters, provider};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Compare two account emails the way the whole engine does: case-insensitively
pub fn emails_are_equal(first: &str, second: &str) -> bool {
    first.to_lowercase() == second.to_lowercase()
}

/// Kind of change carried by a change-log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Insert,
    Modify,
    Remove,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "INSERT"),
            Self::Modify => write!(f, "MODIFY"),
            Self::Remove => write!(f, "REMOVE"),
        }
    }
}

/// Parameters of the externally-managed account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTowerParameters {
    #[serde(rename = "AccountEmail")]
    pub account_email: String,

    #[serde(rename = "AccountName")]
    pub account_name: String,

    /// Target OU, plain name or nested form `"<Name> (<ou-id>)"`
    #[serde(rename = "ManagedOrganizationalUnit")]
    pub managed_organizational_unit: String,

    /// Provider-specific extension keys (e.g. `SSOUserEmail`)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, String>,
}

impl ControlTowerParameters {
    pub fn new(
        account_email: impl Into<String>,
        account_name: impl Into<String>,
        managed_organizational_unit: impl Into<String>,
    ) -> Self {
        Self {
            account_email: account_email.into(),
            account_name: account_name.into(),
            managed_organizational_unit: managed_organizational_unit.into(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Every field keyed by its wire name
    pub fn fields(&self) -> BTreeMap<&str, &str> {
        let mut fields: BTreeMap<&str, &str> = self
            .extensions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.insert(ct_parameters::ACCOUNT_EMAIL, &self.account_email);
        fields.insert(ct_parameters::ACCOUNT_NAME, &self.account_name);
        fields.insert(
            ct_parameters::MANAGED_ORGANIZATIONAL_UNIT,
            &self.managed_organizational_unit,
        );
        fields
    }

    /// Fields present in either snapshot whose values differ, ignoring the OU assignment
    pub fn changed_fields_excluding_ou(&self, other: &Self) -> Vec<String> {
        let ours = self.fields();
        let theirs = other.fields();
        let keys: BTreeSet<&str> = ours.keys().chain(theirs.keys()).copied().collect();

        keys.into_iter()
            .filter(|key| *key != ct_parameters::MANAGED_ORGANIZATIONAL_UNIT)
            .filter(|key| !field_values_equal(key, ours.get(key), theirs.get(key)))
            .map(str::to_string)
            .collect()
    }

    /// Whether anything other than the OU assignment differs
    pub fn differs_excluding_ou(&self, other: &Self) -> bool {
        !self.changed_fields_excluding_ou(other).is_empty()
    }

    /// Key/value pairs handed to the account-vending provider
    pub fn provisioning_parameters(&self) -> Vec<ProvisioningParameter> {
        self.fields()
            .into_iter()
            .map(|(key, value)| ProvisioningParameter::new(key, value))
            .collect()
    }
}

pub(crate) fn field_values_equal(key: &str, left: Option<&&str>, right: Option<&&str>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) if key == ct_parameters::ACCOUNT_EMAIL => emails_are_equal(l, r),
        (l, r) => l == r,
    }
}

/// One snapshot of an account request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRequestImage {
    /// Request key (the account email)
    pub id: String,

    pub control_tower_parameters: ControlTowerParameters,

    /// Opaque custom fields carried alongside the request
    #[serde(flatten)]
    pub custom_fields: Map<String, Value>,
}

impl AccountRequestImage {
    pub fn new(id: impl Into<String>, control_tower_parameters: ControlTowerParameters) -> Self {
        Self {
            id: id.into(),
            control_tower_parameters,
            custom_fields: Map::new(),
        }
    }

    /// Decode from the change log's tagged encoding
    pub fn from_tagged(image: &TaggedImage) -> Result<Self, RecordError> {
        Self::from_native(Value::Object(unmarshal_image(image)?))
    }

    /// Decode from an already-unmarshalled JSON object
    pub fn from_native(value: Value) -> Result<Self, RecordError> {
        let object = value
            .as_object()
            .ok_or_else(|| RecordError::invalid_image("image is not an object"))?;
        if !object.contains_key("id") {
            return Err(RecordError::missing_field("id"));
        }
        let ct = object
            .get("control_tower_parameters")
            .ok_or_else(|| RecordError::missing_field("control_tower_parameters"))?;
        for key in [
            ct_parameters::ACCOUNT_EMAIL,
            ct_parameters::ACCOUNT_NAME,
            ct_parameters::MANAGED_ORGANIZATIONAL_UNIT,
        ] {
            if ct.get(key).is_none() {
                return Err(RecordError::missing_field(format!(
                    "control_tower_parameters.{key}"
                )));
            }
        }
        serde_json::from_value(value).map_err(|e| RecordError::invalid_image(e.to_string()))
    }

    /// Native JSON form handed to downstream collaborators
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Old/new image pair as delivered on the change log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamImages {
    #[serde(rename = "OldImage", default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<TaggedImage>,

    #[serde(rename = "NewImage", default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<TaggedImage>,
}

/// Raw change-log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogRecord {
    #[serde(rename = "eventName")]
    pub event_name: EventKind,

    #[serde(rename = "eventSource", default)]
    pub event_source: Option<String>,

    pub dynamodb: StreamImages,
}

/// Raw change-log notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEvent {
    #[serde(rename = "Records")]
    pub records: Vec<ChangeLogRecord>,
}

/// A validated, decoded account request change
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRequestRecord {
    pub event_kind: EventKind,
    pub old_image: Option<AccountRequestImage>,
    pub new_image: Option<AccountRequestImage>,
}

impl AccountRequestRecord {
    pub fn insert(new_image: AccountRequestImage) -> Self {
        Self {
            event_kind: EventKind::Insert,
            old_image: None,
            new_image: Some(new_image),
        }
    }

    pub fn modify(old_image: AccountRequestImage, new_image: AccountRequestImage) -> Self {
        Self {
            event_kind: EventKind::Modify,
            old_image: Some(old_image),
            new_image: Some(new_image),
        }
    }

    pub fn remove(old_image: AccountRequestImage) -> Self {
        Self {
            event_kind: EventKind::Remove,
            old_image: Some(old_image),
            new_image: None,
        }
    }

    /// Decode the first record of a change-log notification
    pub fn from_event(event: &Value) -> Result<Self, RecordError> {
        let event: ChangeLogEvent = serde_json::from_value(event.clone())
            .map_err(|e| RecordError::invalid_structure(e.to_string()))?;
        let record = event
            .records
            .first()
            .ok_or_else(|| RecordError::invalid_structure("event carries no records"))?;
        Self::from_change_log(record)
    }

    /// Validate and decode one change-log record
    pub fn from_change_log(record: &ChangeLogRecord) -> Result<Self, RecordError> {
        match record.event_source.as_deref() {
            Some(provider::CHANGE_LOG_EVENT_SOURCE) => {}
            other => {
                return Err(RecordError::InvalidEventSource {
                    event_source: other.unwrap_or("<missing>").to_string(),
                })
            }
        }

        let old_image = record
            .dynamodb
            .old_image
            .as_ref()
            .map(AccountRequestImage::from_tagged)
            .transpose()?;
        let new_image = record
            .dynamodb
            .new_image
            .as_ref()
            .map(AccountRequestImage::from_tagged)
            .transpose()?;

        Ok(Self {
            event_kind: record.event_name,
            old_image,
            new_image,
        })
    }

    /// New request: only a new image is present
    pub fn is_create(&self) -> bool {
        self.old_image.is_none() && self.new_image.is_some()
    }

    /// Modified request: both images are present
    pub fn is_update(&self) -> bool {
        self.old_image.is_some() && self.new_image.is_some()
    }

    /// Whether the CT parameters changed in anything other than the OU assignment
    ///
    /// Always false unless both images are present.
    pub fn control_tower_parameters_changed(&self) -> bool {
        match (&self.old_image, &self.new_image) {
            (Some(old), Some(new)) => old
                .control_tower_parameters
                .differs_excluding_ou(&new.control_tower_parameters),
            _ => false,
        }
    }

    /// Email of the account the record refers to
    pub fn account_email(&self) -> Option<&str> {
        self.new_image
            .as_ref()
            .or(self.old_image.as_ref())
            .map(|image| image.control_tower_parameters.account_email.as_str())
    }
}
