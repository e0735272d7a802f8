//! Queued unit of provisioning work.

use super::account_request::ControlTowerParameters;
use crate::constants::{OPERATION_ADD, OPERATION_UPDATE};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOperation {
    Add,
    Update,
}

impl fmt::Display for WorkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str(OPERATION_ADD),
            Self::Update => f.write_str(OPERATION_UPDATE),
        }
    }
}

/// Message body placed on the request queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub operation: WorkOperation,
    pub control_tower_parameters: ControlTowerParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_control_tower_parameters: Option<ControlTowerParameters>,
}

impl WorkItem {
    pub fn create(control_tower_parameters: ControlTowerParameters) -> Self {
        Self {
            operation: WorkOperation::Add,
            control_tower_parameters,
            old_control_tower_parameters: None,
        }
    }

    pub fn update(old: ControlTowerParameters, new: ControlTowerParameters) -> Self {
        Self {
            operation: WorkOperation::Update,
            control_tower_parameters: new,
            old_control_tower_parameters: Some(old),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}
