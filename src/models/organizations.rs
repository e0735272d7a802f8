//! Organization hierarchy records.

use serde::{Deserialize, Serialize};

/// The single root of the organization tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgRoot {
    pub id: String,
    pub name: String,
}

impl OrgRoot {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An organizational unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OuNode {
    pub id: String,
    pub name: String,
    /// Id of the parent OU or of the root
    pub parent_id: Option<String>,
}

impl OuNode {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: parent_id.map(Into::into),
        }
    }
}

/// A member account of the organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgAccount {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl OrgAccount {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Kind of node an account or OU hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParentKind {
    Root,
    OrganizationalUnit,
}

/// Parent link returned by the organization provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
    pub kind: ParentKind,
}
