//! User-role log domain models.
//!
//! Every administrative change to a user's group memberships is recorded as
//! an immutable `UserRoleLogEntry`. Entries are append-only: nothing in the
//! domain or persistence layers updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Action recorded against a user's group membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleAction {
    /// The target user was added to the group.
    Add,
    /// The target user was removed from the group.
    Remove,
    /// Legacy rows written before the action column was populated.
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl RoleAction {
    /// Stored representation; fits the bounded `action_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleAction::Add => "add",
            RoleAction::Remove => "remove",
            RoleAction::Unspecified => "",
        }
    }
}

impl FromStr for RoleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(RoleAction::Add),
            "remove" => Ok(RoleAction::Remove),
            "" => Ok(RoleAction::Unspecified),
            _ => Err(format!("Unknown role action: {}", s)),
        }
    }
}

impl fmt::Display for RoleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable record of a group membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleLogEntry {
    /// Assigned by the store at creation, immutable.
    pub id: Uuid,
    /// Set once at creation, immutable.
    pub created_at: DateTime<Utc>,
    /// Affected group. Kept as a durable historical pointer; group deletion
    /// policy is a schema concern, not the auditor's.
    pub group_id: Uuid,
    /// Actor who made the change.
    pub performed_by: Uuid,
    /// User whose membership changed.
    pub performed_on: Uuid,
    #[serde(default)]
    pub action: RoleAction,
}

/// Input for appending a role-log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleLogInput {
    pub group_id: Uuid,
    pub performed_by: Uuid,
    pub performed_on: Uuid,
    pub action: RoleAction,
}

impl CreateRoleLogInput {
    /// Create an input with the action left unspecified.
    pub fn new(group_id: Uuid, performed_by: Uuid, performed_on: Uuid) -> Self {
        Self {
            group_id,
            performed_by,
            performed_on,
            action: RoleAction::Unspecified,
        }
    }

    /// Set the recorded action.
    pub fn with_action(mut self, action: RoleAction) -> Self {
        self.action = action;
        self
    }
}

/// New group membership chosen by an administrative edit.
///
/// An edit either names the full set of groups the user should hold after
/// the save, or explicitly clears every membership. There is no "field
/// omitted" state; callers must say which of the two they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelection {
    /// The complete membership set after the edit. An empty set clears all
    /// groups, same as [`GroupSelection::ClearAll`].
    Choose(HashSet<Uuid>),
    /// Remove the user from every group currently held.
    ClearAll,
}

/// Filters for listing role-log records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRoleLogQuery {
    pub performed_by: Option<Uuid>,
    pub performed_on: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub action: Option<RoleAction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// User reference on a role-log record, with the email shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleLogUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Group reference on a role-log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleLogGroup {
    pub id: Uuid,
    pub name: Option<String>,
}

/// Read model for role-log listings: an entry joined with the actor, target
/// and group details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleLogRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub action: RoleAction,
    pub group: RoleLogGroup,
    pub performed_by: RoleLogUser,
    pub performed_on: RoleLogUser,
}
