//! Role-change auditing for administrative group edits.
//!
//! When an administrator saves a user's group memberships, the auditor diffs
//! the previous and new sets and appends one immutable log entry per changed
//! (group, user) pair. A save that changes nothing appends nothing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CreateRoleLogInput, GroupSelection, RoleAction, UserRoleLogEntry};

/// Errors surfaced by role-log stores and the auditor.
///
/// Failed writes are never retried here: a blind retry could duplicate
/// entries, so errors propagate to the enclosing edit transaction instead.
#[derive(Debug, Error)]
pub enum RoleLogStoreError {
    /// The action value violates the bounded-length constraint.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Actor, target user, or group does not exist at write time.
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// Any other storage failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Append-only persistence seam for role-log entries.
///
/// Implementations assign the entry ID and creation timestamp and must
/// enforce the bounded `action_type` constraint. There are deliberately no
/// update or delete operations.
#[async_trait]
pub trait RoleLogStore: Send + Sync {
    async fn create(
        &self,
        input: CreateRoleLogInput,
    ) -> Result<UserRoleLogEntry, RoleLogStoreError>;
}

/// Computes group-membership deltas and appends one log entry per change.
#[derive(Debug, Clone)]
pub struct RoleChangeAuditor<S> {
    store: S,
}

impl<S: RoleLogStore> RoleChangeAuditor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records the group changes of one administrative edit.
    ///
    /// Appends an `"add"` entry for every group in the selection that the
    /// target did not hold before, and a `"remove"` entry for every group no
    /// longer held. Identical before/after sets produce zero entries. The
    /// returned entries are ordered adds-then-removes, each sorted by group
    /// ID, so runs are reproducible.
    ///
    /// Inputs are never mutated. Store errors surface unmodified; entries
    /// already appended by a partially failed call are expected to roll back
    /// with the caller's transaction.
    pub async fn record_role_changes(
        &self,
        actor: Uuid,
        target_user: Uuid,
        previous_groups: &HashSet<Uuid>,
        selection: &GroupSelection,
    ) -> Result<Vec<UserRoleLogEntry>, RoleLogStoreError> {
        let empty = HashSet::new();
        let new_groups = match selection {
            GroupSelection::Choose(groups) => groups,
            GroupSelection::ClearAll => &empty,
        };

        let mut added: Vec<Uuid> = new_groups.difference(previous_groups).copied().collect();
        let mut removed: Vec<Uuid> = previous_groups.difference(new_groups).copied().collect();
        added.sort_unstable();
        removed.sort_unstable();

        tracing::debug!(
            actor = %actor,
            target = %target_user,
            added = added.len(),
            removed = removed.len(),
            "recording role changes"
        );

        let mut entries = Vec::with_capacity(added.len() + removed.len());
        for group_id in added {
            let input = CreateRoleLogInput::new(group_id, actor, target_user)
                .with_action(RoleAction::Add);
            entries.push(self.store.create(input).await?);
        }
        for group_id in removed {
            let input = CreateRoleLogInput::new(group_id, actor, target_user)
                .with_action(RoleAction::Remove);
            entries.push(self.store.create(input).await?);
        }

        Ok(entries)
    }
}

/// In-memory role-log store for tests and callers without a database.
///
/// Mirrors the production store's contract: it enforces the bounded action
/// length and can be primed with unresolvable IDs to exercise the
/// missing-reference path.
#[derive(Debug, Default)]
pub struct MockRoleLogStore {
    entries: Mutex<Vec<UserRoleLogEntry>>,
    missing_refs: Mutex<HashSet<Uuid>>,
}

impl MockRoleLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an ID as unresolvable; subsequent creates referencing it fail.
    pub fn set_missing(&self, id: Uuid) {
        self.missing_refs.lock().unwrap().insert(id);
    }

    /// Snapshot of everything appended so far.
    pub fn entries(&self) -> Vec<UserRoleLogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RoleLogStore for MockRoleLogStore {
    async fn create(
        &self,
        input: CreateRoleLogInput,
    ) -> Result<UserRoleLogEntry, RoleLogStoreError> {
        shared::validation::validate_action_type(input.action.as_str())
            .map_err(|e| RoleLogStoreError::Validation(e.to_string()))?;

        {
            let missing = self.missing_refs.lock().unwrap();
            for id in [input.group_id, input.performed_by, input.performed_on] {
                if missing.contains(&id) {
                    return Err(RoleLogStoreError::MissingReference(format!(
                        "unknown reference: {}",
                        id
                    )));
                }
            }
        }

        let entry = UserRoleLogEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            group_id: input.group_id,
            performed_by: input.performed_by,
            performed_on: input.performed_on,
            action: input.action,
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }
}
