//! Role-log entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for a `user_role_log` row.
#[derive(Debug, Clone, FromRow)]
pub struct RoleLogEntity {
    /// Unique identifier, assigned by the database.
    pub id: Uuid,

    /// Timestamp when the record was created. Never updated.
    pub created_at: DateTime<Utc>,

    /// Group whose membership changed. Kept as a historical pointer even if
    /// the group is later deleted.
    pub group_id: Uuid,

    /// Actor who performed the change.
    pub performed_by: Uuid,

    /// User whose membership changed.
    pub performed_on: Uuid,

    /// `"add"`, `"remove"`, or `""` for legacy rows. `VARCHAR(6)` column.
    pub action_type: String,
}

/// Role-log row joined with the user emails and group name shown in
/// listings.
#[derive(Debug, Clone, FromRow)]
pub struct RoleLogDetailEntity {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub group_id: Uuid,
    pub group_name: Option<String>,
    pub performed_by: Uuid,
    pub performed_by_email: Option<String>,
    pub performed_on: Uuid,
    pub performed_on_email: Option<String>,
    pub action_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_role_log_entity_creation() {
        let entity = RoleLogEntity {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            group_id: Uuid::new_v4(),
            performed_by: Uuid::new_v4(),
            performed_on: Uuid::new_v4(),
            action_type: "add".to_string(),
        };

        assert_eq!(entity.action_type, "add");
    }

    #[test]
    fn test_role_log_entity_legacy_action_is_empty_string() {
        // Rows written before the action column existed default to ""
        let entity = RoleLogEntity {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            group_id: Uuid::new_v4(),
            performed_by: Uuid::new_v4(),
            performed_on: Uuid::new_v4(),
            action_type: String::new(),
        };

        assert_eq!(entity.action_type, "");
    }

    #[test]
    fn test_detail_entity_carries_display_fields() {
        let entity = RoleLogDetailEntity {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            group_id: Uuid::new_v4(),
            group_name: Some("Managers".to_string()),
            performed_by: Uuid::new_v4(),
            performed_by_email: Some(SafeEmail().fake()),
            performed_on: Uuid::new_v4(),
            performed_on_email: Some(SafeEmail().fake()),
            action_type: "remove".to_string(),
        };

        assert_eq!(entity.group_name.as_deref(), Some("Managers"));
        assert!(entity.performed_by_email.is_some());
    }
}
