//! Common validation utilities.

use validator::ValidationError;

/// Maximum stored length of a role-log action type.
///
/// The backing column is `VARCHAR(6)`; the values written by the auditor
/// (`"add"`, `"remove"`, `""`) all fit, but the bound is also enforced here
/// so a bad value is rejected before it reaches the database.
pub const MAX_ACTION_TYPE_LEN: usize = 6;

/// Validates that an action type fits the bounded storage column.
///
/// Only the length is checked. Legacy rows may carry short free-form values,
/// so membership in the known action set is a domain-level concern.
pub fn validate_action_type(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() <= MAX_ACTION_TYPE_LEN {
        Ok(())
    } else {
        let mut err = ValidationError::new("action_type_length");
        err.message = Some("Action type must be at most 6 characters".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_actions_pass() {
        assert!(validate_action_type("add").is_ok());
        assert!(validate_action_type("remove").is_ok());
        assert!(validate_action_type("").is_ok());
    }

    #[test]
    fn test_boundary_length_passes() {
        assert!(validate_action_type(&"x".repeat(6)).is_ok());
    }

    #[test]
    fn test_over_length_fails() {
        let err = validate_action_type(&"x".repeat(7)).unwrap_err();
        assert_eq!(err.code, "action_type_length");
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // Six multi-byte characters still fit the bound
        assert!(validate_action_type("éééééé").is_ok());
        assert!(validate_action_type("ééééééé").is_err());
    }
}
