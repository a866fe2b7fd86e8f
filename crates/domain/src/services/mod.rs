//! Domain services for the localization platform backend.
//!
//! Services contain business logic that operates on domain models.

pub mod role_audit;

pub use role_audit::{MockRoleLogStore, RoleChangeAuditor, RoleLogStore, RoleLogStoreError};
