//! Domain models for the localization platform backend.

pub mod role_log;

pub use role_log::{
    CreateRoleLogInput, GroupSelection, ListRoleLogQuery, RoleAction, RoleLogGroup, RoleLogRecord,
    RoleLogUser, UserRoleLogEntry,
};
