//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod role_log;

pub use role_log::{RoleLogDetailEntity, RoleLogEntity};
