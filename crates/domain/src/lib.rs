//! Domain layer for the localization platform backend.
//!
//! This crate contains:
//! - Domain models (role-log entries, group selections, list queries)
//! - The role-change auditing service and its storage seam
//! - Domain error types

pub mod models;
pub mod services;
