//! Repository implementations for database operations.

pub mod role_log;

pub use role_log::RoleLogRepository;
