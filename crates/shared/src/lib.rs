//! Shared utilities for the localization platform backend.
//!
//! This crate provides common functionality used across the other crates:
//! - Validation of bounded database fields
//! - Cursor-based pagination helpers

pub mod pagination;
pub mod validation;
