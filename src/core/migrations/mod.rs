// src/core/migrations/mod.rs

//! One-time data migrations run against a whole store.

pub mod completion_flag;

pub use completion_flag::{LEGACY_STATUS_FIELD, MigrationReport, migrate_completion_flag};
