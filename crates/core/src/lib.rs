//! Core domain types and shared logic for the Paulo Cell backend.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Entity kinds and their active/shadow collection names
//! - Typed customer, device, service and document records
//! - The tombstone wrapper carried by soft-deleted records
//! - Application configuration

pub mod config;
pub mod error;
pub mod model;

pub use config::{AppConfig, ServerConfig, StoreConfig, TrashConfig};
pub use error::{Error, Result};
pub use model::{Collection, Customer, Device, Document, Entity, EntityKind, Service, Trashed};

/// Default trash retention window in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 60;

/// Default sweep interval in seconds: 24 hours.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;
