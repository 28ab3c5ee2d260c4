//! Identifier utilities for CMVR drafts and checklist items.
//!
//! Two kinds of identifier live here:
//!
//! - [`ShardableUuid`]: the canonical UUID of a report draft. Canonical form is **32 lowercase
//!   hexadecimal characters** (no hyphens), the same value `Uuid::new_v4().simple()` prints.
//!   Externally supplied ids (CLI arguments) must already be canonical; nothing is normalised.
//! - [`TimestampId`]: a time-prefixed, per-generator sequenced id used for user-created
//!   checklist conditions. [`TimestampIdGenerator`] makes collisions impossible by
//!   construction rather than detecting them afterwards.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, drafts are stored under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `drafts/55/0e/550e8400e29b41d4a716446655440000/`

mod service;

pub use service::{ShardableUuid, TimestampId, TimestampIdGenerator, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
