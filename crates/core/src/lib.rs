//! # CMVR Core
//!
//! The ECC condition overlay/merge engine behind the compliance-monitoring checklist of a
//! CMVR report.
//!
//! This crate contains pure data operations and draft file management:
//! - Template loading and validation ([`conditions::TemplateStore`])
//! - Per-report overlays, custom conditions and session hides, merged into one live list
//! - Display labels and the serialized output consumed by report generation
//! - Sharded JSON draft storage under the configured drafts directory
//!
//! **No UI concerns**: rendering and argument parsing belong in `cmvr-cli`.

pub mod conditions;
pub mod config;
pub mod constants;
pub mod error;
pub mod persistence;
pub mod service;
pub mod session;

pub use cmvr_types::{ComplianceStatus, ConditionId, NonEmptyText, TextError};
pub use config::{resolve_template_file, CoreConfig};
pub use error::{CoreError, CoreResult, TemplateError, TemplateResult};
pub use persistence::{list_drafts, FileDraftStore, MemoryPort, PersistedState, PersistencePort};
pub use service::ChecklistService;
pub use session::{ChecklistRow, ConditionSession, Removal, RemovalKind};
