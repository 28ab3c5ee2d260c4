//! Constants used throughout the CMVR core crate.

/// Default directory for report drafts when no explicit directory is configured.
pub const DEFAULT_DRAFTS_DIR: &str = "drafts";

/// Filename holding the ECC condition checklist state inside a draft directory.
pub const ECC_CONDITIONS_FILENAME: &str = "ecc_conditions.json";

/// Prefix of every generated custom condition id (`custom-<timestamp id>`).
///
/// Template ids may not start with this prefix, which keeps the two id spaces disjoint.
pub const CUSTOM_ID_PREFIX: &str = "custom-";

/// Title given to a freshly added custom condition, followed by its ordinal.
pub const NEW_CONDITION_TITLE: &str = "Additional condition";

/// Built-in ECC condition template definition.
pub const ECC_TEMPLATE_YAML: &str = include_str!("../templates/ecc_conditions.yaml");
