use cmvr_types::ConditionId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("condition not found: {0}")]
    ConditionNotFound(ConditionId),
    #[error("draft not found: {0}")]
    DraftNotFound(String),
    #[error("invalid condition template: {0}")]
    Template(#[from] TemplateError),
    #[error("identifier error: {0}")]
    Uuid(#[from] cmvr_uuid::UuidError),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create draft directory: {0}")]
    DraftDirCreation(std::io::Error),
    #[error("failed to write draft file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize draft: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize draft: {0}")]
    Deserialization(serde_json::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Problems found while loading or validating a condition template definition.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid YAML at '{path}': {source}")]
    InvalidYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("condition '{0}' has an empty title")]
    EmptyTitle(ConditionId),
    #[error("condition id '{0}' appears more than once")]
    DuplicateId(ConditionId),
    #[error("condition id '{0}' uses the reserved custom-condition prefix")]
    ReservedId(ConditionId),
    #[error("condition '{id}' is nested under '{parent}', which is not defined before it")]
    UnknownParent { id: ConditionId, parent: ConditionId },
    #[error("condition '{id}' is nested under '{parent}', which is itself nested")]
    ParentNotTopLevel { id: ConditionId, parent: ConditionId },
    #[error("divider '{0}' cannot be nested")]
    NestedDivider(ConditionId),
    #[error("divider '{0}' is a title-only row and cannot declare descriptions")]
    DividerWithDescriptions(ConditionId),
    #[error("divider '{0}' has no nested conditions")]
    EmptyDivider(ConditionId),
    #[error("condition '{0}' is missing its status descriptions")]
    MissingDescriptions(ConditionId),
}

pub type TemplateResult<T> = std::result::Result<T, TemplateError>;
