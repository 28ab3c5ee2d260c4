//! The immutable set of default ECC conditions.
//!
//! A [`TemplateStore`] is built once at startup, either from the built-in definition or from a
//! YAML file, and is never mutated afterwards. User edits live in the overlay store and user
//! removals in the removal set; both are keyed by the template ids defined here.

use crate::constants::{CUSTOM_ID_PREFIX, ECC_TEMPLATE_YAML};
use crate::error::{TemplateError, TemplateResult};
use cmvr_types::{ComplianceStatus, ConditionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three canned remark variants offered for a condition, one per compliance status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptions {
    pub complied_text: String,
    pub partially_complied_text: String,
    pub not_complied_text: String,
}

impl Descriptions {
    /// Returns the canned text matching `status`.
    pub fn for_status(&self, status: ComplianceStatus) -> &str {
        match status {
            ComplianceStatus::Complied => &self.complied_text,
            ComplianceStatus::PartiallyComplied => &self.partially_complied_text,
            ComplianceStatus::NotComplied => &self.not_complied_text,
        }
    }

    /// The variants as an ordered triple: complied, partially complied, not complied.
    pub fn to_triple(&self) -> [String; 3] {
        [
            self.complied_text.clone(),
            self.partially_complied_text.clone(),
            self.not_complied_text.clone(),
        ]
    }
}

/// Where a condition sits in the checklist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// A numbered row.
    TopLevel,
    /// A title-only heading row that groups nested conditions. It never carries a selection.
    Divider,
    /// A row shown under `parent`, labelled with its own id.
    Nested { parent: ConditionId },
}

impl Placement {
    pub fn parent(&self) -> Option<&ConditionId> {
        match self {
            Placement::Nested { parent } => Some(parent),
            Placement::TopLevel | Placement::Divider => None,
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, Placement::Divider)
    }
}

/// A default condition definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionTemplate {
    pub id: ConditionId,
    pub title: String,
    pub descriptions: Descriptions,
    pub placement: Placement,
}

/// Ordered, immutable collection of [`ConditionTemplate`]s with lookup by id.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: Vec<ConditionTemplate>,
    index: HashMap<ConditionId, usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    conditions: Vec<TemplateEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateEntry {
    id: ConditionId,
    title: String,
    #[serde(default)]
    divider: bool,
    #[serde(default)]
    nested_under: Option<ConditionId>,
    #[serde(default)]
    descriptions: Option<Descriptions>,
}

impl TemplateStore {
    /// The built-in ECC monitoring condition set.
    pub fn ecc_default() -> TemplateResult<Self> {
        Self::from_yaml(ECC_TEMPLATE_YAML)
    }

    /// Parse and validate a YAML template definition.
    ///
    /// Errors carry the path of the offending YAML node (for example `conditions[3].id`).
    pub fn from_yaml(yaml: &str) -> TemplateResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml);
        let file: TemplateFile =
            serde_path_to_error::deserialize(deserializer).map_err(|err| {
                TemplateError::InvalidYaml {
                    path: err.path().to_string(),
                    source: err.into_inner(),
                }
            })?;

        let mut templates = Vec::with_capacity(file.conditions.len());
        for entry in file.conditions {
            let placement = match (entry.divider, entry.nested_under) {
                (true, Some(_)) => return Err(TemplateError::NestedDivider(entry.id)),
                (true, None) => Placement::Divider,
                (false, Some(parent)) => Placement::Nested { parent },
                (false, None) => Placement::TopLevel,
            };

            let descriptions = match (&placement, entry.descriptions) {
                (Placement::Divider, Some(_)) => {
                    return Err(TemplateError::DividerWithDescriptions(entry.id))
                }
                (Placement::Divider, None) => Descriptions::default(),
                (_, Some(descriptions)) => descriptions,
                (_, None) => return Err(TemplateError::MissingDescriptions(entry.id)),
            };

            templates.push(ConditionTemplate {
                id: entry.id,
                title: entry.title,
                descriptions,
                placement,
            });
        }

        Self::new(templates)
    }

    /// Build a store from already-constructed templates, validating structure.
    ///
    /// Rules: ids are unique and outside the custom-id space, titles are non-blank, a nested
    /// condition's parent is defined earlier and is not itself nested, and every divider has
    /// at least one nested condition.
    pub fn new(templates: Vec<ConditionTemplate>) -> TemplateResult<Self> {
        let mut index = HashMap::with_capacity(templates.len());

        for (position, template) in templates.iter().enumerate() {
            if template.id.as_str().starts_with(CUSTOM_ID_PREFIX) {
                return Err(TemplateError::ReservedId(template.id.clone()));
            }
            if template.title.trim().is_empty() {
                return Err(TemplateError::EmptyTitle(template.id.clone()));
            }
            if let Placement::Nested { parent } = &template.placement {
                let parent_template = index
                    .get(parent)
                    .map(|&i: &usize| &templates[i])
                    .ok_or_else(|| TemplateError::UnknownParent {
                        id: template.id.clone(),
                        parent: parent.clone(),
                    })?;
                if parent_template.placement.parent().is_some() {
                    return Err(TemplateError::ParentNotTopLevel {
                        id: template.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            if index.insert(template.id.clone(), position).is_some() {
                return Err(TemplateError::DuplicateId(template.id.clone()));
            }
        }

        if let Some(empty) = templates.iter().find(|t| {
            t.placement.is_divider()
                && !templates
                    .iter()
                    .any(|child| child.placement.parent() == Some(&t.id))
        }) {
            return Err(TemplateError::EmptyDivider(empty.id.clone()));
        }

        Ok(Self { templates, index })
    }

    pub fn get(&self, id: &str) -> Option<&ConditionTemplate> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Templates in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ConditionTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
