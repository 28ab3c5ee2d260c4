//! Projection of the merged checklist into the record list consumed by report generation.
//!
//! The field names and their order are a wire contract with the document generator:
//! `nested_to`, `section`, `condition_number`, `condition`, `status`, `remarks`,
//! `remark_list`.

use super::merge::MergedItem;
use super::selection::Annotations;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_to: Option<String>,
    pub section: usize,
    pub condition_number: usize,
    pub condition: String,
    pub status: String,
    pub remarks: String,
    pub remark_list: [String; 3],
}

/// Ordered output records, serialized as a bare JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputDocument {
    pub records: Vec<OutputRecord>,
}

impl OutputDocument {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Serialize the live conditions with their selections and remarks.
///
/// - One record per non-divider item. Annotations for ids not in `items` are ignored.
/// - `section` increases on every top-level or divider row; nested rows take the section
///   of their parent wherever they appear in `items`.
/// - `condition_number` is the 1-based position in `items`, dividers included.
/// - Missing status or remark serializes as an empty string.
pub fn serialize(items: &[MergedItem], annotations: &Annotations) -> OutputDocument {
    let mut section = 0;
    let mut sections: HashMap<&str, usize> = HashMap::new();
    let mut records = Vec::with_capacity(items.len());

    for (position, item) in items.iter().enumerate() {
        let row_section = match item.nested_under() {
            Some(parent) => sections.get(parent.as_str()).copied().unwrap_or(section),
            None => {
                section += 1;
                sections.insert(item.id.as_str(), section);
                section
            }
        };
        if item.is_divider() {
            continue;
        }

        let id = item.id.as_str();
        records.push(OutputRecord {
            nested_to: item.nested_under().map(ToString::to_string),
            section: row_section,
            condition_number: position + 1,
            condition: format!("Condition {}: {}", item.id, item.title),
            status: annotations
                .selection(id)
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            remarks: annotations.remark(id).unwrap_or_default().to_string(),
            remark_list: item.descriptions.to_triple(),
        });
    }

    OutputDocument { records }
}
