//! Per-condition compliance selection and free-text remark.
//!
//! Writes are unconditional upserts keyed by id. Entries for conditions that are no longer
//! live are kept (a hidden default may come back) and simply ignored by the serializer.

use cmvr_types::{ComplianceStatus, ConditionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub selections: BTreeMap<ConditionId, ComplianceStatus>,
    #[serde(default)]
    pub remarks: BTreeMap<ConditionId, String>,
}

impl Annotations {
    /// Set or (with `None`) clear the selection for `id`.
    pub fn set_selection(&mut self, id: ConditionId, status: Option<ComplianceStatus>) {
        match status {
            Some(status) => {
                self.selections.insert(id, status);
            }
            None => {
                self.selections.remove(&id);
            }
        }
    }

    pub fn set_remark(&mut self, id: ConditionId, text: impl Into<String>) {
        self.remarks.insert(id, text.into());
    }

    pub fn selection(&self, id: &str) -> Option<ComplianceStatus> {
        self.selections.get(id).copied()
    }

    pub fn remark(&self, id: &str) -> Option<&str> {
        self.remarks.get(id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_selection_upserts_and_clears() {
        let id = ConditionId::new("4").unwrap();
        let mut annotations = Annotations::default();

        annotations.set_selection(id.clone(), Some(ComplianceStatus::Complied));
        annotations.set_selection(id.clone(), Some(ComplianceStatus::NotComplied));
        assert_eq!(annotations.selection("4"), Some(ComplianceStatus::NotComplied));

        annotations.set_selection(id, None);
        assert_eq!(annotations.selection("4"), None);
    }

    #[test]
    fn test_remark_accepts_any_id() {
        let mut annotations = Annotations::default();
        annotations.set_remark(ConditionId::new("no-such-condition").unwrap(), "kept");
        assert_eq!(annotations.remark("no-such-condition"), Some("kept"));
        assert_eq!(annotations.remark("1"), None);
    }
}
