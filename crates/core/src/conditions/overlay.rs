//! Sparse per-template edits.
//!
//! Edits to a default condition are recorded here rather than applied to the template, so the
//! effective value of a field is always `overlay[id].field` falling back to `template.field`.
//! Resetting a condition is just dropping its overlay entry.

use super::template::{ConditionTemplate, Descriptions};
use cmvr_types::ConditionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A partial change to the description variants. `None` leaves a variant untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complied_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partially_complied_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_complied_text: Option<String>,
}

impl DescriptionsPatch {
    pub fn is_empty(&self) -> bool {
        self.complied_text.is_none()
            && self.partially_complied_text.is_none()
            && self.not_complied_text.is_none()
    }

    /// Field-level overwrite: every variant present in `newer` replaces the one in `self`.
    pub fn merge(&mut self, newer: DescriptionsPatch) {
        if newer.complied_text.is_some() {
            self.complied_text = newer.complied_text;
        }
        if newer.partially_complied_text.is_some() {
            self.partially_complied_text = newer.partially_complied_text;
        }
        if newer.not_complied_text.is_some() {
            self.not_complied_text = newer.not_complied_text;
        }
    }

    /// Returns `base` with the present variants replaced.
    pub fn apply_to(&self, base: &Descriptions) -> Descriptions {
        Descriptions {
            complied_text: self
                .complied_text
                .clone()
                .unwrap_or_else(|| base.complied_text.clone()),
            partially_complied_text: self
                .partially_complied_text
                .clone()
                .unwrap_or_else(|| base.partially_complied_text.clone()),
            not_complied_text: self
                .not_complied_text
                .clone()
                .unwrap_or_else(|| base.not_complied_text.clone()),
        }
    }
}

/// An edit to a condition's title and/or description variants.
///
/// The same shape is used as the stored overlay for a default condition and as the patch a
/// caller passes to `edit_item`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "DescriptionsPatch::is_empty")]
    pub descriptions: DescriptionsPatch,
}

impl ConditionPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.descriptions.is_empty()
    }

    pub fn merge(&mut self, newer: ConditionPatch) {
        if newer.title.is_some() {
            self.title = newer.title;
        }
        self.descriptions.merge(newer.descriptions);
    }
}

/// Overlay entries keyed by template id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayStore {
    entries: BTreeMap<ConditionId, ConditionPatch>,
}

impl OverlayStore {
    /// Merge `patch` into the entry for `id`, creating it if needed.
    pub fn patch(&mut self, id: &ConditionId, patch: ConditionPatch) {
        self.entries.entry(id.clone()).or_default().merge(patch);
    }

    /// Drop the overlay for `id`; returns whether one existed.
    pub fn clear(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&ConditionPatch> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effective title and descriptions of `template` with its overlay (if any) applied.
    pub fn resolve(&self, template: &ConditionTemplate) -> (String, Descriptions) {
        match self.entries.get(&template.id) {
            Some(patch) => (
                patch
                    .title
                    .clone()
                    .unwrap_or_else(|| template.title.clone()),
                patch.descriptions.apply_to(&template.descriptions),
            ),
            None => (template.title.clone(), template.descriptions.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::template::Placement;

    fn template() -> ConditionTemplate {
        ConditionTemplate {
            id: ConditionId::new("3").unwrap(),
            title: "Original".into(),
            descriptions: Descriptions {
                complied_text: "c".into(),
                partially_complied_text: "p".into(),
                not_complied_text: "n".into(),
            },
            placement: Placement::TopLevel,
        }
    }

    #[test]
    fn test_resolve_without_overlay_returns_template_values() {
        let overlays = OverlayStore::default();
        let (title, descriptions) = overlays.resolve(&template());
        assert_eq!(title, "Original");
        assert_eq!(descriptions, template().descriptions);
    }

    #[test]
    fn test_complied_only_patch_keeps_other_variants() {
        let t = template();
        let mut overlays = OverlayStore::default();
        overlays.patch(
            &t.id,
            ConditionPatch {
                descriptions: DescriptionsPatch {
                    complied_text: Some("edited".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        let (title, descriptions) = overlays.resolve(&t);
        assert_eq!(title, "Original");
        assert_eq!(descriptions.complied_text, "edited");
        assert_eq!(descriptions.partially_complied_text, "p");
        assert_eq!(descriptions.not_complied_text, "n");
    }

    #[test]
    fn test_successive_patches_overwrite_field_by_field() {
        let t = template();
        let mut overlays = OverlayStore::default();
        overlays.patch(&t.id, ConditionPatch::title("First"));
        overlays.patch(
            &t.id,
            ConditionPatch {
                descriptions: DescriptionsPatch {
                    not_complied_text: Some("n2".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        overlays.patch(&t.id, ConditionPatch::title("Second"));

        let (title, descriptions) = overlays.resolve(&t);
        assert_eq!(title, "Second");
        assert_eq!(descriptions.not_complied_text, "n2");
        assert_eq!(descriptions.complied_text, "c");
        assert_eq!(overlays.len(), 1);
    }

    #[test]
    fn test_clear_restores_template() {
        let t = template();
        let mut overlays = OverlayStore::default();
        overlays.patch(&t.id, ConditionPatch::title("Edited"));

        assert!(overlays.clear("3"));
        assert!(!overlays.clear("3"));
        assert_eq!(overlays.resolve(&t).0, "Original");
    }

    #[test]
    fn test_overlay_json_omits_untouched_fields() {
        let t = template();
        let mut overlays = OverlayStore::default();
        overlays.patch(&t.id, ConditionPatch::title("Edited"));

        let json = serde_json::to_string(&overlays).unwrap();
        assert_eq!(json, r#"{"3":{"title":"Edited"}}"#);
    }
}
