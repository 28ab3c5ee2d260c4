//! Session-scoped hiding of default conditions and the divider cascade rule.

use super::merge::MergedItem;
use super::template::TemplateStore;
use cmvr_types::ConditionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids of default conditions hidden from the merged view.
///
/// Hiding is reversible: [`RemovedDefaults::clear`] brings every hidden default back, with any
/// overlay it had still applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemovedDefaults {
    ids: BTreeSet<ConditionId>,
}

impl RemovedDefaults {
    /// Returns false if `id` was already hidden.
    pub fn insert(&mut self, id: ConditionId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Returns true when `parent` is a template divider with no live conditions left under it.
///
/// `live` is the merged list computed after the child removal; a divider in that state must be
/// hidden as well.
pub fn is_orphaned_divider(
    parent: &ConditionId,
    templates: &TemplateStore,
    live: &[MergedItem],
) -> bool {
    let is_divider = templates
        .get(parent.as_str())
        .is_some_and(|t| t.placement.is_divider());

    is_divider
        && live.iter().any(|item| &item.id == parent)
        && !live.iter().any(|item| item.nested_under() == Some(parent))
}
