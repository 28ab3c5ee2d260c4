//! User-created conditions.
//!
//! Custom conditions have no template counterpart, so they are edited in place and deleted
//! outright. Insertion order is preserved; it is the order they appear after the defaults.

use super::overlay::ConditionPatch;
use super::template::{Descriptions, Placement};
use cmvr_types::ConditionId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCondition {
    pub id: ConditionId,
    pub title: String,
    #[serde(default)]
    pub descriptions: Descriptions,
    #[serde(default = "top_level")]
    pub placement: Placement,
}

fn top_level() -> Placement {
    Placement::TopLevel
}

impl CustomCondition {
    /// Write the fields present in `patch` directly into this condition.
    pub fn apply(&mut self, patch: ConditionPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        self.descriptions = patch.descriptions.apply_to(&self.descriptions);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomStore {
    items: Vec<CustomCondition>,
}

impl CustomStore {
    pub fn push(&mut self, item: CustomCondition) {
        self.items.push(item);
    }

    pub fn get(&self, id: &str) -> Option<&CustomCondition> {
        self.items.iter().find(|c| c.id.as_str() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CustomCondition> {
        self.items.iter_mut().find(|c| c.id.as_str() == id)
    }

    /// Remove and return the condition with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<CustomCondition> {
        let position = self.items.iter().position(|c| c.id.as_str() == id)?;
        Some(self.items.remove(position))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomCondition> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
