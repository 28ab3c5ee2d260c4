//! Builds the live checklist from the template, overlay, removal and custom stores.

use super::custom::CustomStore;
use super::overlay::OverlayStore;
use super::removal::RemovedDefaults;
use super::template::{Descriptions, Placement, TemplateStore};
use cmvr_types::ConditionId;
use serde::Serialize;

/// Which store a merged condition came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Template,
    Custom,
}

/// A render-ready condition: template (with overlay applied) or custom item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergedItem {
    pub id: ConditionId,
    pub title: String,
    pub descriptions: Descriptions,
    pub placement: Placement,
    pub origin: Origin,
}

impl MergedItem {
    pub fn nested_under(&self) -> Option<&ConditionId> {
        self.placement.parent()
    }

    pub fn is_divider(&self) -> bool {
        self.placement.is_divider()
    }
}

/// Merge the stores into the canonical ordered list of live conditions.
///
/// Templates not in `removed` come first, in template order, each with its overlay applied.
/// Custom conditions follow in insertion order.
pub fn merge(
    templates: &TemplateStore,
    overlays: &OverlayStore,
    removed: &RemovedDefaults,
    customs: &CustomStore,
) -> Vec<MergedItem> {
    let defaults = templates
        .iter()
        .filter(|t| !removed.contains(t.id.as_str()))
        .map(|t| {
            let (title, descriptions) = overlays.resolve(t);
            MergedItem {
                id: t.id.clone(),
                title,
                descriptions,
                placement: t.placement.clone(),
                origin: Origin::Template,
            }
        });

    let custom = customs.iter().map(|c| MergedItem {
        id: c.id.clone(),
        title: c.title.clone(),
        descriptions: c.descriptions.clone(),
        placement: c.placement.clone(),
        origin: Origin::Custom,
    });

    defaults.chain(custom).collect()
}
