//! One editing session of the ECC condition checklist.
//!
//! [`ConditionSession`] owns the mutable stores for a single report draft, applies user
//! actions to them and recomputes the derived views (merged list, labels, output document) on
//! request. It performs no I/O; see [`crate::service::ChecklistService`] for the variant that
//! persists after every change.

use crate::conditions::{
    is_orphaned_divider, label, merge, serialize, ConditionPatch, CustomCondition, Descriptions,
    Label, MergedItem, OutputDocument, Placement, TemplateStore,
};
use crate::constants::{CUSTOM_ID_PREFIX, NEW_CONDITION_TITLE};
use crate::persistence::PersistedState;
use crate::{CoreError, CoreResult};
use cmvr_types::{ComplianceStatus, ConditionId};
use cmvr_uuid::{TimestampId, TimestampIdGenerator};
use std::sync::Arc;

/// How a condition was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalKind {
    /// A default hidden for this session; [`ConditionSession::restore_defaults`] undoes it.
    Hidden,
    /// A custom condition deleted permanently.
    Deleted,
}

/// Outcome of a removal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal {
    pub id: ConditionId,
    pub kind: RemovalKind,
    /// The divider hidden because `id` was its last live condition.
    pub cascaded_divider: Option<ConditionId>,
}

impl Removal {
    pub fn is_reversible(&self) -> bool {
        self.kind == RemovalKind::Hidden
    }
}

/// A row as the checklist screen renders it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistRow {
    pub label: Label,
    pub item: MergedItem,
    pub selection: Option<ComplianceStatus>,
    pub remark: String,
}

impl ChecklistRow {
    pub fn is_divider(&self) -> bool {
        self.item.is_divider()
    }
}

#[derive(Clone, Debug)]
pub struct ConditionSession {
    templates: Arc<TemplateStore>,
    state: PersistedState,
    ids: TimestampIdGenerator,
}

impl ConditionSession {
    /// A session with no edits over `templates`.
    pub fn new(templates: Arc<TemplateStore>) -> Self {
        Self::from_persisted(templates, PersistedState::default())
    }

    /// Re-hydrate a session from saved state.
    ///
    /// The custom-id generator resumes after the newest custom id found in `state`, so ids
    /// issued now can never repeat one issued in an earlier session.
    pub fn from_persisted(templates: Arc<TemplateStore>, state: PersistedState) -> Self {
        let newest = state
            .customs
            .iter()
            .filter_map(|c| c.id.as_str().strip_prefix(CUSTOM_ID_PREFIX))
            .filter_map(|suffix| suffix.parse::<TimestampId>().ok())
            .max();

        Self {
            templates,
            state,
            ids: TimestampIdGenerator::resume_after(newest),
        }
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// The aggregate state to hand to a persistence port.
    pub fn snapshot(&self) -> &PersistedState {
        &self.state
    }

    pub fn into_persisted(self) -> PersistedState {
        self.state
    }

    /// The canonical ordered list of live conditions.
    pub fn merged(&self) -> Vec<MergedItem> {
        merge(
            &self.templates,
            &self.state.overlays,
            &self.state.removed_ids,
            &self.state.customs,
        )
    }

    /// Live conditions with their display labels.
    pub fn labelled(&self) -> Vec<(Label, MergedItem)> {
        let merged = self.merged();
        label(&merged)
            .into_iter()
            .map(|l| (l.label, l.item.clone()))
            .collect()
    }

    /// Everything a renderer needs per row.
    pub fn rows(&self) -> Vec<ChecklistRow> {
        self.labelled()
            .into_iter()
            .map(|(label, item)| {
                let id = item.id.as_str();
                ChecklistRow {
                    selection: self.state.annotations.selection(id),
                    remark: self
                        .state
                        .annotations
                        .remark(id)
                        .unwrap_or_default()
                        .to_string(),
                    label,
                    item,
                }
            })
            .collect()
    }

    /// The report output for the current state.
    pub fn export(&self) -> OutputDocument {
        serialize(&self.merged(), &self.state.annotations)
    }

    fn is_live(&self, id: &str) -> bool {
        self.state.customs.contains(id)
            || (self.templates.contains(id) && !self.state.removed_ids.contains(id))
    }

    fn next_custom_id(&mut self) -> CoreResult<ConditionId> {
        let id = format!("{}{}", CUSTOM_ID_PREFIX, self.ids.next_id());
        ConditionId::new(id).map_err(|e| CoreError::InvalidInput(e.to_string()))
    }

    /// Append a new top-level custom condition with empty descriptions.
    ///
    /// The caller is expected to open it for editing straight away.
    pub fn add_item(&mut self) -> CoreResult<ConditionId> {
        self.push_custom(Placement::TopLevel)
    }

    /// Append a new custom condition nested under the divider `parent`.
    ///
    /// `parent` must be a live divider. Custom children keep the divider alive until they are
    /// deleted.
    pub fn add_child_item(&mut self, parent: &str) -> CoreResult<ConditionId> {
        let parent_item = self
            .merged()
            .into_iter()
            .find(|item| item.id.as_str() == parent)
            .ok_or_else(|| not_found(parent))?;

        if !parent_item.is_divider() {
            return Err(CoreError::InvalidInput(format!(
                "condition '{}' is not a divider and cannot have nested conditions",
                parent
            )));
        }

        self.push_custom(Placement::Nested {
            parent: parent_item.id,
        })
    }

    fn push_custom(&mut self, placement: Placement) -> CoreResult<ConditionId> {
        let id = self.next_custom_id()?;
        let title = format!("{} {}", NEW_CONDITION_TITLE, self.state.customs.len() + 1);

        self.state.customs.push(CustomCondition {
            id: id.clone(),
            title,
            descriptions: Descriptions::default(),
            placement,
        });

        tracing::debug!("added custom condition {}", id);
        Ok(id)
    }

    /// Edit a condition's title and/or descriptions.
    ///
    /// Default conditions get the patch merged into their overlay (the template is untouched);
    /// custom conditions are patched in place.
    pub fn edit_item(&mut self, id: &str, patch: ConditionPatch) -> CoreResult<()> {
        if let Some(template) = self.templates.get(id) {
            let template_id = template.id.clone();
            self.state.overlays.patch(&template_id, patch);
            tracing::debug!("updated overlay for condition {}", template_id);
            return Ok(());
        }

        let custom = self
            .state
            .customs
            .get_mut(id)
            .ok_or_else(|| not_found(id))?;
        custom.apply(patch);
        tracing::debug!("edited custom condition {}", id);
        Ok(())
    }

    /// Drop the overlay of a default condition. Returns whether there was one.
    pub fn reset_item(&mut self, id: &str) -> CoreResult<bool> {
        if self.templates.contains(id) {
            return Ok(self.state.overlays.clear(id));
        }
        if self.state.customs.contains(id) {
            return Err(CoreError::InvalidInput(format!(
                "condition '{}' is a custom condition and has no template to reset to",
                id
            )));
        }
        Err(not_found(id))
    }

    /// Hide a live default condition for this session.
    ///
    /// Dividers cannot be hidden directly; they disappear with their last nested condition.
    /// A condition that still has live nested conditions cannot be hidden either, so no live
    /// row ever points at a hidden parent. Selections and remarks for the id are kept.
    pub fn hide_default(&mut self, id: &str) -> CoreResult<Removal> {
        let template = self
            .templates
            .get(id)
            .filter(|t| !self.state.removed_ids.contains(t.id.as_str()))
            .ok_or_else(|| not_found(id))?;

        if template.placement.is_divider() {
            return Err(CoreError::InvalidInput(format!(
                "divider '{}' is removed together with its last nested condition",
                id
            )));
        }

        if self
            .merged()
            .iter()
            .any(|item| item.nested_under() == Some(&template.id))
        {
            return Err(CoreError::InvalidInput(format!(
                "condition '{}' still has nested conditions; remove them first",
                id
            )));
        }

        let id = template.id.clone();
        let parent = template.placement.parent().cloned();
        self.state.removed_ids.insert(id.clone());
        tracing::debug!("hid default condition {} for this session", id);

        Ok(Removal {
            cascaded_divider: self.cascade(parent),
            kind: RemovalKind::Hidden,
            id,
        })
    }

    /// Permanently delete a custom condition.
    pub fn delete_custom(&mut self, id: &str) -> CoreResult<Removal> {
        if self.templates.contains(id) {
            return Err(CoreError::InvalidInput(format!(
                "condition '{}' is a default condition; hide it instead",
                id
            )));
        }

        let removed = self
            .state
            .customs
            .remove(id)
            .ok_or_else(|| not_found(id))?;
        tracing::debug!("deleted custom condition {}", removed.id);

        Ok(Removal {
            cascaded_divider: self.cascade(removed.placement.parent().cloned()),
            kind: RemovalKind::Deleted,
            id: removed.id,
        })
    }

    /// Remove a condition from whichever store owns it.
    ///
    /// The returned [`Removal`] says whether this was a reversible hide or a permanent delete.
    pub fn remove_item(&mut self, id: &str) -> CoreResult<Removal> {
        if self.state.customs.contains(id) {
            self.delete_custom(id)
        } else {
            self.hide_default(id)
        }
    }

    fn cascade(&mut self, parent: Option<ConditionId>) -> Option<ConditionId> {
        let parent = parent?;
        if !is_orphaned_divider(&parent, &self.templates, &self.merged()) {
            return None;
        }

        self.state.removed_ids.insert(parent.clone());
        tracing::debug!("hid divider {} after its last nested condition", parent);
        Some(parent)
    }

    /// Bring back every hidden default condition.
    pub fn restore_defaults(&mut self) {
        tracing::debug!("restoring {} hidden conditions", self.state.removed_ids.len());
        self.state.removed_ids.clear();
    }

    /// Record a compliance choice (or clear it with `None`). Any id is accepted.
    pub fn set_selection(&mut self, id: ConditionId, status: Option<ComplianceStatus>) {
        self.state.annotations.set_selection(id, status);
    }

    /// Record a free-text remark. Any id is accepted.
    pub fn set_remark(&mut self, id: ConditionId, text: impl Into<String>) {
        self.state.annotations.set_remark(id, text);
    }

    /// Copy the canned description for the current selection into the remark.
    ///
    /// Returns the text written, or `None` if the condition has no selection yet.
    pub fn apply_canned_remark(&mut self, id: &str) -> CoreResult<Option<String>> {
        let item = self
            .merged()
            .into_iter()
            .find(|item| item.id.as_str() == id)
            .ok_or_else(|| not_found(id))?;

        let Some(status) = self.state.annotations.selection(id) else {
            return Ok(None);
        };

        let text = item.descriptions.for_status(status).to_string();
        self.state.annotations.set_remark(item.id, text.clone());
        Ok(Some(text))
    }

    /// Whether `id` currently appears in the merged list.
    pub fn contains(&self, id: &str) -> bool {
        self.is_live(id)
    }
}

fn not_found(id: &str) -> CoreError {
    match ConditionId::new(id) {
        Ok(id) => CoreError::ConditionNotFound(id),
        Err(_) => CoreError::InvalidInput("condition id cannot be empty".into()),
    }
}
