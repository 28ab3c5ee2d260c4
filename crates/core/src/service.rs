//! The checklist as the host application drives it.
//!
//! [`ChecklistService`] wraps a [`ConditionSession`] together with a [`PersistencePort`]. It
//! loads once on mount and saves the whole aggregate after every successful mutation.

use crate::conditions::{ConditionPatch, MergedItem, OutputDocument, TemplateStore};
use crate::persistence::PersistencePort;
use crate::session::{ChecklistRow, ConditionSession, Removal};
use crate::CoreResult;
use cmvr_types::{ComplianceStatus, ConditionId};
use std::sync::Arc;

pub struct ChecklistService<P: PersistencePort> {
    session: ConditionSession,
    port: P,
}

impl<P: PersistencePort> ChecklistService<P> {
    /// Mount the checklist: load saved state from `port`, or start from the bare templates.
    pub fn mount(templates: Arc<TemplateStore>, port: P) -> Self {
        let session = match port.load() {
            Some(state) => {
                tracing::info!(
                    "resumed checklist with {} overlays, {} custom and {} hidden conditions",
                    state.overlays.len(),
                    state.customs.len(),
                    state.removed_ids.len()
                );
                ConditionSession::from_persisted(templates, state)
            }
            None => {
                tracing::info!("starting checklist from {} template conditions", templates.len());
                ConditionSession::new(templates)
            }
        };

        Self { session, port }
    }

    pub fn session(&self) -> &ConditionSession {
        &self.session
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Save the current state through the port.
    pub fn save(&self) {
        self.port.save(self.session.snapshot());
    }

    fn saved<T>(&mut self, result: CoreResult<T>) -> CoreResult<T> {
        if result.is_ok() {
            self.save();
        }
        result
    }

    pub fn merged(&self) -> Vec<MergedItem> {
        self.session.merged()
    }

    pub fn rows(&self) -> Vec<ChecklistRow> {
        self.session.rows()
    }

    pub fn export(&self) -> OutputDocument {
        self.session.export()
    }

    pub fn add_item(&mut self) -> CoreResult<ConditionId> {
        let result = self.session.add_item();
        self.saved(result)
    }

    pub fn add_child_item(&mut self, parent: &str) -> CoreResult<ConditionId> {
        let result = self.session.add_child_item(parent);
        self.saved(result)
    }

    pub fn edit_item(&mut self, id: &str, patch: ConditionPatch) -> CoreResult<()> {
        let result = self.session.edit_item(id, patch);
        self.saved(result)
    }

    pub fn reset_item(&mut self, id: &str) -> CoreResult<bool> {
        let result = self.session.reset_item(id);
        self.saved(result)
    }

    pub fn remove_item(&mut self, id: &str) -> CoreResult<Removal> {
        let result = self.session.remove_item(id);
        self.saved(result)
    }

    pub fn hide_default(&mut self, id: &str) -> CoreResult<Removal> {
        let result = self.session.hide_default(id);
        self.saved(result)
    }

    pub fn delete_custom(&mut self, id: &str) -> CoreResult<Removal> {
        let result = self.session.delete_custom(id);
        self.saved(result)
    }

    pub fn restore_defaults(&mut self) {
        self.session.restore_defaults();
        self.save();
    }

    pub fn set_selection(&mut self, id: ConditionId, status: Option<ComplianceStatus>) {
        self.session.set_selection(id, status);
        self.save();
    }

    pub fn set_remark(&mut self, id: ConditionId, text: impl Into<String>) {
        self.session.set_remark(id, text);
        self.save();
    }

    pub fn apply_canned_remark(&mut self, id: &str) -> CoreResult<Option<String>> {
        let result = self.session.apply_canned_remark(id);
        self.saved(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryPort, PersistedState};
    use crate::CoreError;

    fn templates() -> Arc<TemplateStore> {
        Arc::new(TemplateStore::ecc_default().unwrap())
    }

    fn id(s: &str) -> ConditionId {
        ConditionId::new(s).unwrap()
    }

    #[test]
    fn test_mount_without_saved_state_shows_templates() {
        let service = ChecklistService::mount(templates(), MemoryPort::new());
        assert_eq!(service.merged().len(), 13);
        assert_eq!(service.port().save_count(), 0);
    }

    #[test]
    fn test_every_mutation_saves() {
        let mut service = ChecklistService::mount(templates(), MemoryPort::new());

        let custom = service.add_item().unwrap();
        service
            .edit_item(custom.as_str(), ConditionPatch::title("Dust monitoring"))
            .unwrap();
        service.set_selection(custom.clone(), Some(ComplianceStatus::Complied));
        service.set_remark(custom.clone(), "Monthly");
        service.hide_default("3").unwrap();
        service.restore_defaults();

        assert_eq!(service.port().save_count(), 6);
        let stored = service.port().stored().unwrap();
        assert_eq!(&stored, service.session().snapshot());
        assert_eq!(stored.customs.get(custom.as_str()).unwrap().title, "Dust monitoring");
    }

    #[test]
    fn test_failed_mutation_does_not_save() {
        let mut service = ChecklistService::mount(templates(), MemoryPort::new());

        assert!(matches!(
            service.remove_item("404"),
            Err(CoreError::ConditionNotFound(_))
        ));
        assert!(service.edit_item("404", ConditionPatch::title("x")).is_err());
        assert_eq!(service.port().save_count(), 0);
    }

    #[test]
    fn test_remount_restores_session() {
        let mut service = ChecklistService::mount(templates(), MemoryPort::new());
        service.edit_item("1", ConditionPatch::title("EMP compliance")).unwrap();
        service.remove_item("7a").unwrap();
        let custom = service.add_child_item("7").unwrap();
        service.set_selection(id("1"), Some(ComplianceStatus::NotComplied));
        let before = service.export();

        let saved = service.port().stored().unwrap();
        let remounted = ChecklistService::mount(templates(), MemoryPort::with_state(saved));

        assert_eq!(remounted.export(), before);
        assert!(remounted.session().contains(custom.as_str()));
        assert!(!remounted.session().contains("7a"));
    }

    #[test]
    fn test_hidden_ids_persist_until_restored() {
        let mut service = ChecklistService::mount(templates(), MemoryPort::new());
        service.hide_default("10").unwrap();

        let remounted = ChecklistService::mount(
            templates(),
            MemoryPort::with_state(service.port().stored().unwrap()),
        );
        assert!(!remounted.session().contains("10"));

        let mut remounted = remounted;
        remounted.restore_defaults();
        assert!(remounted.session().contains("10"));
        assert!(remounted.port().stored().unwrap().removed_ids.is_empty());
    }

    #[test]
    fn test_mount_from_default_state_matches_fresh_mount() {
        let fresh = ChecklistService::mount(templates(), MemoryPort::new());
        let seeded =
            ChecklistService::mount(templates(), MemoryPort::with_state(PersistedState::default()));
        assert_eq!(fresh.export(), seeded.export());
    }
}
