//! Template metadata store with admin and shared partitions

use crate::storage::{keys, read_list, write_json, StoragePort};
use crate::Result;
use chrono::Utc;
use log::{debug, info};
use template::Template;

/// Storage partition a template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateScope {
    Admin,
    Shared,
}

impl TemplateScope {
    fn key(self) -> &'static str {
        match self {
            TemplateScope::Admin => keys::ADMIN_TEMPLATES,
            TemplateScope::Shared => keys::SHARED_TEMPLATES,
        }
    }
}

/// Persists templates, one list per scope, ids unique within a scope
///
/// Saving a permanent admin template also writes a copy into the shared
/// scope. The copy is not linked back: editing it leaves the admin
/// template unchanged.
pub struct TemplateStore<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
}

impl<'a, S: StoragePort + ?Sized> TemplateStore<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn list(&self, scope: TemplateScope) -> Result<Vec<Template>> {
        read_list(self.storage, scope.key())
    }

    /// Insert or replace a template by id
    ///
    /// An admin template saved as no longer permanent loses its shared copy.
    pub fn save(&self, template: Template, scope: TemplateScope) -> Result<()> {
        if scope == TemplateScope::Admin {
            if template.permanent {
                self.upsert(template.clone(), TemplateScope::Shared)?;
            } else if self.find(&template.id, scope)?.is_some_and(|t| t.permanent) {
                self.remove_shared_copy(&template.id)?;
            }
        }
        self.upsert(template, scope)
    }

    fn remove_shared_copy(&self, id: &str) -> Result<()> {
        let mut shared = self.list(TemplateScope::Shared)?;
        shared.retain(|t| t.id != id);
        debug!("removing shared copy of template '{id}'");
        write_json(self.storage, TemplateScope::Shared.key(), &shared)
    }

    fn upsert(&self, mut template: Template, scope: TemplateScope) -> Result<()> {
        let mut list = self.list(scope)?;
        match list.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => {
                template.last_updated = Some(Utc::now());
                debug!("updating template '{}' in {scope:?}", template.id);
                *existing = template;
            }
            None => {
                debug!("adding template '{}' to {scope:?}", template.id);
                list.push(template);
            }
        }
        write_json(self.storage, scope.key(), &list)
    }

    /// Look a template up by id
    ///
    /// A shared-scope lookup falls back to the admin scope; an admin-scope
    /// lookup only searches admin templates.
    pub fn get(&self, id: &str, scope: TemplateScope) -> Result<Option<Template>> {
        if let Some(found) = self.find(id, scope)? {
            return Ok(Some(found));
        }
        match scope {
            TemplateScope::Shared => self.find(id, TemplateScope::Admin),
            TemplateScope::Admin => Ok(None),
        }
    }

    fn find(&self, id: &str, scope: TemplateScope) -> Result<Option<Template>> {
        Ok(self.list(scope)?.into_iter().find(|t| t.id == id))
    }

    /// Delete a template, returning whether it existed in `scope`
    ///
    /// Deleting a permanent admin template also removes its shared copy.
    pub fn delete(&self, id: &str, scope: TemplateScope) -> Result<bool> {
        let mut list = self.list(scope)?;
        let Some(pos) = list.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let removed = list.remove(pos);
        write_json(self.storage, scope.key(), &list)?;

        if scope == TemplateScope::Admin && removed.permanent {
            self.remove_shared_copy(id)?;
        }

        info!("deleted template '{id}' from {scope:?}");
        Ok(true)
    }

    /// Remove every template of a scope
    pub fn clear(&self, scope: TemplateScope) -> Result<()> {
        self.storage.delete(scope.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use template::TemplateKind;

    fn ids(templates: Vec<Template>) -> Vec<String> {
        templates.into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_save_and_list() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        store
            .save(Template::new("t1", "Appel", TemplateKind::Appel), TemplateScope::Admin)
            .unwrap();
        store
            .save(Template::new("t2", "Facture", TemplateKind::Facture), TemplateScope::Admin)
            .unwrap();

        assert_eq!(ids(store.list(TemplateScope::Admin).unwrap()), vec!["t1", "t2"]);
        assert!(store.list(TemplateScope::Shared).unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_same_id() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        store
            .save(Template::new("t1", "Old", TemplateKind::Appel), TemplateScope::Admin)
            .unwrap();
        store
            .save(Template::new("t1", "New", TemplateKind::Appel), TemplateScope::Admin)
            .unwrap();

        let list = store.list(TemplateScope::Admin).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "New");
        assert!(list[0].last_updated.is_some());
    }

    #[test]
    fn test_permanent_admin_template_is_mirrored() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        let template = Template::new("t1", "Appel", TemplateKind::Appel).with_permanent(true);
        store.save(template, TemplateScope::Admin).unwrap();

        assert_eq!(ids(store.list(TemplateScope::Shared).unwrap()), vec!["t1"]);
    }

    #[test]
    fn test_shared_edit_does_not_propagate() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        let template = Template::new("t1", "Appel", TemplateKind::Appel).with_permanent(true);
        store.save(template.clone(), TemplateScope::Admin).unwrap();

        let mut edited = template;
        edited.name = "Copie".to_string();
        store.save(edited, TemplateScope::Shared).unwrap();

        let admin = store.get("t1", TemplateScope::Admin).unwrap().unwrap();
        assert_eq!(admin.name, "Appel");
    }

    #[test]
    fn test_unmarking_permanent_removes_shared_copy() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        let template = Template::new("t1", "Appel", TemplateKind::Appel).with_permanent(true);
        store.save(template.clone(), TemplateScope::Admin).unwrap();

        store
            .save(template.with_permanent(false), TemplateScope::Admin)
            .unwrap();

        assert!(store.list(TemplateScope::Shared).unwrap().is_empty());
        assert_eq!(ids(store.list(TemplateScope::Admin).unwrap()), vec!["t1"]);
    }

    #[test]
    fn test_get_fallback() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        store
            .save(Template::new("a1", "Admin only", TemplateKind::Autre), TemplateScope::Admin)
            .unwrap();
        store
            .save(Template::new("s1", "Shared only", TemplateKind::Autre), TemplateScope::Shared)
            .unwrap();

        assert!(store.get("a1", TemplateScope::Shared).unwrap().is_some());
        assert!(store.get("s1", TemplateScope::Admin).unwrap().is_none());
        assert!(store.get("zz", TemplateScope::Shared).unwrap().is_none());
    }

    #[test]
    fn test_delete_permanent_cascades() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        let template = Template::new("t1", "Appel", TemplateKind::Appel).with_permanent(true);
        store.save(template, TemplateScope::Admin).unwrap();

        assert!(store.delete("t1", TemplateScope::Admin).unwrap());
        assert!(store.list(TemplateScope::Admin).unwrap().is_empty());
        assert!(store.list(TemplateScope::Shared).unwrap().is_empty());
    }

    #[test]
    fn test_delete_non_permanent_keeps_shared() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        store
            .save(Template::new("t1", "Admin", TemplateKind::Appel), TemplateScope::Admin)
            .unwrap();
        store
            .save(Template::new("t1", "Shared", TemplateKind::Appel), TemplateScope::Shared)
            .unwrap();

        assert!(store.delete("t1", TemplateScope::Admin).unwrap());
        assert!(store.list(TemplateScope::Admin).unwrap().is_empty());
        assert_eq!(ids(store.list(TemplateScope::Shared).unwrap()), vec!["t1"]);
    }

    #[test]
    fn test_delete_shared_does_not_touch_admin() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        let template = Template::new("t1", "Appel", TemplateKind::Appel).with_permanent(true);
        store.save(template, TemplateScope::Admin).unwrap();

        assert!(store.delete("t1", TemplateScope::Shared).unwrap());
        assert_eq!(ids(store.list(TemplateScope::Admin).unwrap()), vec!["t1"]);
        assert!(!store.delete("t1", TemplateScope::Shared).unwrap());
    }

    #[test]
    fn test_clear() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(&storage);
        store
            .save(Template::new("t1", "Appel", TemplateKind::Appel), TemplateScope::Admin)
            .unwrap();
        store.clear(TemplateScope::Admin).unwrap();
        assert!(store.list(TemplateScope::Admin).unwrap().is_empty());
    }
}
