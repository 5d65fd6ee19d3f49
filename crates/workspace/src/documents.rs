//! Generated document records and history

use crate::notify::{Notification, Notifier};
use crate::storage::{keys, read_list, write_json, StoragePort};
use crate::{Result, WorkspaceError};
use chrono::{DateTime, NaiveDate, Utc};
use fr_text::{format_date_fr, format_size};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of history events kept
pub const HISTORY_LIMIT: usize = 1000;

/// One generated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `dd/mm/yyyy`
    pub date: String,
    /// Display size, e.g. `12.3 Ko`
    pub size: String,
    #[serde(default)]
    pub sent: bool,
    #[serde(default)]
    pub company: String,
}

impl GeneratedDocument {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        size_bytes: u64,
        company: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind: kind.into(),
            date: format_date_fr(date),
            size: format_size(size_bytes),
            sent: false,
            company: company.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Generated,
    Sent,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub document_id: String,
    pub document_name: String,
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEvent {
    pub fn new(document: &GeneratedDocument, action: HistoryAction) -> Self {
        Self {
            document_id: document.id.clone(),
            document_name: document.name.clone(),
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only event log, oldest events dropped past [`HISTORY_LIMIT`]
pub struct DocumentHistory<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
}

impl<'a, S: StoragePort + ?Sized> DocumentHistory<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> Result<Vec<HistoryEvent>> {
        read_list(self.storage, keys::DOCUMENT_HISTORY)
    }

    pub fn append(&self, events: impl IntoIterator<Item = HistoryEvent>) -> Result<()> {
        let mut history = self.list()?;
        history.extend(events);
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }
        write_json(self.storage, keys::DOCUMENT_HISTORY, &history)
    }
}

/// Persisted list of generated documents
pub struct DocumentLog<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
}

impl<'a, S: StoragePort + ?Sized> DocumentLog<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> Result<Vec<GeneratedDocument>> {
        read_list(self.storage, keys::DOCUMENTS)
    }

    pub fn get(&self, id: &str) -> Result<Option<GeneratedDocument>> {
        Ok(self.list()?.into_iter().find(|d| d.id == id))
    }

    pub fn record(&self, document: GeneratedDocument) -> Result<()> {
        self.record_batch(vec![document])
    }

    /// Append documents with a single write and log a history event for each
    pub fn record_batch(&self, documents: Vec<GeneratedDocument>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let events: Vec<HistoryEvent> = documents
            .iter()
            .map(|d| HistoryEvent::new(d, HistoryAction::Generated))
            .collect();

        let mut list = self.list()?;
        let count = documents.len();
        list.extend(documents);
        write_json(self.storage, keys::DOCUMENTS, &list)?;
        DocumentHistory::new(self.storage).append(events)?;

        debug!("recorded {count} generated documents");
        Ok(())
    }

    /// Flag a document as sent
    pub fn mark_sent(&self, id: &str) -> Result<GeneratedDocument> {
        let mut list = self.list()?;
        let doc = list
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| WorkspaceError::DocumentNotFound(id.to_string()))?;
        doc.sent = true;
        let updated = doc.clone();

        write_json(self.storage, keys::DOCUMENTS, &list)?;
        DocumentHistory::new(self.storage).append([HistoryEvent::new(&updated, HistoryAction::Sent)])?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self.remove(&[id.to_string()])?;
        if removed == 0 {
            return Err(WorkspaceError::DocumentNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete every selected document
    ///
    /// An empty selection only raises a warning and leaves storage untouched.
    /// Unknown ids are ignored. Returns the number of deleted documents.
    pub fn bulk_delete(&self, ids: &[String], notifier: &dyn Notifier) -> Result<usize> {
        if ids.is_empty() {
            notifier.notify(Notification::warning(
                "Aucun document sélectionné",
                "Sélectionnez au moins un document à supprimer.",
            ));
            return Ok(0);
        }

        let removed = self.remove(ids)?;
        info!("deleted {removed} of {} selected documents", ids.len());
        notifier.notify(Notification::success(
            "Documents supprimés",
            format!("{removed} document(s) supprimé(s)"),
        ));
        Ok(removed)
    }

    fn remove(&self, ids: &[String]) -> Result<usize> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .list()?
            .into_iter()
            .partition(|d| ids.contains(&d.id));
        if removed.is_empty() {
            return Ok(0);
        }

        write_json(self.storage, keys::DOCUMENTS, &kept)?;
        DocumentHistory::new(self.storage).append(
            removed
                .iter()
                .map(|d| HistoryEvent::new(d, HistoryAction::Deleted)),
        )?;
        Ok(removed.len())
    }
}
