//! Sending generated documents by email

use crate::documents::{DocumentLog, GeneratedDocument};
use crate::notify::{Notification, Notifier};
use crate::storage::StoragePort;
use crate::{Result, WorkspaceError};
use log::info;
use std::cell::RefCell;

/// Delivers one document to its recipients
pub trait Mailer {
    fn send(&self, document: &GeneratedDocument) -> Result<()>;
}

/// Mailer that records sent documents in memory
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: RefCell<Vec<String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of sent documents, in send order
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, document: &GeneratedDocument) -> Result<()> {
        self.sent.borrow_mut().push(document.id.clone());
        Ok(())
    }
}

/// Send the selected documents one after another
///
/// Each document is marked sent once its mail went out. The first failure
/// stops the loop; documents sent before it stay marked. An empty selection
/// only warns. Returns the number of sent documents.
pub fn send_documents<S: StoragePort + ?Sized>(
    storage: &S,
    ids: &[String],
    mailer: &dyn Mailer,
    notifier: &dyn Notifier,
) -> Result<usize> {
    if ids.is_empty() {
        notifier.notify(Notification::warning(
            "Aucun document sélectionné",
            "Sélectionnez au moins un document à envoyer.",
        ));
        return Ok(0);
    }

    let log = DocumentLog::new(storage);
    for (sent, id) in ids.iter().enumerate() {
        if let Err(e) = send_one(&log, id, mailer) {
            notifier.notify(Notification::from_error(&e));
            info!("email batch stopped after {sent} of {} documents", ids.len());
            return Err(e);
        }
    }

    notifier.notify(Notification::success(
        "Documents envoyés",
        format!("{} document(s) envoyé(s)", ids.len()),
    ));
    Ok(ids.len())
}

fn send_one<S: StoragePort + ?Sized>(
    log: &DocumentLog<'_, S>,
    id: &str,
    mailer: &dyn Mailer,
) -> Result<()> {
    let document = log
        .get(id)?
        .ok_or_else(|| WorkspaceError::DocumentNotFound(id.to_string()))?;
    mailer.send(&document)?;
    log.mark_sent(id)?;
    Ok(())
}
