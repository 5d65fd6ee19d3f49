//! User-facing notifications

use crate::WorkspaceError;
use log::{error, info, warn};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    /// Suggested remedial action
    pub action: Option<String>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            action: None,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, title, message)
    }

    /// Error notification titled by the error's category
    pub fn from_error(err: &WorkspaceError) -> Self {
        let category = err.category();
        Self {
            level: NotificationLevel::Error,
            title: category.title().to_string(),
            message: err.to_string(),
            action: Some(category.action().to_string()),
        }
    }
}

/// Sink for user-facing notifications
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        let action = n.action.as_deref().unwrap_or("");
        match n.level {
            NotificationLevel::Info | NotificationLevel::Success => {
                info!("{}: {}", n.title, n.message)
            }
            NotificationLevel::Warning => warn!("{}: {} {}", n.title, n.message, action),
            NotificationLevel::Error => error!("{}: {} {}", n.title, n.message, action),
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.borrow().clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.seen.borrow().iter().filter(|n| n.level == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_error_uses_category() {
        let n = Notification::from_error(&WorkspaceError::EmptySheet);
        assert_eq!(n.level, NotificationLevel::Error);
        assert_eq!(n.title, "Erreur de fichier");
        assert_eq!(n.message, "Spreadsheet has no header row");
        assert!(n.action.is_some());
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::warning("Sélection vide", "Aucun document"));
        notifier.notify(Notification::success("OK", "Terminé"));

        assert_eq!(notifier.notifications().len(), 2);
        assert_eq!(notifier.count(NotificationLevel::Warning), 1);
    }
}
