//! Error types and user-facing categories

use thiserror::Error;

/// Errors raised by workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Storage error for '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("Corrupted data under '{key}': {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet has no header row")]
    EmptySheet,

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("No template selected")]
    NoTemplateSelected,

    #[error("Invalid template file: {0}")]
    TemplateFile(String),

    #[error(transparent)]
    Template(#[from] template::TemplateError),

    #[error("A license already exists for '{0}'")]
    DuplicateCpme(String),

    #[error("License not found: {0}")]
    LicenseNotFound(String),

    #[error("Invalid license: {0}")]
    InvalidLicense(String),

    #[error("License {id} already has {max} user(s)")]
    UserLimit { id: String, max: u32 },

    #[error("License {0} has no users")]
    NoUsers(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Download failed for '{filename}': {message}")]
    Download { filename: String, message: String },

    #[error("Email failed for '{document}': {message}")]
    Mail { document: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl WorkspaceError {
    pub fn storage(key: &str, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Category used to pick the notification title and suggested action
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Mail { .. } => ErrorCategory::Network,
            Self::Csv(_) | Self::EmptySheet | Self::TemplateFile(_) | Self::Download { .. } => {
                ErrorCategory::File
            }
            Self::Template(template::TemplateError::PdfError(_)) => ErrorCategory::PdfGeneration,
            Self::Template(_) | Self::TemplateNotFound(_) | Self::NoTemplateSelected => {
                ErrorCategory::Template
            }
            Self::Storage { .. }
            | Self::Corrupted { .. }
            | Self::Json(_)
            | Self::DuplicateCpme(_)
            | Self::LicenseNotFound(_)
            | Self::InvalidLicense(_)
            | Self::UserLimit { .. }
            | Self::NoUsers(_)
            | Self::DocumentNotFound(_) => ErrorCategory::DataProcessing,
            Self::Other(_) => ErrorCategory::Unknown,
        }
    }
}

/// Result type for workspace operations
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Broad error families shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Network,
    File,
    PdfGeneration,
    Template,
    DataProcessing,
    Unknown,
}

impl ErrorCategory {
    pub fn title(self) -> &'static str {
        match self {
            Self::Network => "Erreur réseau",
            Self::File => "Erreur de fichier",
            Self::PdfGeneration => "Erreur de génération PDF",
            Self::Template => "Erreur de modèle",
            Self::DataProcessing => "Erreur de traitement des données",
            Self::Unknown => "Erreur inattendue",
        }
    }

    /// Suggested remedial action
    pub fn action(self) -> &'static str {
        match self {
            Self::Network => "Vérifiez votre connexion internet puis réessayez.",
            Self::File => "Vérifiez le format et la taille du fichier.",
            Self::PdfGeneration => "Vérifiez que le modèle est un PDF valide.",
            Self::Template => "Sélectionnez ou importez à nouveau un modèle.",
            Self::DataProcessing => "Vérifiez les données saisies ou importées.",
            Self::Unknown => "Réessayez. Si le problème persiste, contactez le support.",
        }
    }
}
