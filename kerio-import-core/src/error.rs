//! Error types for kerio-import.

use thiserror::Error;

/// Errors that can occur while importing a CSV file into a calendar.
///
/// Messages are shown to the user verbatim, so they carry the wording of
/// the notification dialogs.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Fehler bei der Verbindung zum Kalender: {0}")]
    Connection(String),

    #[error("Kalender nicht gefunden: {0}")]
    CalendarNotFound(String),

    #[error("Fehler beim Laden der CSV-Datei: {0}")]
    DataLoad(String),

    #[error("Fehler beim Laden der CSV-Datei: Spalte '{0}' fehlt")]
    MissingField(String),

    #[error("Fehler beim Parsen des Datums oder der Uhrzeit: {0}")]
    DateParse(String),

    #[error("Fehler beim Hinzufügen des Events zum Kalender: {0}")]
    Upload(String),

    #[error("Fehler beim Abmelden vom Kalender: {0}")]
    Logout(String),

    #[error("Konfigurationsfehler: {0}")]
    Config(String),

    #[error("Interner Fehler beim Start des Imports: {0}")]
    Runtime(String),
}

impl ImportError {
    /// Title of the notification dialog for this error category.
    pub fn title(&self) -> &'static str {
        match self {
            ImportError::Connection(_) | ImportError::CalendarNotFound(_) => "Verbindungsfehler",
            ImportError::DataLoad(_) | ImportError::MissingField(_) => "CSV-Fehler",
            ImportError::DateParse(_) => "Datumsfehler",
            ImportError::Upload(_) => "Kalenderfehler",
            ImportError::Logout(_) => "Abmeldefehler",
            ImportError::Config(_) => "Konfigurationsfehler",
            ImportError::Runtime(_) => "Startfehler",
        }
    }
}

/// Result type alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
