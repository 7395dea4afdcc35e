//! User-facing notifications.
//!
//! Every progress message that deserves the user's attention becomes a
//! [`Notification`], shown either as a native modal dialog or printed to
//! the terminal.

use kerio_import_core::config::AppConfig;
use kerio_import_core::error::ImportError;
use kerio_import_core::import::ImportMessage;
use owo_colors::OwoColorize;
use rfd::{MessageButtons, MessageDialog, MessageLevel};

pub const SUCCESS_TITLE: &str = "Erfolg";
pub const SUCCESS_MESSAGE: &str = "Termine erfolgreich importiert!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success() -> Self {
        Notification {
            level: Level::Info,
            title: SUCCESS_TITLE.to_string(),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn error(error: &ImportError) -> Self {
        Notification {
            level: Level::Error,
            title: error.title().to_string(),
            message: error.to_string(),
        }
    }

    pub fn warning(error: &ImportError) -> Self {
        Notification {
            level: Level::Warning,
            title: error.title().to_string(),
            message: error.to_string(),
        }
    }
}

/// The notification for a progress message, if any.
///
/// The success notification does not mention skipped rows.
pub fn notification_for(message: &ImportMessage) -> Option<Notification> {
    match message {
        ImportMessage::Connected | ImportMessage::Loaded { .. } | ImportMessage::Uploaded { .. } => {
            None
        }
        ImportMessage::RowFailed { row, error } => {
            let mut notification = Notification::error(error);
            notification.message = format!("Zeile {row}: {}", notification.message);
            Some(notification)
        }
        ImportMessage::Warning(error) => Some(Notification::warning(error)),
        ImportMessage::Failed(error) => Some(Notification::error(error)),
        ImportMessage::Finished(_) => Some(Notification::success()),
    }
}

pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Native modal dialogs; blocks until the user acknowledges.
pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn notify(&self, notification: &Notification) {
        let level = match notification.level {
            Level::Info => MessageLevel::Info,
            Level::Warning => MessageLevel::Warning,
            Level::Error => MessageLevel::Error,
        };

        MessageDialog::new()
            .set_level(level)
            .set_title(notification.title.as_str())
            .set_description(notification.message.as_str())
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

/// Colored terminal output for headless use.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            Level::Info => println!(
                "{} {}",
                format!("{}:", notification.title).green(),
                notification.message
            ),
            Level::Warning => eprintln!(
                "{} {}",
                format!("{}:", notification.title).yellow(),
                notification.message
            ),
            Level::Error => eprintln!(
                "{} {}",
                format!("{}:", notification.title).red(),
                notification.message
            ),
        }
    }
}

pub fn for_config(config: &AppConfig) -> Box<dyn Notifier> {
    if config.dialogs {
        Box::new(DialogNotifier)
    } else {
        Box::new(TerminalNotifier)
    }
}
