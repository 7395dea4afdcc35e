//! The interactive import form.
//!
//! Idle: ask for credentials and a CSV file. Processing: run the import on a
//! worker thread and show progress and notifications. After each run the
//! form goes back to Idle.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use dialoguer::{Confirm, Input, Password};
use indicatif::ProgressBar;
use kerio_import_caldav::DavConnector;
use kerio_import_core::config::AppConfig;
use kerio_import_core::credentials::{CredentialStore, Credentials};
use kerio_import_core::import::{ImportJob, ImportMessage};
use tracing::{info, warn};

use crate::notify::{Notification, Notifier, notification_for};
use crate::utils::tui::{create_progress_bar, create_spinner};
use crate::worker::spawn_import;

pub enum FormState {
    Idle,
    Processing(ImportJob),
}

pub struct Form {
    config: AppConfig,
    store: CredentialStore,
    notifier: Box<dyn Notifier>,
}

impl Form {
    pub fn new(config: AppConfig, store: CredentialStore, notifier: Box<dyn Notifier>) -> Self {
        Form {
            config,
            store,
            notifier,
        }
    }

    pub fn run(&self) -> Result<()> {
        let mut state = FormState::Idle;

        loop {
            state = match state {
                FormState::Idle => match self.collect_job()? {
                    Some(job) => FormState::Processing(job),
                    None => {
                        println!("Keine Datei ausgewählt.");
                        if !self.ask_again()? {
                            break;
                        }
                        FormState::Idle
                    }
                },
                FormState::Processing(job) => {
                    self.process(job)?;
                    if !self.ask_again()? {
                        break;
                    }
                    FormState::Idle
                }
            };
        }

        Ok(())
    }

    /// Fill the form. `None` when no file was selected.
    fn collect_job(&self) -> Result<Option<ImportJob>> {
        let stored = self.store.load().unwrap_or_else(|e| {
            warn!("Ignoring stored credentials: {e}");
            self.notifier.notify(&Notification::warning(&e));
            Credentials::default()
        });

        let username = Input::<String>::new()
            .with_prompt("Kerio Benutzername")
            .with_initial_text(stored.username.clone())
            .allow_empty(true)
            .interact_text()?;

        let replacement = if stored.password.is_empty() {
            Some(self.ask_password("Kerio Passwort")?)
        } else if Confirm::new()
            .with_prompt("Gespeichertes Passwort verwenden?")
            .default(true)
            .interact()?
        {
            None
        } else {
            Some(self.ask_password("Neues Kerio Passwort (leer lassen zum Löschen)")?)
        };
        let password = choose_password(stored.password, replacement);

        let Some(csv_path) = self.pick_file()? else {
            return Ok(None);
        };

        if let Err(e) = self.store.save(&username, &password) {
            warn!("Could not save credentials: {e}");
            self.notifier.notify(&Notification::warning(&e));
        }

        Ok(Some(ImportJob {
            server_url: self.config.server_url.clone(),
            calendar_url: self.config.calendar_url_for(&username),
            credentials: Credentials::new(username, password),
            csv_path,
        }))
    }

    fn ask_password(&self, prompt: &str) -> Result<String> {
        Ok(Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?)
    }

    fn pick_file(&self) -> Result<Option<PathBuf>> {
        if self.config.dialogs {
            return Ok(rfd::FileDialog::new()
                .set_title("CSV-Datei auswählen")
                .add_filter("CSV Dateien", &["csv"])
                .pick_file());
        }

        let path = Input::<String>::new()
            .with_prompt("CSV-Datei auswählen (Pfad)")
            .allow_empty(true)
            .interact_text()?;
        let path = path.trim();

        Ok((!path.is_empty()).then(|| PathBuf::from(path)))
    }

    fn process(&self, job: ImportJob) -> Result<()> {
        info!("Importing {}", job.csv_path.display());
        let (handle, rx) = spawn_import(DavConnector, job, self.config.titles.clone())?;

        let spinner = create_spinner("Verbinde mit Kalender...".to_string());
        let mut bar: Option<ProgressBar> = None;

        for message in rx {
            match &message {
                ImportMessage::Connected => spinner.set_message("Lade CSV-Datei..."),
                ImportMessage::Loaded { rows } => {
                    spinner.finish_and_clear();
                    bar = Some(create_progress_bar(*rows as u64));
                }
                ImportMessage::Uploaded { summary, .. } => {
                    if let Some(bar) = &bar {
                        bar.set_message(summary.clone());
                        bar.inc(1);
                    }
                }
                ImportMessage::RowFailed { .. } => {
                    if let Some(bar) = &bar {
                        bar.inc(1);
                    }
                }
                ImportMessage::Finished(report) => {
                    info!(
                        "{} events uploaded, {} rows skipped",
                        report.uploaded, report.skipped
                    );
                }
                ImportMessage::Warning(_) | ImportMessage::Failed(_) => {}
            }

            if let Some(notification) = notification_for(&message) {
                let active = bar.as_ref().unwrap_or(&spinner);
                active.suspend(|| self.notifier.notify(&notification));
            }
        }

        spinner.finish_and_clear();
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        handle
            .join()
            .map_err(|_| anyhow!("Import worker panicked"))?;

        Ok(())
    }

    fn ask_again(&self) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt("Weitere CSV-Datei importieren?")
            .default(true)
            .interact()?)
    }
}

/// The stored password unless the user typed a replacement, which may be
/// empty to clear it.
fn choose_password(stored: String, replacement: Option<String>) -> String {
    replacement.unwrap_or(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeping_stored_password() {
        assert_eq!(choose_password("geheim".into(), None), "geheim");
    }

    #[test]
    fn test_empty_replacement_clears_stored_password() {
        assert_eq!(choose_password("geheim".into(), Some(String::new())), "");
    }

    #[test]
    fn test_replacement_wins_over_stored_password() {
        assert_eq!(choose_password("alt".into(), Some("neu".into())), "neu");
    }

    #[test]
    fn test_cleared_password_is_saved_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.save("max", "geheim").unwrap();

        let password = choose_password(store.load().unwrap().password, Some(String::new()));
        store.save("max", &password).unwrap();

        assert_eq!(store.load().unwrap(), Credentials::new("max", ""));
    }
}
