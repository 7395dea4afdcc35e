//! The import workflow: connect, load, map and upload row by row.
//!
//! The workflow talks to the server through [`CalendarConnector`] and
//! [`CalendarSession`] so it can run against a real CalDAV server or an
//! in-memory fake. Progress is reported over an `mpsc` channel.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::{debug, info, warn};

use crate::constants::REQUIRED_COLUMNS;
use crate::credentials::Credentials;
use crate::csv::load_and_clean;
use crate::error::{ImportError, ImportResult};
use crate::event::{EventRecord, TitleRules, build_event};

/// A resolved calendar collection on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarHandle {
    /// Absolute URL of the collection
    pub url: String,
    /// Path part of `url`, as used in DAV requests
    pub href: String,
}

/// Opens authenticated sessions against a calendar server.
#[allow(async_fn_in_trait)]
pub trait CalendarConnector {
    type Session: CalendarSession;

    async fn connect(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> ImportResult<Self::Session>;
}

/// An authenticated session, reused for every upload of one run.
#[allow(async_fn_in_trait)]
pub trait CalendarSession {
    async fn resolve_calendar(&self, calendar_url: &str) -> ImportResult<CalendarHandle>;

    async fn upload(&self, calendar: &CalendarHandle, event: &EventRecord) -> ImportResult<()>;

    async fn disconnect(self) -> ImportResult<()>;
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub server_url: String,
    pub calendar_url: String,
    pub credentials: Credentials,
    pub csv_path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub uploaded: usize,
    pub skipped: usize,
}

/// Progress messages sent from the worker to the form.
#[derive(Debug)]
pub enum ImportMessage {
    Connected,
    Loaded { rows: usize },
    Uploaded { row: usize, summary: String },
    RowFailed { row: usize, error: ImportError },
    Warning(ImportError),
    Failed(ImportError),
    Finished(ImportReport),
}

/// Run one import. Fatal errors are returned; row-level errors and the
/// logout warning are only reported through `progress`.
pub async fn run_import<C: CalendarConnector>(
    connector: &C,
    job: &ImportJob,
    rules: &TitleRules,
    progress: &Sender<ImportMessage>,
) -> ImportResult<ImportReport> {
    let Credentials { username, password } = &job.credentials;

    info!("Connecting to {} as {}", job.server_url, username);
    let session = connector
        .connect(&job.server_url, username, password)
        .await?;
    send(progress, ImportMessage::Connected);

    let prepared = prepare(&session, job).await;
    let (calendar, table) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            if let Err(logout) = session.disconnect().await {
                debug!("Ignoring logout failure after fatal error: {logout}");
            }
            return Err(e);
        }
    };
    send(progress, ImportMessage::Loaded { rows: table.len() });
    info!("Loaded {} rows from {}", table.len(), job.csv_path.display());

    if table.is_empty() {
        let warning = ImportError::DataLoad(format!(
            "{} enthält keine Datenzeilen",
            job.csv_path.display()
        ));
        warn!("{warning}");
        send(progress, ImportMessage::Warning(warning));
    }

    let mut report = ImportReport::default();

    for row in table.rows() {
        let event = match build_event(&row, rules) {
            Ok(event) => event,
            Err(error) => {
                warn!("Skipping row {}: {error}", row.number);
                report.skipped += 1;
                send(progress, ImportMessage::RowFailed { row: row.number, error });
                continue;
            }
        };

        match session.upload(&calendar, &event).await {
            Ok(()) => {
                debug!("Uploaded row {}: {} at {}", row.number, event.summary, event.start);
                report.uploaded += 1;
                send(
                    progress,
                    ImportMessage::Uploaded {
                        row: row.number,
                        summary: event.summary,
                    },
                );
            }
            Err(error) => {
                warn!("Upload of row {} failed: {error}", row.number);
                report.skipped += 1;
                send(progress, ImportMessage::RowFailed { row: row.number, error });
            }
        }
    }

    if let Err(error) = session.disconnect().await {
        warn!("{error}");
        send(progress, ImportMessage::Warning(error));
    }

    info!(
        "Import finished: {} uploaded, {} skipped",
        report.uploaded, report.skipped
    );
    Ok(report)
}

async fn prepare<S: CalendarSession>(
    session: &S,
    job: &ImportJob,
) -> ImportResult<(CalendarHandle, crate::csv::Table)> {
    let calendar = session.resolve_calendar(&job.calendar_url).await?;
    let table = load_and_clean(&job.csv_path)?;
    table.require_columns(&REQUIRED_COLUMNS)?;
    Ok((calendar, table))
}

fn send(progress: &Sender<ImportMessage>, message: ImportMessage) {
    // The form may have gone away; the import still runs to completion.
    let _ = progress.send(message);
}
