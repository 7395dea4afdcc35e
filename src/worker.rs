//! Runs an import on a background thread.
//!
//! The worker owns a single-threaded tokio runtime for the CalDAV requests
//! and reports back over an `mpsc` channel. The channel closes when the
//! worker is done, after exactly one `Finished` or `Failed` message.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use kerio_import_core::error::ImportError;
use kerio_import_core::event::TitleRules;
use kerio_import_core::import::{CalendarConnector, ImportJob, ImportMessage, run_import};
use tracing::error;

pub fn spawn_import<C>(
    connector: C,
    job: ImportJob,
    rules: TitleRules,
) -> Result<(JoinHandle<()>, Receiver<ImportMessage>)>
where
    C: CalendarConnector + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let handle = thread::Builder::new()
        .name("import".to_string())
        .spawn(move || run_worker(connector, job, rules, tx))
        .context("Failed to start import worker")?;

    Ok((handle, rx))
}

fn run_worker<C: CalendarConnector>(
    connector: C,
    job: ImportJob,
    rules: TitleRules,
    tx: Sender<ImportMessage>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = tx.send(runtime_failure(e));
            return;
        }
    };

    let outcome = runtime.block_on(run_import(&connector, &job, &rules, &tx));

    let message = match outcome {
        Ok(report) => ImportMessage::Finished(report),
        Err(e) => {
            error!("Import aborted: {e}");
            ImportMessage::Failed(e)
        }
    };
    let _ = tx.send(message);
}

fn runtime_failure(e: std::io::Error) -> ImportMessage {
    error!("Failed to start async runtime: {e}");
    ImportMessage::Failed(ImportError::Runtime(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Level, Notification, notification_for};
    use kerio_import_core::credentials::Credentials;
    use kerio_import_core::error::ImportResult;
    use kerio_import_core::event::EventRecord;
    use kerio_import_core::import::{CalendarHandle, CalendarSession};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingConnector {
        uploads: Arc<Mutex<Vec<EventRecord>>>,
        reject_login: bool,
    }

    struct RecordingSession {
        uploads: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl CalendarConnector for RecordingConnector {
        type Session = RecordingSession;

        async fn connect(&self, _: &str, _: &str, _: &str) -> ImportResult<RecordingSession> {
            if self.reject_login {
                return Err(ImportError::Connection("401 Unauthorized".into()));
            }
            Ok(RecordingSession {
                uploads: self.uploads.clone(),
            })
        }
    }

    impl CalendarSession for RecordingSession {
        async fn resolve_calendar(&self, calendar_url: &str) -> ImportResult<CalendarHandle> {
            Ok(CalendarHandle {
                url: calendar_url.to_string(),
                href: "/caldav/max/kalender/".to_string(),
            })
        }

        async fn upload(&self, _: &CalendarHandle, event: &EventRecord) -> ImportResult<()> {
            self.uploads.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn disconnect(self) -> ImportResult<()> {
            Ok(())
        }
    }

    fn job_with_csv(dir: &TempDir, csv: &str) -> ImportJob {
        let csv_path = dir.path().join("dienstplan.csv");
        std::fs::write(&csv_path, csv).unwrap();
        ImportJob {
            server_url: "https://cal.example.org/caldav/".into(),
            calendar_url: "https://cal.example.org/caldav/max/kalender/".into(),
            credentials: Credentials::new("max", "secret"),
            csv_path,
        }
    }

    fn collect(
        connector: RecordingConnector,
        job: ImportJob,
    ) -> Vec<ImportMessage> {
        let (handle, rx) = spawn_import(connector, job, TitleRules::default()).unwrap();
        let messages: Vec<ImportMessage> = rx.into_iter().collect();
        handle.join().unwrap();
        messages
    }

    #[test]
    fn test_three_rows_with_bad_time_end_in_success() {
        let dir = TempDir::new().unwrap();
        let job = job_with_csv(
            &dir,
            "\u{feff}Objekt;Mitarbeiter;Datum;Von;Bis\n\
PRO NSL;Max;15.03.2024;08:00:00;16:30:00\n\
PRO NSL;Max;16.03.2024;08:00;16:30:00\n\
PRO Mitarbeiter;Max;17.03.2024;09:00:00;17:00:00\n",
        );
        let connector = RecordingConnector::default();

        let messages = collect(connector.clone(), job);

        assert_eq!(connector.uploads.lock().unwrap().len(), 2);

        let notifications: Vec<Notification> =
            messages.iter().filter_map(notification_for).collect();
        assert_eq!(notifications.len(), 2, "{:?}", notifications);
        assert_eq!(notifications[0].title, "Datumsfehler");
        assert_eq!(notifications[0].level, Level::Error);
        assert_eq!(notifications[1], Notification::success());
    }

    #[test]
    fn test_rejected_login_reports_single_failure() {
        let dir = TempDir::new().unwrap();
        let job = job_with_csv(&dir, "Objekt;Mitarbeiter;Datum;Von;Bis\n");
        let connector = RecordingConnector {
            reject_login: true,
            ..Default::default()
        };

        let messages = collect(connector.clone(), job);

        assert_eq!(messages.len(), 1);
        assert!(matches!(
            messages[0],
            ImportMessage::Failed(ImportError::Connection(_))
        ));
        assert!(connector.uploads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_event_times_reach_the_session() {
        let dir = TempDir::new().unwrap();
        let job = job_with_csv(
            &dir,
            "Objekt;Mitarbeiter;Datum;Von;Bis\n=\"Kinderklinik SEP\";=\" Erika \";=\"15.03.2024\";=\"08:00:00\";=\"16:30:00\"\n",
        );
        let connector = RecordingConnector::default();

        collect(connector.clone(), job);

        let uploads = connector.uploads.lock().unwrap();
        let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(uploads[0].summary, "ProSi: VKJK");
        assert_eq!(uploads[0].description, "Mitarbeiter: Erika");
        assert_eq!(uploads[0].start, day.and_hms_opt(8, 0, 0).unwrap());
        assert_eq!(uploads[0].end, day.and_hms_opt(16, 30, 0).unwrap());
    }

    #[test]
    fn test_runtime_start_failure_is_not_a_connection_error() {
        let message = runtime_failure(std::io::Error::other("no threads"));

        assert!(matches!(
            message,
            ImportMessage::Failed(ImportError::Runtime(_))
        ));
        let notification = notification_for(&message).unwrap();
        assert_eq!(notification.level, Level::Error);
        assert_eq!(notification.title, "Startfehler");
        assert!(notification.message.contains("no threads"));
    }
}
