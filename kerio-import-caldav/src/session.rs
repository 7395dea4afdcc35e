//! Authenticated CalDAV session used for one import run.

use kerio_import_core::error::{ImportError, ImportResult};
use kerio_import_core::event::EventRecord;
use kerio_import_core::ics::generate_ics;
use kerio_import_core::import::{CalendarConnector, CalendarHandle, CalendarSession};
use libdav::dav::{PutResource, mime_types};
use tracing::{debug, info};

use crate::caldav::{
    GetResourceType, KerioCalDavClient, create_caldav_client, event_url, url_to_href,
};

/// Connects to a CalDAV server with basic authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct DavConnector;

pub struct DavSession {
    caldav: KerioCalDavClient,
    username: String,
}

impl CalendarConnector for DavConnector {
    type Session = DavSession;

    async fn connect(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> ImportResult<DavSession> {
        let caldav = create_caldav_client(server_url, username, password)
            .map_err(|e| ImportError::Connection(format!("{e:#}")))?;

        // The principal lookup is the first authenticated request; it fails
        // or comes back empty when the server rejects the credentials.
        let principal = caldav
            .find_current_user_principal()
            .await
            .map_err(|e| ImportError::Connection(e.to_string()))?
            .ok_or_else(|| {
                ImportError::Connection(
                    "Anmeldung fehlgeschlagen. Benutzername und Passwort prüfen.".into(),
                )
            })?;

        info!("Authenticated as {} (principal {})", username, principal.path());

        Ok(DavSession {
            caldav,
            username: username.to_string(),
        })
    }
}

impl CalendarSession for DavSession {
    async fn resolve_calendar(&self, calendar_url: &str) -> ImportResult<CalendarHandle> {
        let href = url_to_href(calendar_url);

        let response = self
            .caldav
            .request(GetResourceType::new(&href))
            .await
            .map_err(|e| ImportError::CalendarNotFound(format!("{calendar_url} ({e})")))?;

        if !response.is_calendar {
            return Err(ImportError::CalendarNotFound(format!(
                "{calendar_url} ist keine Kalendersammlung"
            )));
        }

        debug!("Resolved calendar {}", calendar_url);
        Ok(CalendarHandle {
            url: calendar_url.to_string(),
            href,
        })
    }

    async fn upload(&self, calendar: &CalendarHandle, event: &EventRecord) -> ImportResult<()> {
        let uid = uuid::Uuid::new_v4().to_string();
        let ics_content = generate_ics(event, &uid);
        let href = url_to_href(&event_url(&calendar.url, &uid));

        // PUT with If-None-Match: * (fails if the resource exists)
        self.caldav
            .request(PutResource::new(&href).create(&ics_content, mime_types::CALENDAR))
            .await
            .map_err(|e| ImportError::Upload(e.to_string()))?;

        debug!("Created {}", href);
        Ok(())
    }

    async fn disconnect(self) -> ImportResult<()> {
        // CalDAV is stateless over HTTP; dropping the client closes its
        // pooled connections.
        debug!("Closing CalDAV session for {}", self.username);
        drop(self.caldav);
        Ok(())
    }
}
