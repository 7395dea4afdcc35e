//! CalDAV uploader for kerio-import.
//!
//! Implements the core `CalendarConnector`/`CalendarSession` traits on top
//! of libdav.

mod caldav;
mod session;

pub use caldav::{event_url, url_to_href};
pub use session::{DavConnector, DavSession};
