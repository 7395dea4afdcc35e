//! ICS generation for uploaded events.

use chrono::NaiveDateTime;
use icalendar::{Calendar, Component, EventLike};

use crate::event::EventRecord;

const PRODID: &str = "-//kerio-import//EN";

/// Generate a VCALENDAR holding a single VEVENT for `event`.
pub fn generate_ics(event: &EventRecord, uid: &str) -> String {
    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(uid);
    ics_event.summary(&event.summary);
    ics_event.description(&event.description);

    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    // Floating times, no Z and no TZID
    ics_event.add_property("DTSTART", floating(&event.start));
    ics_event.add_property("DTEND", floating(&event.end));

    cal.push(ics_event.done());
    let cal = cal.done();

    strip_ics_bloat(&cal.to_string())
}

fn floating(dt: &NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
