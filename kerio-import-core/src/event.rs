//! Mapping CSV rows to calendar events.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{
    COLUMN_BIS, COLUMN_DATUM, COLUMN_MITARBEITER, COLUMN_OBJEKT, COLUMN_VON, DATETIME_FORMAT,
};
use crate::csv::Row;
use crate::error::{ImportError, ImportResult};

/// A calendar event derived from one CSV row.
///
/// Times are naive local times and end up as floating iCalendar times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub summary: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: String,
}

/// Rewrites one `Objekt` value to an event title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRule {
    pub objekt: String,
    pub title: String,
}

impl TitleRule {
    pub fn new(objekt: impl Into<String>, title: impl Into<String>) -> Self {
        TitleRule {
            objekt: objekt.into(),
            title: title.into(),
        }
    }
}

/// Exact-match title table. Unmatched values are used as the title as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleRules(Vec<TitleRule>);

impl Default for TitleRules {
    fn default() -> Self {
        TitleRules(vec![
            TitleRule::new("PRO NSL", "ProSi: NSL"),
            TitleRule::new("PRO Mitarbeiter", "ProSi: Backoffice"),
            TitleRule::new("Kinderklinik SEP", "ProSi: VKJK"),
        ])
    }
}

impl TitleRules {
    pub fn new(rules: Vec<TitleRule>) -> Self {
        TitleRules(rules)
    }

    pub fn title_for(&self, objekt: &str) -> String {
        self.0
            .iter()
            .find(|rule| rule.objekt == objekt)
            .map(|rule| rule.title.clone())
            .unwrap_or_else(|| objekt.to_string())
    }
}

/// Parse start and end on a shared date (`DD.MM.YYYY`, `HH:MM:SS`).
pub fn parse_window(
    date: &str,
    start: &str,
    end: &str,
) -> ImportResult<(NaiveDateTime, NaiveDateTime)> {
    Ok((parse_timestamp(date, start)?, parse_timestamp(date, end)?))
}

fn parse_timestamp(date: &str, time: &str) -> ImportResult<NaiveDateTime> {
    let text = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT).map_err(|e| {
        ImportError::DateParse(format!(
            "'{text}' passt nicht zum Format 'TT.MM.JJJJ HH:MM:SS' ({e})"
        ))
    })
}

pub fn build_event(row: &Row<'_>, rules: &TitleRules) -> ImportResult<EventRecord> {
    let objekt = row.get(COLUMN_OBJEKT)?;
    let mitarbeiter = row.get(COLUMN_MITARBEITER)?;
    let (start, end) = parse_window(
        row.get(COLUMN_DATUM)?,
        row.get(COLUMN_VON)?,
        row.get(COLUMN_BIS)?,
    )?;

    Ok(EventRecord {
        summary: rules.title_for(objekt),
        start,
        end,
        description: format!("Mitarbeiter: {}", mitarbeiter.trim()),
    })
}
