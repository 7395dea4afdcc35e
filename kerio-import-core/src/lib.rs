//! Core types for kerio-import.
//!
//! This crate provides everything the importer needs that does not talk to a
//! server or a terminal:
//! - `csv` for loading and normalizing spreadsheet exports
//! - `event` for mapping rows to calendar events
//! - `ics` for iCalendar generation
//! - `import` for the import workflow over abstract calendar traits

pub mod config;
pub mod constants;
pub mod credentials;
pub mod csv;
pub mod error;
pub mod event;
pub mod ics;
pub mod import;

pub use error::{ImportError, ImportResult};
pub use event::{EventRecord, TitleRule, TitleRules};
