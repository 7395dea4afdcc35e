pub const APP_NAME: &str = "kerio-import";

pub const DEFAULT_SERVER_URL: &str = "https://kerio1.kampmail.de/caldav/";
pub const DEFAULT_CALENDAR_URL_TEMPLATE: &str =
    "https://kerio1.kampmail.de/caldav/{username}/kalender/";

/// Placeholder in the calendar URL template replaced by the login name.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

pub const CSV_DELIMITER: u8 = b';';
pub const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub const COLUMN_OBJEKT: &str = "Objekt";
pub const COLUMN_MITARBEITER: &str = "Mitarbeiter";
pub const COLUMN_DATUM: &str = "Datum";
pub const COLUMN_VON: &str = "Von";
pub const COLUMN_BIS: &str = "Bis";

pub const REQUIRED_COLUMNS: [&str; 5] = [
    COLUMN_OBJEKT,
    COLUMN_MITARBEITER,
    COLUMN_DATUM,
    COLUMN_VON,
    COLUMN_BIS,
];
