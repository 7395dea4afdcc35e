//! Application configuration.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    APP_NAME, DEFAULT_CALENDAR_URL_TEMPLATE, DEFAULT_SERVER_URL, USERNAME_PLACEHOLDER,
};
use crate::error::{ImportError, ImportResult};
use crate::event::TitleRules;

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_calendar_url_template() -> String {
    DEFAULT_CALENDAR_URL_TEMPLATE.to_string()
}

fn default_dialogs() -> bool {
    true
}

/// Configuration at ~/.config/kerio-import/config.toml
///
/// Every key is optional; the defaults target the Kerio Connect server the
/// importer was written for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Calendar collection URL, `{username}` is replaced by the login name.
    #[serde(default = "default_calendar_url_template")]
    pub calendar_url_template: String,

    /// Native modal dialogs (true) or terminal-only notifications (false).
    #[serde(default = "default_dialogs")]
    pub dialogs: bool,

    #[serde(default)]
    pub titles: TitleRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_url: default_server_url(),
            calendar_url_template: default_calendar_url_template(),
            dialogs: default_dialogs(),
            titles: TitleRules::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> ImportResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ImportError::Config("Could not determine config directory".into()))?
            .join(APP_NAME);

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if no config file exists yet.
    pub fn load() -> ImportResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> ImportResult<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| ImportError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ImportError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn calendar_url_for(&self, username: &str) -> String {
        self.calendar_url_template
            .replace(USERNAME_PLACEHOLDER, username)
    }

    fn validate(&self) -> ImportResult<()> {
        url::Url::parse(&self.server_url).map_err(|e| {
            ImportError::Config(format!("Invalid server_url '{}': {e}", self.server_url))
        })?;

        let sample = self.calendar_url_for("user");
        url::Url::parse(&sample).map_err(|e| {
            ImportError::Config(format!(
                "Invalid calendar_url_template '{}': {e}",
                self.calendar_url_template
            ))
        })?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ImportResult<()> {
        let contents = format!(
            "\
# kerio-import configuration

# CalDAV server used for login:
# server_url = \"{DEFAULT_SERVER_URL}\"

# Calendar that receives the events ({{username}} is replaced by the login):
# calendar_url_template = \"{DEFAULT_CALENDAR_URL_TEMPLATE}\"

# Show native dialogs (true) or print notifications to the terminal (false):
# dialogs = true

# Title rules, matched exactly against the Objekt column.
# Defining any rule replaces the built-in list.
# [[titles]]
# objekt = \"PRO NSL\"
# title = \"ProSi: NSL\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ImportError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ImportError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
