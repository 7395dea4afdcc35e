//! Credential storage for the Kerio login.
//!
//! Stores username + password in plaintext at:
//!   ~/.config/kerio-import/credentials.toml
//!
//! ```toml
//! [Kerio]
//! Username = "max"
//! Password = "secret"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::APP_NAME;
use crate::error::{ImportError, ImportResult};

/// Username/password pair for the calendar server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct CredentialFile {
    #[serde(rename = "Kerio", default, skip_serializing_if = "Option::is_none")]
    kerio: Option<KerioSection>,
}

#[derive(Serialize, Deserialize, Default)]
struct KerioSection {
    #[serde(rename = "Username", default)]
    username: String,
    #[serde(rename = "Password", default)]
    password: String,
}

/// Reads and writes the credential file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    /// Store at the platform config directory.
    pub fn default_location() -> ImportResult<Self> {
        let path = dirs::config_dir()
            .ok_or_else(|| ImportError::Config("Could not determine config directory".into()))?
            .join(APP_NAME)
            .join("credentials.toml");

        Ok(CredentialStore { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored pair. Absent file, section or keys yield empty strings.
    pub fn load(&self) -> ImportResult<Credentials> {
        if !self.path.exists() {
            return Ok(Credentials::default());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            ImportError::Config(format!(
                "Failed to read credentials from {}: {e}",
                self.path.display()
            ))
        })?;

        let file: CredentialFile = toml::from_str(&contents).map_err(|e| {
            ImportError::Config(format!(
                "Failed to parse credentials from {}: {e}",
                self.path.display()
            ))
        })?;

        Ok(file
            .kerio
            .map(|section| Credentials::new(section.username, section.password))
            .unwrap_or_default())
    }

    /// Overwrite the file with the given pair.
    pub fn save(&self, username: &str, password: &str) -> ImportResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ImportError::Config(format!(
                        "Failed to create config directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let file = CredentialFile {
            kerio: Some(KerioSection {
                username: username.to_string(),
                password: password.to_string(),
            }),
        };
        let contents = toml::to_string_pretty(&file)
            .map_err(|e| ImportError::Config(format!("Failed to serialize credentials: {e}")))?;

        std::fs::write(&self.path, contents).map_err(|e| {
            ImportError::Config(format!(
                "Failed to write credentials to {}: {e}",
                self.path.display()
            ))
        })?;

        // Owner-only, the file holds a plaintext password
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    ImportError::Config(format!(
                        "Failed to set permissions on {}: {e}",
                        self.path.display()
                    ))
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("credentials.toml"))
    }

    #[test]
    fn test_load_without_file_returns_empty_pair() {
        let dir = TempDir::new().unwrap();
        let creds = store_in(&dir).load().unwrap();
        assert_eq!(creds, Credentials::new("", ""));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save("max.mustermann", "p\"a=ss;wörd").unwrap();
        let creds = store.load().unwrap();

        assert_eq!(creds.username, "max.mustermann");
        assert_eq!(creds.password, "p\"a=ss;wörd");
    }

    #[test]
    fn test_save_overwrites_previous_pair() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save("first", "one").unwrap();
        store.save("second", "two").unwrap();

        assert_eq!(store.load().unwrap(), Credentials::new("second", "two"));
    }

    #[test]
    fn test_saved_file_uses_kerio_section() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("max", "secret").unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("[Kerio]"), "got:\n{}", contents);
        assert!(contents.contains("Username = \"max\""), "got:\n{}", contents);
        assert!(contents.contains("Password = \"secret\""), "got:\n{}", contents);
    }

    #[test]
    fn test_missing_section_or_keys_yield_empty_strings() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::fs::write(store.path(), "[Other]\nKey = \"value\"\n").unwrap();
        assert_eq!(store.load().unwrap(), Credentials::default());

        std::fs::write(store.path(), "[Kerio]\nUsername = \"max\"\n").unwrap();
        assert_eq!(store.load().unwrap(), Credentials::new("max", ""));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "[Kerio\nUsername = ").unwrap();

        assert!(matches!(store.load(), Err(ImportError::Config(_))));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nested").join("credentials.toml"));

        store.save("max", "secret").unwrap();
        assert!(store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("max", "secret").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
