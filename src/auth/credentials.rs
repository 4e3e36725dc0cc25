//! Credentials storage for the chat API key.
//!
//! The key lives in `~/.chatstream/credentials.json`. Nothing else about the
//! conversation is persisted.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".chatstream";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Stored credentials for the chat API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer API key.
    pub api_key: Option<String>,
    /// When the key was saved, as Unix timestamp (seconds since epoch).
    pub saved_at: Option<i64>,
}

impl Credentials {
    /// Create credentials holding `api_key`, stamped now.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            saved_at: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// Check if the credentials have a non-blank API key.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Manages credential storage and retrieval.
#[derive(Debug, Clone)]
pub struct CredentialsManager {
    /// Path to the credentials file.
    credentials_path: PathBuf,
}

impl CredentialsManager {
    /// Create a manager for `~/.chatstream/credentials.json`.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::with_dir(home))
    }

    /// Create a manager rooted at `base` instead of the home directory.
    pub fn with_dir(base: impl AsRef<Path>) -> Self {
        let credentials_path = base.as_ref().join(CREDENTIALS_DIR).join(CREDENTIALS_FILE);
        Self { credentials_path }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &PathBuf {
        &self.credentials_path
    }

    /// Load credentials from the credentials file.
    ///
    /// Returns default credentials if the file doesn't exist or can't be read.
    pub fn load(&self) -> Credentials {
        if !self.credentials_path.exists() {
            return Credentials::default();
        }

        let file = match File::open(&self.credentials_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Failed to open {}: {}", self.credentials_path.display(), e);
                return Credentials::default();
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(creds) => creds,
            Err(e) => {
                tracing::warn!("Ignoring unreadable credentials file: {}", e);
                Credentials::default()
            }
        }
    }

    /// Save credentials to the credentials file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self, credentials: &Credentials) -> io::Result<()> {
        if let Some(parent) = self.credentials_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.credentials_path)?;
        restrict_permissions(&file)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, credentials)?;
        writer.flush()
    }

    /// Remove the credentials file if it exists.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.credentials_path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_credentials_default() {
        let creds = Credentials::default();
        assert!(creds.api_key.is_none());
        assert!(!creds.has_api_key());
    }

    #[test]
    fn test_blank_key_is_not_a_key() {
        let creds = Credentials::with_api_key("   ");
        assert!(!creds.has_api_key());
    }

    #[test]
    fn test_credentials_manager_new() {
        // This test depends on having a home directory, which should be available
        let manager = CredentialsManager::new();
        assert!(manager.is_some());
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CredentialsManager::with_dir(temp_dir.path());
        assert_eq!(manager.load(), Credentials::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CredentialsManager::with_dir(temp_dir.path());

        let creds = Credentials::with_api_key("app-123");
        manager.save(&creds).unwrap();

        assert_eq!(manager.load(), creds);
        assert!(manager
            .credentials_path()
            .ends_with(".chatstream/credentials.json"));
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CredentialsManager::with_dir(temp_dir.path());

        manager.save(&Credentials::with_api_key("app-123")).unwrap();
        assert!(manager.credentials_path().exists());

        manager.clear().unwrap();
        assert!(!manager.credentials_path().exists());

        // Clearing again is fine
        manager.clear().unwrap();
    }

    #[test]
    fn test_load_corrupt_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CredentialsManager::with_dir(temp_dir.path());
        fs::create_dir_all(manager.credentials_path().parent().unwrap()).unwrap();
        fs::write(manager.credentials_path(), "{not json").unwrap();

        assert_eq!(manager.load(), Credentials::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let manager = CredentialsManager::with_dir(temp_dir.path());
        manager.save(&Credentials::with_api_key("k")).unwrap();

        let mode = fs::metadata(manager.credentials_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
