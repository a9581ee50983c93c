use super::Result;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const CREDENTIALS_FILE_NAME: &str = "credentials.toml";

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
struct StoredToken {
    token: String,
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoredToken(<redacted>)")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct CredentialFile {
    #[serde(default)]
    identities: BTreeMap<String, StoredToken>,
}

/// Identity-to-token map kept in `credentials.toml`:
///
/// ```toml
/// [identities.octocat]
/// token = "ghp_..."
/// ```
///
/// Identity names are case-insensitive and stored lower-cased.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    file: CredentialFile,
}

impl CredentialStore {
    pub fn file_in(dir: &Path) -> PathBuf {
        dir.join(CREDENTIALS_FILE_NAME)
    }

    /// Load the store; a missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                file: CredentialFile::default(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| StorageError::FileIo {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let file = toml::from_str(&content).map_err(|e| StorageError::Parse {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self, identity: &str) -> Option<&str> {
        self.file
            .identities
            .get(&identity.to_lowercase())
            .map(|stored| stored.token.as_str())
            .filter(|token| !token.is_empty())
    }

    pub fn set_token(&mut self, identity: &str, token: &str) {
        self.file.identities.insert(
            identity.to_lowercase(),
            StoredToken {
                token: token.trim().to_string(),
            },
        );
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, identity: &str) -> bool {
        self.file
            .identities
            .remove(&identity.to_lowercase())
            .is_some()
    }

    pub fn identities(&self) -> Vec<&str> {
        self.file.identities.keys().map(String::as_str).collect()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let content = toml::to_string(&self.file).map_err(|e| StorageError::Serialize {
            what: "credentials".to_string(),
            message: e.to_string(),
        })?;
        let io_error = |source| StorageError::FileIo {
            path: self.path.to_string_lossy().to_string(),
            source,
        };

        fs::write(&self.path, content).map_err(io_error)?;
        restrict_permissions(&self.path).map_err(io_error)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
