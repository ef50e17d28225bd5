use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::Token;

/// Storage abstraction for persisted OAuth tokens.
pub trait TokenStore: Send + Sync {
    fn load(&self, provider: &str, profile: &str) -> Result<Option<Token>, AuthError>;
    fn save(&self, provider: &str, profile: &str, token: &Token) -> Result<(), AuthError>;
    /// Remove a stored token. Removing a missing token is not an error.
    fn clear(&self, provider: &str, profile: &str) -> Result<(), AuthError>;
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_maestro_dir()
    }
}

/// File-backed token store using one TOML file per provider/profile.
///
/// # Example
/// ```no_run
/// use maestro::auth::{FileTokenStore, Token, TokenStore};
///
/// let store = FileTokenStore::new_default();
/// let token = Token::with_lifetime("access", Some("refresh".to_string()), Some(3600));
/// store.save("spotify", "default", &token)?;
/// # Ok::<(), maestro::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_maestro_dir(),
        }
    }

    /// Location of the token file for a provider/profile pair.
    pub fn token_path(&self, provider: &str, profile: &str) -> PathBuf {
        let provider = normalize_label(provider);
        let profile = normalize_label(profile);
        let name = if profile == "default" {
            format!("{provider}.toml")
        } else {
            format!("{provider}.{profile}.toml")
        };
        self.base_dir.join(name)
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, provider: &str, profile: &str) -> Result<Option<Token>, AuthError> {
        let path = self.token_path(provider, profile);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: TokenFile = toml::from_str(&raw)?;
        Ok(Some(file.token))
    }

    fn save(&self, provider: &str, profile: &str, token: &Token) -> Result<(), AuthError> {
        let path = self.token_path(provider, profile);
        Self::ensure_parent(&path)?;
        let file = TokenFile {
            version: 1,
            provider: provider.to_string(),
            profile: profile.to_string(),
            token: token.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self, provider: &str, profile: &str) -> Result<(), AuthError> {
        let path = self.token_path(provider, profile);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    version: u32,
    provider: String,
    profile: String,
    token: Token,
    saved_at: DateTime<Utc>,
}

fn default_maestro_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".maestro"))
        .unwrap_or_else(|| PathBuf::from(".maestro"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileTokenStore) {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(TokenStoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    #[test]
    fn saved_token_loads_back() {
        let (_dir, store) = temp_store();
        let token = Token::with_lifetime("access", Some("refresh".to_string()), Some(3600));
        store.save("spotify", "default", &token).unwrap();
        let loaded = store.load("spotify", "default").unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn clear_deletes_the_token_file() {
        let (_dir, store) = temp_store();
        let token = Token::with_lifetime("access", None, None);
        store.save("spotify", "default", &token).unwrap();
        let path = store.token_path("spotify", "default");
        assert!(path.exists());

        store.clear("spotify", "default").unwrap();

        assert!(!path.exists());
        assert!(store.load("spotify", "default").unwrap().is_none());
    }

    #[test]
    fn clearing_missing_token_is_ok() {
        let (_dir, store) = temp_store();
        assert!(store.clear("spotify", "default").is_ok());
    }

    #[test]
    fn profile_names_are_normalized_into_file_names() {
        let (dir, store) = temp_store();
        assert_eq!(
            store.token_path("Spotify", "Work Account"),
            dir.path().join("spotify.work-account.toml")
        );
        assert_eq!(store.token_path("spotify", "  "), dir.path().join("spotify.toml"));
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let (_dir, store) = temp_store();
        let path = store.token_path("spotify", "default");
        fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            store.load("spotify", "default"),
            Err(AuthError::Serialization(_))
        ));
    }
}
