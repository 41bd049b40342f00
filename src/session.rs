//! Bearer token storage.
//!
//! The resource client never reads ambient state: it is handed a
//! [`TokenStore`] and asks it for the current token on every call, so a
//! sign-in or sign-out takes effect on the next request.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
#[cfg(test)]
use std::sync::RwLock;

use tracing::{debug, warn};

/// Accessor for the current session token.
pub trait TokenStore: Send + Sync {
  /// The token to send, if signed in.
  fn token(&self) -> Option<String>;

  /// Replace the stored token.
  fn set_token(&self, token: &str) -> io::Result<()>;

  /// Forget the stored token (sign out).
  fn clear(&self) -> io::Result<()>;
}

/// Token persisted in a file under the data directory.
pub struct FileTokenStore {
  path: PathBuf,
}

impl FileTokenStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Token file at the default location.
  pub fn open_default() -> io::Result<Self> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no data directory"))?;

    Ok(Self::new(data_dir.join("ms-admin").join("token")))
  }
}

impl TokenStore for FileTokenStore {
  fn token(&self) -> Option<String> {
    match std::fs::read_to_string(&self.path) {
      Ok(contents) => {
        let token = contents.trim();
        (!token.is_empty()).then(|| token.to_string())
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => None,
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "failed to read token file");
        None
      }
    }
  }

  fn set_token(&self, token: &str) -> io::Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::OpenOptionsExt;
      options.mode(0o600);
    }
    let mut file = options.open(&self.path)?;
    // `mode` only applies on create; tighten a file left by an older run
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_bytes())?;
    debug!(path = %self.path.display(), "stored session token");
    Ok(())
  }

  fn clear(&self) -> io::Result<()> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e),
    }
  }
}

/// In-memory token for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryTokenStore {
  token: RwLock<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_token(token: &str) -> Self {
    Self {
      token: RwLock::new(Some(token.to_string())),
    }
  }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
  fn token(&self) -> Option<String> {
    self.token.read().ok().and_then(|t| t.clone())
  }

  fn set_token(&self, token: &str) -> io::Result<()> {
    let mut guard = self
      .token
      .write()
      .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    *guard = Some(token.to_string());
    Ok(())
  }

  fn clear(&self) -> io::Result<()> {
    let mut guard = self
      .token
      .write()
      .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    *guard = None;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_store_round_trip() {
    let store = MemoryTokenStore::new();
    assert_eq!(store.token(), None);

    store.set_token("abc").unwrap();
    assert_eq!(store.token().as_deref(), Some("abc"));

    store.clear().unwrap();
    assert_eq!(store.token(), None);
  }

  #[test]
  fn test_file_store_persists_and_clears() {
    let dir = std::env::temp_dir().join(format!("ms-admin-token-{}", std::process::id()));
    let store = FileTokenStore::new(dir.join("token"));

    assert_eq!(store.token(), None);
    store.set_token("secret\n").unwrap();
    assert_eq!(store.token().as_deref(), Some("secret"));

    // A second store on the same path sees the token
    let other = FileTokenStore::new(dir.join("token"));
    assert_eq!(other.token().as_deref(), Some("secret"));

    store.clear().unwrap();
    assert_eq!(other.token(), None);
    // Clearing twice is fine
    store.clear().unwrap();

    let _ = std::fs::remove_dir_all(dir);
  }

  #[cfg(unix)]
  #[test]
  fn test_token_file_is_private_to_the_owner() {
    use std::os::unix::fs::PermissionsExt;

    let dir = std::env::temp_dir().join(format!("ms-admin-token-mode-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("token");
    std::fs::write(&path, "stale").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let store = FileTokenStore::new(&path);
    store.set_token("secret").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    assert_eq!(store.token().as_deref(), Some("secret"));

    store.clear().unwrap();
    store.set_token("fresh").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);

    let _ = std::fs::remove_dir_all(dir);
  }
}
