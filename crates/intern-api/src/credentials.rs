//! Persisted credential pair
//!
//! One JSON file holds the access and refresh token pair for the current
//! session. Writes go through a temp file in the same directory followed
//! by a rename, so a crash can never leave a torn pair on disk, and a
//! tokio `Mutex` serializes mutation from concurrent request handlers.
//! The file is read once when the store opens; afterwards the in-memory
//! copy is authoritative and the file tracks it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// File name used for the scratch copy during an atomic write.
fn temp_file_name() -> String {
    format!(".auth_tokens.tmp.{}", std::process::id())
}

/// Errors from credential persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("credential serialization error: {0}")]
    Serialize(String),
}

/// The access and refresh token pair issued at login.
///
/// Both halves travel together: persistence writes them as one record,
/// and a record missing either half is treated as no session at all.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    /// Both halves present and non-empty.
    pub(crate) fn is_complete(&self) -> bool {
        !self.access.is_empty() && !self.refresh.is_empty()
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Single-pair credential store backed by one JSON file.
pub struct CredentialStore {
    path: PathBuf,
    state: Mutex<Option<TokenPair>>,
}

impl CredentialStore {
    /// Open the store, reading whatever pair the file currently holds.
    ///
    /// A missing file means no session. An unreadable or partial file is
    /// logged and treated the same way rather than failing startup; the
    /// next login overwrites it.
    pub async fn load(path: PathBuf) -> Self {
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<TokenPair>(&contents) {
                Ok(pair) if pair.is_complete() => {
                    info!(path = %path.display(), "loaded stored session");
                    Some(pair)
                }
                Ok(_) => {
                    warn!(path = %path.display(), "credential file holds a partial pair, ignoring it");
                    None
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "credential file is unreadable, ignoring it");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored session");
                None
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "credential file is unreadable, ignoring it");
                None
            }
        };
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Clone of the current pair, if a session exists.
    pub async fn get(&self) -> Option<TokenPair> {
        self.state.lock().await.clone()
    }

    /// Whether a pair is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Replace the stored pair and persist it.
    ///
    /// The in-memory pair is updated even when the disk write fails, so
    /// the session keeps working for this process; the caller decides
    /// whether degraded durability is worth reporting.
    pub async fn set(&self, pair: TokenPair) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let result = write_atomic(&self.path, &pair).await;
        *state = Some(pair);
        result
    }

    /// Drop the stored pair and delete the credential file. Idempotent.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        *state = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed credential file");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(format!(
                "removing credential file: {err}"
            ))),
        }
    }
}

/// Write the pair to `path` atomically: temp file in the same directory,
/// then a rename over the target. File mode 0600 on unix.
async fn write_atomic(path: &Path, pair: &TokenPair) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(pair)
        .map_err(|e| StoreError::Serialize(format!("serializing credential pair: {e}")))?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| StoreError::Io(format!("creating credential directory: {e}")))?;

    let tmp_path = dir.join(temp_file_name());
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| StoreError::Io(format!("writing temp credential file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| StoreError::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StoreError::Io(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credential pair");
    Ok(())
}
