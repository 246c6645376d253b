//! Persisted cookie blob I/O.
//!
//! One JSON file shared by both acquisition paths: the browser session
//! overwrites it after every successful navigation, the HTTP jar re-reads it
//! before every request. Absence or corruption means "no cookies"; cookie
//! persistence is an optimization, never a correctness requirement.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use super::record::PersistedCookie;
use crate::scratch;

const COOKIE_BLOB_NAME: &str = "cookies.json";

/// Handle to the on-disk cookie blob.
#[derive(Debug, Clone)]
pub struct CookieBlob {
    path: Option<PathBuf>,
}

impl CookieBlob {
    /// Place the blob under the project scratch directory. A `None` path
    /// (no usable scratch location) disables persistence entirely.
    pub fn resolve() -> Self {
        Self {
            path: scratch::resolve().map(|dir| dir.join(COOKIE_BLOB_NAME)),
        }
    }

    /// Use an explicit file path.
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A blob with no backing file. Reads see nothing, writes are dropped.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the persisted cookie list. A missing file, unreadable content,
    /// or non-list JSON all yield `None` and never propagate an error.
    pub async fn read(&self) -> Option<Vec<PersistedCookie>> {
        let path = self.path.as_ref()?;
        let raw = fs::read(path).await.ok()?;
        match serde_json::from_slice::<Vec<PersistedCookie>>(&raw) {
            Ok(cookies) => Some(cookies),
            Err(e) => {
                warn!("{} is not a cookie list, skipping: {}", path.display(), e);
                None
            }
        }
    }

    /// Overwrite the blob with `cookies`.
    pub async fn write(&self, cookies: &[PersistedCookie]) -> std::io::Result<()> {
        let Some(path) = self.path.as_ref() else {
            debug!("no scratch directory, {} cookies not persisted", cookies.len());
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(cookies).map_err(std::io::Error::other)?;
        fs::write(path, json).await
    }

    /// Delete the blob. Failures are ignored.
    pub async fn remove(&self) {
        if let Some(path) = self.path.as_ref() {
            let _ = fs::remove_file(path).await;
        }
    }
}

#[cfg(test)]
#[path = "blob_tests.rs"]
mod tests;
