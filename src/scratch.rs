//! Project-scoped scratch directory resolution.
//!
//! Cookie state lives in a hidden `.mincer` directory next to the project
//! root, found by walking parent directories until a version-control or
//! package-manifest marker appears. When no marker exists (or the directory
//! cannot be created) the system temp dir is used instead. Resolution
//! failure degrades to "no persistence" and is never fatal.

use std::path::{Path, PathBuf};

use tracing::warn;

const SCRATCH_DIR_NAME: &str = ".mincer";

const MARKERS: &[&str] = &[".git", "Cargo.toml", "package.json"];

/// Resolve the scratch directory starting from the current working directory.
pub fn resolve() -> Option<PathBuf> {
    match std::env::current_dir() {
        Ok(cwd) => resolve_from(&cwd),
        Err(e) => {
            warn!("could not determine working directory: {}", e);
            None
        }
    }
}

/// Resolve the scratch directory walking upward from `start`.
pub fn resolve_from(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if MARKERS.iter().any(|m| current.join(m).exists()) {
            let scratch = current.join(SCRATCH_DIR_NAME);
            match std::fs::create_dir_all(&scratch) {
                Ok(()) => return Some(scratch),
                Err(e) => {
                    warn!("could not create {}: {}", scratch.display(), e);
                    break;
                }
            }
        }
        dir = current.parent();
    }

    let scratch = std::env::temp_dir().join(SCRATCH_DIR_NAME);
    match std::fs::create_dir_all(&scratch) {
        Ok(()) => Some(scratch),
        Err(e) => {
            warn!("could not create {}: {}", scratch.display(), e);
            None
        }
    }
}
