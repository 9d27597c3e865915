//! Whole-file JSON persistence for the opt-in set.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::PersistenceError;

/// Reads the stored user ids. A missing file is an empty set.
pub async fn load_user_ids(path: &Path) -> Result<HashSet<u64>, PersistenceError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content).map_err(|source| PersistenceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces the stored set. Writes a sibling temp file and renames it over
/// `path`, so a crash leaves either the old or the new contents.
pub async fn save_user_ids(path: &Path, users: &HashSet<u64>) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut sorted: Vec<u64> = users.iter().copied().collect();
    sorted.sort_unstable();
    let json = serde_json::to_string_pretty(&sorted).map_err(|source| PersistenceError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, json).await.map_err(io_err)?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "optin".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
}
