use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Directory holding the generated `.ics` files.
///
/// Each delivery gets its own subdirectory, so concurrent deliveries of
/// same-named events never share a path and the attachment keeps the plain
/// `{event}_{guild}.ics` name. Files are kept for `retention` after their
/// last write and removed by `purge_expired`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    retention: Duration,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `contents` to `{dir}/{delivery id}/{file_name}` through a temp
    /// file, so a reader never observes a partial document.
    pub async fn write(&self, file_name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let delivery_dir = self.dir.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&delivery_dir).await?;
        let path = delivery_dir.join(file_name);
        let tmp = delivery_dir.join(format!(".{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, contents).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(path)
    }

    /// Deletes `.ics` files last modified before `now - retention`, along
    /// with delivery directories left empty. Returns how many files went.
    pub async fn purge_expired(&self, now: SystemTime) -> std::io::Result<usize> {
        let Some(cutoff) = now.checked_sub(self.retention) else {
            return Ok(0);
        };
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut delivery_dirs = Vec::new();
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                delivery_dirs.push(path);
            } else if remove_if_expired(&path, cutoff).await {
                removed += 1;
            }
        }

        for dir in delivery_dirs {
            let mut files = match fs::read_dir(&dir).await {
                Ok(files) => files,
                Err(err) => {
                    warn!(path = %dir.display(), error = %err, "cannot list delivery directory");
                    continue;
                }
            };
            let mut expired_here = 0;
            while let Some(file) = files.next_entry().await? {
                if remove_if_expired(&file.path(), cutoff).await {
                    expired_here += 1;
                }
            }
            removed += expired_here;
            // A directory with nothing expired may belong to a write in flight.
            // remove_dir only succeeds once the directory is empty.
            if expired_here > 0 {
                let _ = fs::remove_dir(&dir).await;
            }
        }
        Ok(removed)
    }
}

async fn remove_if_expired(path: &Path, cutoff: SystemTime) -> bool {
    if path.extension().and_then(|ext| ext.to_str()) != Some("ics") {
        return false;
    }
    let modified = match fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read calendar file age");
            return false;
        }
    };
    if modified >= cutoff {
        return false;
    }
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "removed expired calendar file");
            true
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to remove calendar file");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(retention: Duration) -> ArtifactStore {
        let dir = std::env::temp_dir().join(format!("eventsbot_artifacts_{}", uuid::Uuid::new_v4()));
        ArtifactStore::new(dir, retention)
    }

    #[tokio::test]
    async fn purge_only_removes_old_ics_files() {
        let store = temp_store(Duration::from_secs(60 * 60));
        let ics = store.write("party_guild.ics", "BEGIN:VCALENDAR").await.unwrap();
        let notes = store.write("notes.txt", "keep me").await.unwrap();

        let removed = store.purge_expired(SystemTime::now()).await.unwrap();
        assert_eq!(removed, 0);
        assert!(ics.exists());

        let later = SystemTime::now() + Duration::from_secs(2 * 60 * 60);
        let removed = store.purge_expired(later).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!ics.exists());
        assert!(!ics.parent().unwrap().exists());
        assert!(notes.exists());

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn purge_leaves_empty_delivery_dirs_alone() {
        let store = temp_store(Duration::from_secs(1));
        let pending = store.dir().join("pending-delivery");
        std::fs::create_dir_all(&pending).unwrap();

        let later = SystemTime::now() + Duration::from_secs(60);
        assert_eq!(store.purge_expired(later).await.unwrap(), 0);
        assert!(pending.exists());

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn purge_of_missing_dir_is_a_noop() {
        let store = temp_store(Duration::from_secs(1));
        assert_eq!(store.purge_expired(SystemTime::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn same_file_name_gets_separate_paths() {
        let store = temp_store(Duration::from_secs(60));
        let first = store.write("Game night_Guild.ics", "first").await.unwrap();
        let second = store.write("Game night_Guild.ics", "second").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first.file_name(), second.file_name());
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "second");

        let leftovers = std::fs::read_dir(first.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);

        let _ = std::fs::remove_dir_all(store.dir());
    }
}
