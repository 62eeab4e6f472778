use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tmp names must be unique per write: concurrent targeted fetches can
/// both receive a bundle carrying the same file and write it at once.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Per-project sync record. Absence means the project was never synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// Unix epoch milliseconds of the last full sync.
    pub last_synced_at_ms: u64,

    /// Number of files written by that sync, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
}

impl CacheMeta {
    pub fn now(file_count: Option<usize>) -> Self {
        let last_synced_at_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            last_synced_at_ms,
            file_count,
        }
    }
}

/// On-disk cache of exported project documents, keyed by `(project, file_key)`.
///
/// Layout: `<root>/<project>/files/<encoded-key>.yaml` plus a per-project
/// `meta.json`. The root is explicit configuration; nothing here reads
/// ambient state. Reads never mutate storage. Last write wins; callers are
/// expected to be the single writer for a given key.
#[derive(Clone, Debug)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one file. Idempotent; fails only on fatal storage I/O.
    pub async fn write(&self, project_id: &str, file_key: &str, content: &str) -> Result<()> {
        let path = paths::file_path(&self.root, project_id, file_key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension(format!(
            "yaml.{}.tmp",
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, content).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        log::debug!("cached {project_id}/{file_key} ({} bytes)", content.len());
        Ok(())
    }

    /// Batched write. No rollback: on a fatal error, entries already
    /// committed stay committed and the error propagates from that point.
    pub async fn write_bulk(&self, project_id: &str, entries: &[(String, String)]) -> Result<()> {
        for (file_key, content) in entries {
            self.write(project_id, file_key, content).await?;
        }
        log::info!("cached {} files for project {project_id}", entries.len());
        Ok(())
    }

    /// Read one file. A missing entry is `None`, never an error.
    pub async fn read(&self, project_id: &str, file_key: &str) -> Result<Option<String>> {
        let path = paths::file_path(&self.root, project_id, file_key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("cache miss for {project_id}/{file_key}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Read the project's sync record, if it has ever synced.
    pub async fn meta(&self, project_id: &str) -> Result<Option<CacheMeta>> {
        let path = paths::meta_path(&self.root, project_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Overwrite the project's sync record.
    pub async fn write_meta(&self, project_id: &str, meta: &CacheMeta) -> Result<()> {
        let path = paths::meta_path(&self.root, project_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(meta)?;
        tokio::fs::write(&path, raw).await?;
        Ok(())
    }

    /// Enumerate cached file keys, optionally prefix-filtered, sorted.
    pub async fn list_keys(&self, project_id: &str, prefix: Option<&str>) -> Result<Vec<String>> {
        let dir = paths::files_dir(&self.root, project_id);
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(key) = paths::key_from_file_name(&name) else {
                continue;
            };
            if let Some(prefix) = prefix {
                if !key.starts_with(prefix) {
                    continue;
                }
            }
            keys.push(key);
        }
        keys.sort();
        Ok(keys)
    }

    /// Remove one cached file, or the whole project (files and meta) when
    /// no key is given. Removing something already absent is not an error.
    pub async fn invalidate(&self, project_id: &str, file_key: Option<&str>) -> Result<()> {
        match file_key {
            Some(file_key) => {
                let path = paths::file_path(&self.root, project_id, file_key);
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => Ok(()),
                    Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
            None => {
                let dir = paths::project_dir(&self.root, project_id);
                match tokio::fs::remove_dir_all(&dir).await {
                    Ok(()) => {
                        log::info!("invalidated project cache {project_id}");
                        Ok(())
                    }
                    Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cache(temp: &TempDir) -> FileCache {
        FileCache::new(temp.path())
    }

    #[tokio::test]
    async fn read_of_missing_key_is_none() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        let got = cache.read("proj", "folders").await.expect("read");
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        cache
            .write("proj", "folders", "rootFolders: []")
            .await
            .expect("write");
        let got = cache.read("proj", "folders").await.expect("read");
        assert_eq!(got.as_deref(), Some("rootFolders: []"));
    }

    #[tokio::test]
    async fn write_is_last_write_wins() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        cache.write("proj", "k", "one").await.expect("write");
        cache.write("proj", "k", "two").await.expect("rewrite");
        let got = cache.read("proj", "k").await.expect("read");
        assert_eq!(got.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn write_bulk_keeps_committed_entries_on_a_fatal_error() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);

        // Squat a directory on the second entry's target path so its
        // rename fails mid-batch.
        let squatted = crate::paths::file_path(temp.path(), "proj", "b");
        std::fs::create_dir_all(&squatted).expect("squat");

        let entries = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ];
        let result = cache.write_bulk("proj", &entries).await;
        assert!(result.is_err(), "mid-batch failure must propagate");

        // No rollback: the entry before the failure stays committed, the
        // one after it was never attempted.
        assert_eq!(
            cache.read("proj", "a").await.expect("read").as_deref(),
            Some("1")
        );
        assert_eq!(cache.read("proj", "c").await.expect("read"), None);
    }

    #[tokio::test]
    async fn concurrent_writes_to_one_key_all_succeed() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);

        let mut join = tokio::task::JoinSet::new();
        for i in 0..8 {
            let cache = cache.clone();
            join.spawn(async move { cache.write("proj", "shared", &format!("v{i}")).await });
        }
        while let Some(joined) = join.join_next().await {
            joined.expect("join").expect("write");
        }

        let got = cache
            .read("proj", "shared")
            .await
            .expect("read")
            .expect("present");
        assert!(got.starts_with('v'), "got {got:?}");
    }

    #[tokio::test]
    async fn list_keys_honors_prefix_and_sorts() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        let entries = vec![
            ("Scaffold_b".to_string(), "b".to_string()),
            ("Scaffold_a".to_string(), "a".to_string()),
            ("folders".to_string(), "f".to_string()),
        ];
        cache.write_bulk("proj", &entries).await.expect("bulk");

        let all = cache.list_keys("proj", None).await.expect("list");
        assert_eq!(all, vec!["Scaffold_a", "Scaffold_b", "folders"]);

        let pages = cache
            .list_keys("proj", Some("Scaffold_"))
            .await
            .expect("list prefixed");
        assert_eq!(pages, vec!["Scaffold_a", "Scaffold_b"]);
    }

    #[tokio::test]
    async fn list_keys_of_unknown_project_is_empty() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        let keys = cache.list_keys("nobody", None).await.expect("list");
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn projects_are_isolated() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        cache.write("alpha", "k", "alpha").await.expect("write");
        cache.write("beta", "k", "beta").await.expect("write");

        assert_eq!(
            cache.read("alpha", "k").await.expect("read").as_deref(),
            Some("alpha")
        );
        assert_eq!(
            cache.read("beta", "k").await.expect("read").as_deref(),
            Some("beta")
        );
    }

    #[tokio::test]
    async fn hostile_keys_stay_inside_the_project_dir() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        cache
            .write("proj", "../escape", "nope")
            .await
            .expect("write");
        let keys = cache.list_keys("proj", None).await.expect("list");
        assert_eq!(keys, vec!["../escape"]);
        assert!(!temp.path().join("escape.yaml").exists());
    }

    #[tokio::test]
    async fn meta_is_absent_until_written() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        assert_eq!(cache.meta("proj").await.expect("meta"), None);

        let meta = CacheMeta {
            last_synced_at_ms: 1_700_000_000_000,
            file_count: Some(12),
        };
        cache.write_meta("proj", &meta).await.expect("write meta");
        assert_eq!(cache.meta("proj").await.expect("meta"), Some(meta));
    }

    #[tokio::test]
    async fn invalidate_single_key_keeps_the_rest() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        cache.write("proj", "a", "1").await.expect("write");
        cache.write("proj", "b", "2").await.expect("write");

        cache.invalidate("proj", Some("a")).await.expect("drop a");
        assert_eq!(cache.read("proj", "a").await.expect("read"), None);
        assert_eq!(
            cache.read("proj", "b").await.expect("read").as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn invalidate_project_removes_files_and_meta() {
        let temp = TempDir::new().expect("tempdir");
        let cache = cache(&temp);
        cache.write("proj", "a", "1").await.expect("write");
        cache
            .write_meta("proj", &CacheMeta::now(Some(1)))
            .await
            .expect("meta");

        cache.invalidate("proj", None).await.expect("drop project");
        assert_eq!(cache.read("proj", "a").await.expect("read"), None);
        assert_eq!(cache.meta("proj").await.expect("meta"), None);

        // Invalidating again is a no-op, not an error.
        cache.invalidate("proj", None).await.expect("idempotent");
    }
}
