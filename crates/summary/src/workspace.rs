use crate::api::{ProjectApi, Validation};
use crate::assembler::{self, NodeFetch};
use crate::error::{Result, SummaryError};
use crate::types::PageSummary;
use pagelens_archive::decode_archive;
use pagelens_outline::{map_folders, walk_outline, OutlineNode, UNKNOWN_KEY};
use pagelens_store::{CacheMeta, FileCache};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// File key of the folders document within every project.
pub const FOLDERS_FILE_KEY: &str = "folders";

/// Suffix distinguishing a page's widget-tree-outline document from the
/// page document itself.
pub const OUTLINE_KEY_SUFFIX: &str = "-outline";

#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Root directory of the on-disk cache. Explicit, never ambient.
    pub cache_root: PathBuf,

    /// Per-node fetches run in batches of this size; a batch fully settles
    /// before the next starts, which is what keeps the remote rate limit
    /// honest.
    pub batch_size: usize,

    /// Extra attempts for a failed node fetch before it is marked degraded.
    pub node_fetch_retries: u32,
}

impl WorkspaceConfig {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            batch_size: 10,
            node_fetch_retries: 0,
        }
    }
}

/// Facade over the remote API, the cache and the document parsers.
///
/// One instance serves one logical caller at a time; the cache assumes a
/// single concurrent writer per key. Requests run to completion: there is
/// no mid-request cancellation, and timeouts belong to the transport
/// behind [`ProjectApi`].
#[derive(Clone)]
pub struct ProjectWorkspace {
    api: Arc<dyn ProjectApi>,
    cache: FileCache,
    config: WorkspaceConfig,
}

impl ProjectWorkspace {
    pub fn new(api: Arc<dyn ProjectApi>, config: WorkspaceConfig) -> Self {
        let cache = FileCache::new(&config.cache_root);
        Self { api, cache, config }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Cached file content, or `None` when the key was never cached.
    pub async fn get_cached_file(
        &self,
        project_id: &str,
        file_key: &str,
    ) -> Result<Option<String>> {
        Ok(self.cache.read(project_id, file_key).await?)
    }

    /// Cached keys for a project, optionally prefix-filtered.
    pub async fn list_cached_keys(
        &self,
        project_id: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>> {
        Ok(self.cache.list_keys(project_id, prefix).await?)
    }

    /// Fetch the whole project bundle, cache every file and stamp the sync
    /// record. Returns the number of files cached.
    pub async fn sync_project(&self, project_id: &str) -> Result<usize> {
        let envelope = self.get_files(project_id, None).await?;
        let entries: Vec<(String, String)> = self
            .decode(project_id, &envelope)?
            .into_iter()
            .collect();
        self.cache.write_bulk(project_id, &entries).await?;
        self.cache
            .write_meta(project_id, &CacheMeta::now(Some(entries.len())))
            .await?;
        Ok(entries.len())
    }

    /// Cached content for a key, fetching and caching it on a miss.
    ///
    /// A targeted fetch may return a bundle with more than the requested
    /// file; everything received is cached. A bundle that still lacks the
    /// requested key is a [`SummaryError::NotFound`].
    pub async fn ensure_cached(&self, project_id: &str, file_key: &str) -> Result<String> {
        if let Some(content) = self.cache.read(project_id, file_key).await? {
            return Ok(content);
        }

        let envelope = self.get_files(project_id, Some(file_key)).await?;
        let entries: Vec<(String, String)> = self
            .decode(project_id, &envelope)?
            .into_iter()
            .collect();
        self.cache.write_bulk(project_id, &entries).await?;

        entries
            .into_iter()
            .find(|(key, _)| key.as_str() == file_key)
            .map(|(_, content)| content)
            .ok_or_else(|| SummaryError::NotFound {
                project_id: project_id.to_string(),
                file_key: file_key.to_string(),
            })
    }

    /// Remote file-key listing, useful before a selective fetch.
    pub async fn list_remote_files(&self, project_id: &str) -> Result<Vec<String>> {
        self.api
            .list_files(project_id)
            .await
            .map_err(|err| SummaryError::Api {
                project_id: project_id.to_string(),
                message: err.0,
            })
    }

    /// Opaque pass/fail verdict from the remote validator. Semantic
    /// validation of widget trees lives entirely on the remote side.
    pub async fn validate_file(
        &self,
        project_id: &str,
        file_key: &str,
        content: &str,
    ) -> Result<Validation> {
        self.api
            .validate(project_id, file_key, content)
            .await
            .map_err(|err| SummaryError::Api {
                project_id: project_id.to_string(),
                message: err.0,
            })
    }

    /// Push edited files to the remote, then refresh their cache entries so
    /// later reads see what was sent.
    pub async fn push_update(
        &self,
        project_id: &str,
        files: HashMap<String, String>,
    ) -> Result<serde_json::Value> {
        let result = self
            .api
            .update(project_id, files.clone())
            .await
            .map_err(|err| SummaryError::Api {
                project_id: project_id.to_string(),
                message: err.0,
            })?;
        let entries: Vec<(String, String)> = files.into_iter().collect();
        self.cache.write_bulk(project_id, &entries).await?;
        Ok(result)
    }

    /// Build the complete summary of one page: page facts plus the
    /// annotated widget tree.
    ///
    /// Per-node documents are fetched in fixed-size batches; a node whose
    /// fetch fails is summarized with an inline error marker and never
    /// aborts its siblings. A page with zero discoverable nodes still
    /// yields a valid summary.
    pub async fn summarize_page(
        &self,
        project_id: &str,
        page_file_key: &str,
    ) -> Result<PageSummary> {
        let folder_map = match self.ensure_cached(project_id, FOLDERS_FILE_KEY).await {
            Ok(text) => map_folders(&text).unwrap_or_else(|err| {
                log::warn!("folders document of {project_id} is unreadable: {err}");
                HashMap::new()
            }),
            Err(SummaryError::NotFound { .. }) => HashMap::new(),
            Err(err) => return Err(err),
        };
        let folder = folder_map.get(page_file_key).cloned();

        let page_text = self.ensure_cached(project_id, page_file_key).await?;
        let meta = assembler::page_meta(page_file_key, folder, &page_text);

        let outline_key = format!("{page_file_key}{OUTLINE_KEY_SUFFIX}");
        let outline_text = self.ensure_cached(project_id, &outline_key).await?;
        let outline = walk_outline(&outline_text)?;

        let keys = collect_node_keys(&outline);
        log::debug!(
            "summarizing {project_id}/{page_file_key}: {} node documents",
            keys.len()
        );
        let docs = self.fetch_node_docs(project_id, &keys).await;
        let tree = assembler::build_summary(&outline, &docs);
        Ok(PageSummary { meta, tree })
    }

    fn decode(
        &self,
        project_id: &str,
        envelope: &serde_json::Value,
    ) -> Result<std::collections::BTreeMap<String, String>> {
        decode_archive(envelope).map_err(|source| SummaryError::Decode {
            project_id: project_id.to_string(),
            source,
        })
    }

    async fn get_files(
        &self,
        project_id: &str,
        file_key: Option<&str>,
    ) -> Result<serde_json::Value> {
        self.api
            .get_files(project_id, file_key)
            .await
            .map_err(|err| SummaryError::Api {
                project_id: project_id.to_string(),
                message: err.0,
            })
    }

    /// Fetch node documents in batches of `batch_size`. Each batch fully
    /// settles before the next starts; results land positionally by batch
    /// index, so output order never depends on completion order.
    async fn fetch_node_docs(
        &self,
        project_id: &str,
        keys: &[String],
    ) -> HashMap<String, NodeFetch> {
        let mut docs = HashMap::with_capacity(keys.len());
        for batch in keys.chunks(self.config.batch_size.max(1)) {
            let mut join = JoinSet::new();
            for (index, key) in batch.iter().enumerate() {
                let workspace = self.clone();
                let project_id = project_id.to_string();
                let key = key.clone();
                join.spawn(async move {
                    let fetch = workspace.fetch_with_retries(&project_id, &key).await;
                    (index, fetch)
                });
            }

            let mut slots: Vec<Option<NodeFetch>> = vec![None; batch.len()];
            while let Some(joined) = join.join_next().await {
                match joined {
                    Ok((index, fetch)) => slots[index] = Some(fetch),
                    Err(err) => log::warn!("node fetch task failed: {err}"),
                }
            }
            for (index, slot) in slots.into_iter().enumerate() {
                let fetch = slot.unwrap_or_else(|| Err("fetch task aborted".to_string()));
                docs.insert(batch[index].clone(), fetch);
            }
        }
        docs
    }

    async fn fetch_with_retries(&self, project_id: &str, file_key: &str) -> NodeFetch {
        let mut attempt = 0;
        loop {
            match self.ensure_cached(project_id, file_key).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.config.node_fetch_retries => {
                    attempt += 1;
                    log::debug!(
                        "retrying {project_id}/{file_key} (attempt {attempt}) after: {err}"
                    );
                }
                Err(err) => return Err(err.to_string()),
            }
        }
    }
}

/// Distinct node keys of an outline in level order, skipping sentinel
/// keys, which have no document of their own.
fn collect_node_keys(outline: &OutlineNode) -> Vec<String> {
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    let mut queue: Vec<&OutlineNode> = vec![outline];
    let mut cursor = 0;
    while cursor < queue.len() {
        let node = queue[cursor];
        if node.key != UNKNOWN_KEY && seen.insert(node.key.as_str()) {
            keys.push(node.key.clone());
        }
        queue.extend(node.children.iter());
        cursor += 1;
    }
    keys
}
