//! # Pagelens Summary
//!
//! The assembly layer: composes the cache, the archive decoder and the
//! document parsers into compact, LLM-consumable page summaries of a
//! no-code project export.
//!
//! ## Flow
//!
//! ```text
//! ProjectApi (remote, opaque)
//!     │  archive envelope (base64 + zip)
//!     ├──> decode_archive ──> FileCache (per-project, on disk)
//!     │                           │
//!     │                           ├──> map_folders   (folders document)
//!     │                           ├──> walk_outline  (tree-outline document)
//!     │                           └──> per-node documents
//!     │
//!     └──> ProjectWorkspace::summarize_page
//!              └─> PageMeta + SummaryNode tree
//! ```
//!
//! Per-node fetches run in fixed-size batches against the rate-limited
//! remote; a failed node degrades in place instead of failing the page.

mod api;
mod assembler;
mod error;
mod types;
mod workspace;

pub use api::{ApiError, ApiResult, ProjectApi, Validation};
pub use error::{Result, SummaryError};
pub use types::{ActionSummary, PageMeta, PageSummary, SummaryNode, Trigger};
pub use workspace::{ProjectWorkspace, WorkspaceConfig, FOLDERS_FILE_KEY, OUTLINE_KEY_SUFFIX};

// Re-export the leaf layers for callers that register tools over them.
pub use pagelens_archive::decode_archive;
pub use pagelens_outline::{infer_type, map_folders, resolve_value, walk_outline, OutlineNode};
pub use pagelens_store::{CacheMeta, FileCache};
