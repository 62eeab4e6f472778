//! # Pagelens Store
//!
//! On-disk cache for exported project documents, keyed by
//! `(project, file_key)`, with a small per-project sync record.
//!
//! The cache exists so repeat inspections of the same project do not
//! re-fetch unchanged documents from the rate-limited remote API. It is a
//! plain directory tree under an explicit root:
//!
//! ```text
//! <root>/
//!     <project>/
//!         meta.json              per-project sync record
//!         files/
//!             <encoded-key>.yaml one document per cached file key
//! ```
//!
//! Reads never mutate storage; a missing entry is a normal `None`, never an
//! error. Staleness policy lives with callers, computed from [`CacheMeta`].

mod cache;
mod error;
pub mod paths;

pub use cache::{CacheMeta, FileCache};
pub use error::{Result, StoreError};
