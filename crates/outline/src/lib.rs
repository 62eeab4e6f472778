//! # Pagelens Outline
//!
//! Parsers for the schema-flexible YAML documents of a no-code project
//! export:
//!
//! - [`map_folders`] — folders document → `page identifier -> folder name`
//! - [`walk_outline`] — widget-tree-outline document → [`OutlineNode`] tree
//! - [`infer_type`] / [`resolve_value`] — widget typing and polymorphic
//!   property-value resolution
//!
//! All three operate on generically parsed `serde_yaml::Value` trees with
//! tolerant scans rather than strict structural deserialization: the export
//! format drifts, and a summary that survives drift beats one that fails
//! to parse.

mod error;
mod folders;
mod values;
mod walker;

pub use error::{OutlineError, Result};
pub use folders::map_folders;
pub use values::{classify, infer_type, resolve_value, ResolvedValue};
pub use walker::{
    walk_outline, OutlineNode, LIST_SLOT, NAMED_SLOTS, ROOT_SLOT, UNKNOWN_KEY,
};
