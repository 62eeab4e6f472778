//! # Pagelens Archive
//!
//! Decoder for the remote export bundle: a JSON envelope carrying a base64
//! string that encodes a zip of small UTF-8 YAML documents. The decoder
//! turns one envelope into a `file_key -> text` map ready for the cache;
//! damaged individual entries are skipped rather than failing the bundle.

mod decoder;
mod error;

pub use decoder::{decode_archive, ENVELOPE_FIELD};
pub use error::{DecodeError, Result};
