//! Reversible encoding of cache keys into single path components.
//!
//! Project IDs and file keys come from the remote export and may contain
//! separators or anything else; they must never escape the project
//! directory or collide after sanitization, and `list_keys` must be able
//! to recover the original key from the filename.

use std::path::{Path, PathBuf};

pub const FILES_DIR_NAME: &str = "files";
pub const META_FILE_NAME: &str = "meta.json";
pub const FILE_SUFFIX: &str = ".yaml";

/// Marker for the empty key. `%` is the escape lead-in and `-` is not a
/// hex digit, so the byte encoder can never produce this form for any
/// non-empty key.
const EMPTY_KEY_MARKER: &str = "%-";

/// Encode an arbitrary key as a single safe path component.
///
/// ASCII alphanumerics, `-` and `_` pass through; everything else becomes
/// `%XX` per byte. The output never contains `/`, `\` or a leading `.`.
pub fn encode_component(raw: &str) -> String {
    if raw.is_empty() {
        return EMPTY_KEY_MARKER.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Inverse of [`encode_component`]. Returns `None` for filenames that were
/// not produced by the encoder.
pub fn decode_component(encoded: &str) -> Option<String> {
    if encoded == EMPTY_KEY_MARKER {
        return Some(String::new());
    }
    let mut bytes = Vec::with_capacity(encoded.len());
    let mut iter = encoded.bytes();
    while let Some(byte) = iter.next() {
        if byte == b'%' {
            let hi = iter.next()?;
            let lo = iter.next()?;
            let hex = [hi, lo];
            let hex = std::str::from_utf8(&hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
        } else {
            bytes.push(byte);
        }
    }
    String::from_utf8(bytes).ok()
}

pub fn project_dir(root: &Path, project_id: &str) -> PathBuf {
    root.join(encode_component(project_id))
}

pub fn files_dir(root: &Path, project_id: &str) -> PathBuf {
    project_dir(root, project_id).join(FILES_DIR_NAME)
}

pub fn file_path(root: &Path, project_id: &str, file_key: &str) -> PathBuf {
    files_dir(root, project_id).join(format!("{}{FILE_SUFFIX}", encode_component(file_key)))
}

pub fn meta_path(root: &Path, project_id: &str) -> PathBuf {
    project_dir(root, project_id).join(META_FILE_NAME)
}

/// Recover the original file key from a cache filename.
pub fn key_from_file_name(name: &str) -> Option<String> {
    let encoded = name.strip_suffix(FILE_SUFFIX)?;
    decode_component(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encode_passes_through_plain_keys() {
        assert_eq!(encode_component("Button_x3f"), "Button_x3f");
        assert_eq!(encode_component("app-details"), "app-details");
    }

    #[test]
    fn encode_round_trips_hostile_keys() {
        for raw in [
            "pages/home",
            "..",
            ".hidden",
            "a b%c",
            "ключ",
            "",
            "\u{0}",
            "meta.json",
        ] {
            let encoded = encode_component(raw);
            assert!(!encoded.contains('/'), "{encoded}");
            assert!(!encoded.contains('\\'), "{encoded}");
            assert!(!encoded.starts_with('.'), "{encoded}");
            assert_eq!(decode_component(&encoded).as_deref(), Some(raw));
        }
    }

    #[test]
    fn empty_and_nul_keys_stay_distinct() {
        assert_eq!(encode_component(""), "%-");
        assert_eq!(encode_component("\u{0}"), "%00");
        assert_eq!(decode_component("%-").as_deref(), Some(""));
        assert_eq!(decode_component("%00").as_deref(), Some("\u{0}"));
    }

    #[test]
    fn key_recovery_rejects_foreign_names() {
        assert_eq!(key_from_file_name("notes.txt"), None);
        assert_eq!(
            key_from_file_name("folders.yaml").as_deref(),
            Some("folders")
        );
    }
}
