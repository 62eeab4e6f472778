use crate::error::{DecodeError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// JSON field of the remote envelope that carries the base64 zip payload.
pub const ENVELOPE_FIELD: &str = "value";

/// Decode a remote archive envelope into a `file_key -> UTF-8 text` map.
///
/// The envelope is an opaque JSON object whose [`ENVELOPE_FIELD`] holds a
/// base64 string encoding a zip of text documents. Entry names drop a
/// trailing `.yaml` to form file keys; directory entries are ignored. An
/// entry that fails to read or is not valid UTF-8 is skipped with a warning
/// so a partially damaged bundle still yields its readable files. An empty
/// archive is an empty map, not an error.
pub fn decode_archive(envelope: &serde_json::Value) -> Result<BTreeMap<String, String>> {
    let encoded = envelope
        .get(ENVELOPE_FIELD)
        .and_then(|v| v.as_str())
        .ok_or(DecodeError::MissingField(ENVELOPE_FIELD))?;

    let bytes = STANDARD.decode(encoded)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut files = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable archive entry #{i}: {err}");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let mut text = String::new();
        if let Err(err) = entry.read_to_string(&mut text) {
            log::warn!("skipping archive entry '{name}': {err}");
            continue;
        }
        files.insert(file_key_for_entry(&name), text);
    }

    log::debug!("decoded archive with {} files", files.len());
    Ok(files)
}

/// Exports name every document `<key>.yaml`; the key is the name without
/// that suffix. Names without the suffix are kept verbatim.
fn file_key_for_entry(name: &str) -> String {
    name.strip_suffix(".yaml").unwrap_or(name).to_string()
}
