use crate::error::Result;
use serde_yaml::Value;
use std::collections::HashMap;

/// Field holding the flat page-to-folder assignment table.
const ASSIGNMENT_FIELD: &str = "widgetClassKeyToFolderKey";

/// Widget keys follow `Class_<suffix>`; page identifiers are the ones whose
/// class is the page root container.
const PAGE_KEY_PREFIX: &str = "Scaffold";

/// Build a `page identifier -> folder display name` map from a folders
/// document.
///
/// The document carries a nested folder tree and a flat assignment table.
/// Pass 1 collects every `(key, name)` pair anywhere in the document into a
/// lookup table, tolerating arbitrary nesting so schema drift in the tree
/// shape cannot break resolution. Pass 2 reads only the assignment table,
/// keeps page identifiers, and resolves each folder key through the table,
/// falling back to the raw folder key when it is unknown. Nesting depth is
/// discarded; only the assigned folder's own name survives.
pub fn map_folders(folders_text: &str) -> Result<HashMap<String, String>> {
    let doc: Value = serde_yaml::from_str(folders_text)?;

    let names = collect_key_names(&doc);

    let mut out = HashMap::new();
    let Some(assignments) = find_field_mapping(&doc, ASSIGNMENT_FIELD) else {
        return Ok(out);
    };
    for (page, folder_key) in assignments {
        let Some(page) = page.as_str() else { continue };
        if !page.starts_with(PAGE_KEY_PREFIX) {
            continue;
        }
        let Some(folder_key) = folder_key.as_str() else {
            continue;
        };
        let name = names
            .get(folder_key)
            .cloned()
            .unwrap_or_else(|| folder_key.to_string());
        out.insert(page.to_string(), name);
    }
    Ok(out)
}

/// Pass 1: flatten the document into an arena and scan it by index,
/// collecting every mapping that carries string `key` and `name` fields.
fn collect_key_names(doc: &Value) -> HashMap<String, String> {
    let mut names = HashMap::new();
    let mut arena: Vec<&Value> = vec![doc];
    let mut cursor = 0;
    while cursor < arena.len() {
        let value = arena[cursor];
        match value {
            Value::Mapping(map) => {
                if let (Some(key), Some(name)) = (
                    map.get("key").and_then(Value::as_str),
                    map.get("name").and_then(Value::as_str),
                ) {
                    names.insert(key.to_string(), name.to_string());
                }
                arena.extend(map.values());
            }
            Value::Sequence(items) => arena.extend(items.iter()),
            _ => {}
        }
        cursor += 1;
    }
    names
}

/// Locate the first mapping stored under `field` anywhere in the document.
fn find_field_mapping<'a>(doc: &'a Value, field: &str) -> Option<&'a serde_yaml::Mapping> {
    let mut arena: Vec<&Value> = vec![doc];
    let mut cursor = 0;
    while cursor < arena.len() {
        let value = arena[cursor];
        match value {
            Value::Mapping(map) => {
                if let Some(found) = map.get(field).and_then(Value::as_mapping) {
                    return Some(found);
                }
                arena.extend(map.values());
            }
            Value::Sequence(items) => arena.extend(items.iter()),
            _ => {}
        }
        cursor += 1;
    }
    None
}
