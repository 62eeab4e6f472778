use crate::types::{ActionSummary, PageMeta, SummaryNode, Trigger};
use pagelens_outline::{infer_type, resolve_value, OutlineNode};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

/// Outcome of one node-document fetch: the text, or the error marker to
/// record inline on the degraded node.
pub(crate) type NodeFetch = std::result::Result<String, String>;

/// Fields consulted, in order, for a node's display detail.
const DETAIL_FIELDS: [&str; 5] = ["text", "label", "title", "imagePath", "value"];

/// Coarse action kinds keyed by the payload field that discriminates them.
const ACTION_KINDS: [(&str, &str); 6] = [
    ("navigateTo", "navigate"),
    ("backendCall", "backend-call"),
    ("apiCall", "backend-call"),
    ("updatePageState", "update-state"),
    ("updateAppState", "update-state"),
    ("showSnackBar", "show-snack-bar"),
];

/// Extract top-level page facts from the page's own document. Tolerant:
/// every field is optional and an unparseable document yields bare
/// defaults rather than an error.
pub(crate) fn page_meta(
    page_file_key: &str,
    folder: Option<String>,
    page_text: &str,
) -> PageMeta {
    let doc: Value = serde_yaml::from_str(page_text).unwrap_or(Value::Null);

    let page_name = doc
        .get("pageName")
        .or_else(|| doc.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(page_file_key)
        .to_string();

    PageMeta {
        page_name,
        scaffold_id: page_file_key.to_string(),
        folder,
        params: name_list(doc.get("parameters")),
        state_fields: name_list(doc.get("pageState").or_else(|| doc.get("stateFields"))),
    }
}

/// Names from a list whose items are either strings or mappings carrying a
/// `name` (or `key`) field.
fn name_list(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_sequence) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Mapping(map) => map
                .get("name")
                .or_else(|| map.get("key"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect()
}

/// Annotate a walked outline into a summary tree using the fetched
/// per-node documents. A node whose fetch failed carries the error marker
/// and empty content; its siblings and children are unaffected.
pub(crate) fn build_summary(
    outline: &OutlineNode,
    docs: &HashMap<String, NodeFetch>,
) -> SummaryNode {
    let (name, detail, triggers, error) = match docs.get(&outline.key) {
        Some(Ok(text)) => match serde_yaml::from_str::<Value>(text) {
            Ok(doc) => (
                node_name(&doc, &outline.key),
                node_detail(&doc),
                node_triggers(&doc),
                None,
            ),
            Err(err) => (
                outline.key.clone(),
                String::new(),
                Vec::new(),
                Some(format!("unreadable document: {err}")),
            ),
        },
        Some(Err(marker)) => (
            outline.key.clone(),
            String::new(),
            Vec::new(),
            Some(marker.clone()),
        ),
        // Sentinel nodes have no document of their own.
        None => (outline.key.clone(), String::new(), Vec::new(), None),
    };

    SummaryNode {
        key: outline.key.clone(),
        widget_type: infer_type(&outline.key),
        name,
        slot: outline.slot.clone(),
        detail,
        triggers,
        error,
        children: outline
            .children
            .iter()
            .map(|child| build_summary(child, docs))
            .collect(),
    }
}

fn node_name(doc: &Value, key: &str) -> String {
    doc.get("name")
        .and_then(Value::as_str)
        .unwrap_or(key)
        .to_string()
}

/// First non-empty resolved value among the known content fields, checked
/// on the document itself and under its `properties` mapping.
fn node_detail(doc: &Value) -> String {
    for scope in [Some(doc), doc.get("properties")].into_iter().flatten() {
        for field in DETAIL_FIELDS {
            if let Some(raw) = scope.get(field) {
                let resolved = resolve_value(raw);
                if !resolved.is_empty() {
                    return resolved;
                }
            }
        }
    }
    String::new()
}

fn node_triggers(doc: &Value) -> Vec<Trigger> {
    let Some(items) = doc.get("triggers").and_then(Value::as_sequence) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_mapping)
        .map(|trigger| {
            let name = trigger
                .get("triggerType")
                .or_else(|| trigger.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let actions = trigger
                .get("actions")
                .and_then(Value::as_sequence)
                .map(|actions| {
                    actions
                        .iter()
                        .filter_map(Value::as_mapping)
                        .map(classify_action)
                        .collect()
                })
                .unwrap_or_default();
            Trigger { name, actions }
        })
        .collect()
}

/// Tag an action with a coarse kind from its discriminating payload field
/// and a short detail resolved from that payload.
fn classify_action(action: &Mapping) -> ActionSummary {
    for (field, kind) in ACTION_KINDS {
        if let Some(payload) = action.get(field) {
            return ActionSummary {
                kind: kind.to_string(),
                detail: resolve_value(payload),
            };
        }
    }
    let kind = action
        .get("actionType")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    ActionSummary {
        kind,
        detail: String::new(),
    }
}
