use crate::error::{OutlineError, Result};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Named structural roles a child can attach under. Everything else hangs
/// off the ordered `children` list.
pub const NAMED_SLOTS: [&str; 10] = [
    "body",
    "appBar",
    "title",
    "header",
    "collapsed",
    "expanded",
    "floatingActionButton",
    "drawer",
    "endDrawer",
    "bottomNavigationBar",
];

/// Slot recorded on the top node of a walked outline.
pub const ROOT_SLOT: &str = "root";

/// Slot recorded on ordered-list children.
pub const LIST_SLOT: &str = "children";

/// Sentinel for list children whose document carries no key.
pub const UNKNOWN_KEY: &str = "unknown";

/// One node of a walked widget-tree outline: the widget key, the slot that
/// attached it to its parent, and its children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub key: String,
    pub slot: String,
    pub children: Vec<OutlineNode>,
}

/// Parse a widget-tree-outline document into an [`OutlineNode`] tree.
///
/// Named slots are optional and frequently absent; a slot value without a
/// key is skipped entirely. List children are always included, with the
/// [`UNKNOWN_KEY`] sentinel when a key is missing. The only hard failure is
/// a document in which no root node with a key can be found. The source
/// format is a tree, not a graph, so the walk always terminates.
pub fn walk_outline(outline_text: &str) -> Result<OutlineNode> {
    let doc: Value = serde_yaml::from_str(outline_text)?;
    let root = find_root(&doc).ok_or(OutlineError::MissingRoot)?;
    Ok(build_node(root, ROOT_SLOT))
}

/// The document root mapping when it is keyed, otherwise the first keyed
/// mapping found scanning the document.
fn find_root(doc: &Value) -> Option<&Mapping> {
    let mut arena: Vec<&Value> = vec![doc];
    let mut cursor = 0;
    while cursor < arena.len() {
        let value = arena[cursor];
        match value {
            Value::Mapping(map) => {
                if map.get("key").and_then(Value::as_str).is_some() {
                    return Some(map);
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

fn build_node(map: &Mapping, slot: &str) -> OutlineNode {
    let key = map
        .get("key")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_KEY)
        .to_string();

    let mut children = Vec::new();
    for slot_name in NAMED_SLOTS {
        let Some(value) = map.get(slot_name) else {
            continue;
        };
        let Some(child) = value.as_mapping() else {
            continue;
        };
        if child.get("key").and_then(Value::as_str).is_none() {
            log::debug!("skipping keyless '{slot_name}' slot under '{key}'");
            continue;
        }
        children.push(build_node(child, slot_name));
    }

    if let Some(list) = map.get(LIST_SLOT).and_then(Value::as_sequence) {
        for item in list {
            match item.as_mapping() {
                Some(child) => children.push(build_node(child, LIST_SLOT)),
                None => children.push(OutlineNode {
                    key: UNKNOWN_KEY.to_string(),
                    slot: LIST_SLOT.to_string(),
                    children: Vec::new(),
                }),
            }
        }
    }

    OutlineNode {
        key,
        slot: slot.to_string(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keyed_root_with_no_children_is_a_single_node() {
        let tree = walk_outline("key: Scaffold_home").expect("walk");
        assert_eq!(tree.key, "Scaffold_home");
        assert_eq!(tree.slot, ROOT_SLOT);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn missing_root_key_is_a_structure_error() {
        let err = walk_outline("title: no widgets here").expect_err("must fail");
        assert!(matches!(err, OutlineError::MissingRoot));
    }

    #[test]
    fn named_slots_record_their_slot_name() {
        let doc = r#"
key: Scaffold_home
appBar:
  key: AppBar_1
body:
  key: Column_1
  children:
    - key: Text_1
    - key: Button_1
"#;
        let tree = walk_outline(doc).expect("walk");
        let slots: Vec<(&str, &str)> = tree
            .children
            .iter()
            .map(|c| (c.key.as_str(), c.slot.as_str()))
            .collect();
        assert_eq!(slots, vec![("Column_1", "body"), ("AppBar_1", "appBar")]);

        let column = &tree.children[0];
        assert_eq!(column.children.len(), 2);
        assert!(column.children.iter().all(|c| c.slot == LIST_SLOT));
    }

    #[test]
    fn keyless_named_slot_is_skipped() {
        let doc = r#"
key: Scaffold_home
drawer:
  elevation: 2
"#;
        let tree = walk_outline(doc).expect("walk");
        assert!(tree.children.is_empty());
    }

    #[test]
    fn keyless_list_child_gets_the_sentinel() {
        let doc = r#"
key: Scaffold_home
children:
  - key: Text_1
  - color: red
  - plain scalar
"#;
        let tree = walk_outline(doc).expect("walk");
        let keys: Vec<&str> = tree.children.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["Text_1", UNKNOWN_KEY, UNKNOWN_KEY]);
    }

    #[test]
    fn root_is_discovered_under_a_wrapper_field() {
        let doc = r#"
widgetTree:
  key: Scaffold_wrapped
  body:
    key: Text_1
"#;
        let tree = walk_outline(doc).expect("walk");
        assert_eq!(tree.key, "Scaffold_wrapped");
        assert_eq!(tree.children[0].key, "Text_1");
    }
}
