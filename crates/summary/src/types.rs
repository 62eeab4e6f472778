use serde::Serialize;

/// Top-level page facts, independent of the widget tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page_name: String,
    pub scaffold_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub params: Vec<String>,
    pub state_fields: Vec<String>,
}

/// An event handler on a node: its trigger name and the ordered effects it
/// fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trigger {
    pub name: String,
    pub actions: Vec<ActionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

/// One node of a page summary: the outline node annotated with its own
/// document's content. `error` marks a node whose fetch failed; the rest of
/// the tree around it is still complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryNode {
    pub key: String,
    pub widget_type: String,
    pub name: String,
    pub slot: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<Trigger>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub children: Vec<SummaryNode>,
}

/// The complete summary of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub meta: PageMeta,
    pub tree: SummaryNode,
}
