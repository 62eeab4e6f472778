use serde_yaml::Value;

/// Infer a widget's type from its key.
///
/// The export encodes the widget class as a key prefix, `Button_x3f` style.
/// The segment before the first underscore is the type iff it starts with
/// an ASCII uppercase letter; anything else is `"Unknown"`.
pub fn infer_type(key: &str) -> String {
    match key.split_once('_') {
        Some((prefix, _))
            if prefix
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_uppercase()) =>
        {
            prefix.to_string()
        }
        _ => "Unknown".to_string(),
    }
}

/// Closed classification of a property value sub-document, in the fixed
/// priority order of the resolution cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    /// Nothing to display: absent, boolean, or an unrecognized shape.
    Empty,
    /// A plain scalar, already in display form.
    Scalar(String),
    /// A literal carried pre-serialized by the export.
    Serialized(String),
    /// A reference into the app theme palette.
    ThemeColor(String),
    /// A literal carried under a bare `value` field.
    Raw(String),
    /// A binding to a variable; its internal shape is not surfaced.
    Dynamic,
}

/// Classify a raw property value.
///
/// A present `inputValue` always routes to the literal branch, even when a
/// `variable` binding sits next to it: a literal overrides a bound
/// reference in the source schema. An explicit-null `inputValue` is not
/// usable and falls through to the binding.
pub fn classify(raw: &Value) -> ResolvedValue {
    match raw {
        Value::Null => ResolvedValue::Empty,
        Value::String(s) => ResolvedValue::Scalar(s.clone()),
        Value::Number(n) => ResolvedValue::Scalar(n.to_string()),
        Value::Bool(_) => ResolvedValue::Empty,
        Value::Mapping(map) => match map.get("inputValue") {
            Some(input) if !input.is_null() => classify_input(input),
            _ if map.get("variable").is_some() => ResolvedValue::Dynamic,
            _ => ResolvedValue::Empty,
        },
        Value::Sequence(_) | Value::Tagged(_) => ResolvedValue::Empty,
    }
}

fn classify_input(input: &Value) -> ResolvedValue {
    match input {
        Value::String(s) => ResolvedValue::Scalar(s.clone()),
        Value::Number(n) => ResolvedValue::Scalar(n.to_string()),
        Value::Bool(_) => ResolvedValue::Empty,
        Value::Mapping(map) => {
            if let Some(s) = map.get("serializedValue").and_then(Value::as_str) {
                ResolvedValue::Serialized(s.to_string())
            } else if let Some(s) = map.get("themeColor").and_then(Value::as_str) {
                ResolvedValue::ThemeColor(s.to_string())
            } else if let Some(s) = map.get("value").and_then(scalar_text) {
                ResolvedValue::Raw(s)
            } else {
                ResolvedValue::Empty
            }
        }
        _ => ResolvedValue::Empty,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve a raw property value to its display string.
pub fn resolve_value(raw: &Value) -> String {
    match classify(raw) {
        ResolvedValue::Empty => String::new(),
        ResolvedValue::Scalar(s) => s,
        ResolvedValue::Serialized(s) => s,
        ResolvedValue::ThemeColor(name) => format!("[theme:{name}]"),
        ResolvedValue::Raw(s) => s,
        ResolvedValue::Dynamic => "[dynamic]".to_string(),
    }
}
