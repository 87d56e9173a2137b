use serde_json::{json, Map, Value};

/// Boolean filter expression over stored documents
///
/// Field names are dotted paths into the document (`watch_providers.US.stream`).
/// An empty `And` matches every document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals one of `values`; for array fields, any element does
    FieldIn { field: String, values: Vec<Value> },
    /// Field is present and not null
    FieldExists { field: String },
    /// Numeric field strictly greater than `value`
    FieldGt { field: String, value: f64 },
    /// String field equal to `value` ignoring case; `value` is stored lower-cased
    FieldEqFolded { field: String, value: String },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    /// Matches every document
    pub fn all() -> Self {
        Filter::And(Vec::new())
    }

    pub fn field_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::FieldIn {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Filter::FieldExists {
            field: field.into(),
        }
    }

    pub fn gt(field: impl Into<String>, value: f64) -> Self {
        Filter::FieldGt {
            field: field.into(),
            value,
        }
    }

    pub fn eq_folded(field: impl Into<String>, value: &str) -> Self {
        Filter::FieldEqFolded {
            field: field.into(),
            value: value.to_lowercase(),
        }
    }

    /// Conjunction that collapses a single child into itself
    pub fn and(mut children: Vec<Filter>) -> Self {
        if children.len() == 1 {
            return children.remove(0);
        }
        Filter::And(children)
    }

    /// Disjunction that collapses a single child into itself
    pub fn or(mut children: Vec<Filter>) -> Self {
        if children.len() == 1 {
            return children.remove(0);
        }
        Filter::Or(children)
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Filter::And(children) if children.is_empty())
    }

    /// Renders the filter in Data API (Mongo-style) syntax
    pub fn to_query_json(&self) -> Value {
        match self {
            Filter::FieldIn { field, values } => json!({ field.as_str(): { "$in": values } }),
            Filter::FieldExists { field } => json!({ field.as_str(): { "$exists": true } }),
            Filter::FieldGt { field, value } => json!({ field.as_str(): { "$gt": value } }),
            Filter::FieldEqFolded { field, value } => json!({ folded_field(field): value }),
            Filter::And(children) if children.is_empty() => Value::Object(Map::new()),
            Filter::And(children) => {
                json!({ "$and": children.iter().map(Filter::to_query_json).collect::<Vec<_>>() })
            }
            Filter::Or(children) => {
                json!({ "$or": children.iter().map(Filter::to_query_json).collect::<Vec<_>>() })
            }
        }
    }

    /// Evaluates the filter against a raw stored document
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::FieldIn { field, values } => match lookup_path(doc, field) {
                Some(Value::Array(elements)) => elements
                    .iter()
                    .any(|element| values.iter().any(|v| element_matches(element, v))),
                Some(found) => values.iter().any(|v| element_matches(found, v)),
                None => false,
            },
            Filter::FieldExists { field } => {
                matches!(lookup_path(doc, field), Some(v) if !v.is_null())
            }
            Filter::FieldGt { field, value } => lookup_path(doc, field)
                .and_then(Value::as_f64)
                .is_some_and(|found| found > *value),
            Filter::FieldEqFolded { field, value } => match lookup_path(doc, field) {
                Some(Value::Array(elements)) => elements.iter().any(|element| folded_eq(element, value)),
                Some(found) => folded_eq(found, value),
                None => false,
            },
            Filter::And(children) => children.iter().all(|child| child.matches(doc)),
            Filter::Or(children) => children.iter().any(|child| child.matches(doc)),
        }
    }
}

/// Resolves a dotted path inside a JSON document
pub fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

/// Name of the lower-cased copy the loader writes next to a field
///
/// `title` is folded into `search_title`, `cast.name` into `cast.search_name`.
pub fn folded_field(field: &str) -> String {
    match field.rsplit_once('.') {
        Some((parent, leaf)) => format!("{}.search_{}", parent, leaf),
        None => format!("search_{}", field),
    }
}

fn folded_eq(element: &Value, folded: &str) -> bool {
    match element {
        Value::String(text) => text.to_lowercase() == folded,
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| name.to_lowercase() == folded),
        _ => false,
    }
}

/// `{id, name}` objects in named lists match on their name
fn element_matches(element: &Value, expected: &Value) -> bool {
    if element == expected {
        return true;
    }
    match (element, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Object(map), _) => map.get("name").is_some_and(|name| name == expected),
        _ => false,
    }
}
