//! Embedding extraction for stored documents.
//!
//! Depending on the driver and how the row was written, a stored `$vector`
//! comes back as a bare array, as `{"vector": [...]}` or as `{"data": [...]}`.

use serde_json::Value;

/// Result of normalizing a stored vector value
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedVector {
    /// Flat ordered embedding
    Flat(Vec<f32>),
    /// No vector stored
    Missing,
    /// A shape we do not know how to read, handed back untouched
    Unrecognized(Value),
}

impl NormalizedVector {
    /// The embedding, if one could be read
    pub fn into_vec(self) -> Option<Vec<f32>> {
        match self {
            NormalizedVector::Flat(v) => Some(v),
            NormalizedVector::Missing | NormalizedVector::Unrecognized(_) => None,
        }
    }
}

/// Normalizes a raw stored vector into a flat sequence of floats
pub fn normalize_vector(raw: Option<&Value>) -> NormalizedVector {
    let Some(raw) = raw else {
        return NormalizedVector::Missing;
    };

    let candidate = match raw {
        Value::Null => return NormalizedVector::Missing,
        Value::Array(_) => Some(raw),
        Value::Object(map) => map.get("vector").or_else(|| map.get("data")),
        _ => None,
    };

    match candidate.and_then(flatten_numbers) {
        Some(vector) => NormalizedVector::Flat(vector),
        None => {
            tracing::warn!(shape = %shape_name(raw), "Unexpected stored vector shape");
            NormalizedVector::Unrecognized(raw.clone())
        }
    }
}

fn flatten_numbers(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|n| n.as_f64().map(|f| f as f32))
        .collect()
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Cosine similarity mapped onto `[0, 1]`, the scale the Data API reports
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let cosine = dot / (norm_a * norm_b).max(f32::EPSILON);
    (1.0 + cosine) / 2.0
}
