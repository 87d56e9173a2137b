use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashSet, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::ItemId,
};

/// Shortest prefix that produces suggestions
pub const MIN_QUERY_CHARS: usize = 2;

/// Prefix matches considered before dedupe
const MAX_CANDIDATES: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    #[default]
    Movie,
    Person,
    Genre,
}

impl SuggestionKind {
    /// Type codes used by the compact `[code, name, id]` index layout
    fn from_code(code: u64) -> Self {
        match code {
            1 => SuggestionKind::Person,
            2 => SuggestionKind::Genre,
            _ => SuggestionKind::Movie,
        }
    }
}

/// One row of the pre-built index
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "type", default)]
    pub kind: SuggestionKind,
    pub name: String,
    #[serde(default, alias = "movieId")]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Full(IndexEntry),
    Compact(Vec<Value>),
}

impl RawEntry {
    fn into_entry(self) -> Option<IndexEntry> {
        match self {
            RawEntry::Full(entry) => Some(entry),
            RawEntry::Compact(fields) => {
                let kind = SuggestionKind::from_code(fields.first()?.as_u64()?);
                let name = fields.get(1)?.as_str()?.to_string();
                let id = fields
                    .get(2)
                    .cloned()
                    .and_then(|v| serde_json::from_value(v).ok());
                Some(IndexEntry {
                    kind,
                    name,
                    id,
                    icon: None,
                })
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndex {
    List(Vec<RawEntry>),
    Wrapped { entries: Vec<RawEntry> },
}

/// Suggestion as returned to clients; movies carry `title`, the rest `name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Suggestion {
    fn label(&self) -> &str {
        self.title.as_deref().or(self.name.as_deref()).unwrap_or_default()
    }
}

impl From<&IndexEntry> for Suggestion {
    fn from(entry: &IndexEntry) -> Self {
        let (title, name) = match entry.kind {
            SuggestionKind::Movie => (Some(entry.name.clone()), None),
            SuggestionKind::Person | SuggestionKind::Genre => (None, Some(entry.name.clone())),
        };
        Self {
            kind: entry.kind,
            id: entry.id.clone(),
            title,
            name,
            icon: entry.icon.clone(),
        }
    }
}

/// Prefix lookup over movie titles, people and genres
#[derive(Debug, Default, Clone)]
pub struct AutocompleteIndex {
    entries: Vec<(String, IndexEntry)>,
}

impl AutocompleteIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .filter(|e| !e.name.is_empty())
                .map(|e| (e.name.to_lowercase(), e))
                .collect(),
        }
    }

    /// Loads an index file, either a list or `{"entries": [...]}`
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!(
                "Failed to read autocomplete index {}: {}",
                path.display(),
                e
            ))
        })?;
        let index: RawIndex = serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid autocomplete index: {}", e)))?;

        let raw_entries = match index {
            RawIndex::List(entries) | RawIndex::Wrapped { entries } => entries,
        };
        let entries: Vec<IndexEntry> = raw_entries
            .into_iter()
            .filter_map(RawEntry::into_entry)
            .collect();

        tracing::info!(entries = entries.len(), "Loaded autocomplete index");
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Suggestions whose name starts with `query`, case-insensitively
    ///
    /// One suggestion per type and name, sorted alphabetically.
    pub fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let prefix = query.trim().to_lowercase();
        if prefix.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let candidates = self
            .entries
            .iter()
            .filter(|(folded, _)| folded.starts_with(prefix.as_str()))
            .take(MAX_CANDIDATES);

        let mut seen = HashSet::new();
        let mut suggestions = Vec::new();
        for (_, entry) in candidates {
            if seen.insert((entry.kind, entry.name.as_str())) {
                suggestions.push(Suggestion::from(entry));
            }
        }

        suggestions.sort_by_cached_key(|s| s.label().to_lowercase());
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entry(kind: SuggestionKind, name: &str, id: i64) -> IndexEntry {
        IndexEntry {
            kind,
            name: name.to_string(),
            id: Some(ItemId::Int(id)),
            icon: None,
        }
    }

    fn create_test_index() -> AutocompleteIndex {
        AutocompleteIndex::new(vec![
            entry(SuggestionKind::Person, "Tom Hanks", 31),
            entry(SuggestionKind::Person, "Tom Hanks", 31),
            entry(SuggestionKind::Movie, "Toy Story", 862),
            entry(SuggestionKind::Movie, "Tombstone", 11969),
            entry(SuggestionKind::Genre, "Thriller", 53),
            entry(SuggestionKind::Movie, "Heat", 949),
        ])
    }

    #[test]
    fn test_short_query_is_empty() {
        let index = create_test_index();
        assert!(index.suggest("t").is_empty());
        assert!(index.suggest(" ").is_empty());
    }

    #[test]
    fn test_prefix_match_is_case_insensitive_and_sorted() {
        let index = create_test_index();
        let labels: Vec<String> = index
            .suggest("TO")
            .iter()
            .map(|s| s.label().to_string())
            .collect();

        assert_eq!(labels, vec!["Tom Hanks", "Tombstone", "Toy Story"]);
    }

    #[test]
    fn test_movies_use_title_others_use_name() {
        let index = create_test_index();
        let suggestions = index.suggest("tom");

        let person = suggestions
            .iter()
            .find(|s| s.kind == SuggestionKind::Person)
            .unwrap();
        assert_eq!(person.name.as_deref(), Some("Tom Hanks"));
        assert!(person.title.is_none());

        let movie = suggestions
            .iter()
            .find(|s| s.kind == SuggestionKind::Movie)
            .unwrap();
        assert_eq!(movie.title.as_deref(), Some("Tombstone"));
        assert_eq!(
            serde_json::to_value(movie).unwrap(),
            serde_json::json!({ "type": "movie", "id": 11969, "title": "Tombstone" })
        );
    }

    #[test]
    fn test_from_json_file_accepts_both_layouts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "type": "movie", "name": "Alien", "movieId": 348, "icon": "🎬" }}, [1, "Sigourney Weaver", 10205], [2, "Horror"]]"#
        )
        .unwrap();

        let index = AutocompleteIndex::from_json_file(file.path()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.suggest("al")[0].icon.as_deref(), Some("🎬"));
        assert_eq!(index.suggest("sig")[0].id, Some(ItemId::Int(10205)));
        assert_eq!(index.suggest("hor")[0].kind, SuggestionKind::Genre);

        let mut wrapped = tempfile::NamedTempFile::new().unwrap();
        write!(wrapped, r#"{{ "entries": [{{ "type": "genre", "name": "Drama" }}] }}"#).unwrap();
        let index = AutocompleteIndex::from_json_file(wrapped.path()).unwrap();
        assert_eq!(index.len(), 1);
    }
}
