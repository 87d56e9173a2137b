use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{
    db::vector::normalize_vector,
    models::{ContentType, ItemId, MediaItem, NamedRef, RegionProviders},
};

/// A document exactly as the store returned it
///
/// This is the only place that knows about the storage shapes; everything past
/// [`StoredDocument::into_media_item`] works with [`MediaItem`].
#[derive(Debug, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id", default)]
    storage_id: Option<ItemId>,
    #[serde(default)]
    id: Option<ItemId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    popularity: Option<f64>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    original_language: Option<String>,
    #[serde(default)]
    genres: Option<Value>,
    #[serde(default)]
    cast: Option<Value>,
    #[serde(default)]
    keywords: Option<Value>,
    #[serde(default)]
    watch_providers: Option<Value>,
    #[serde(rename = "$vector", default)]
    vector: Option<Value>,
    #[serde(rename = "$similarity", default)]
    similarity: Option<f32>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Either shape a genre, cast member or keyword is stored in
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNamedRef {
    Object {
        #[serde(default)]
        id: Option<ItemId>,
        name: String,
    },
    Name(String),
}

impl StoredDocument {
    /// Decodes a raw document; `None` when it carries no usable identity
    pub fn from_value(value: Value, content_type: ContentType) -> Option<MediaItem> {
        match serde_json::from_value::<StoredDocument>(value) {
            Ok(doc) => doc.into_media_item(content_type),
            Err(e) => {
                tracing::warn!(error = %e, collection = %content_type, "Skipping undecodable document");
                None
            }
        }
    }

    /// Converts into the canonical in-memory representation
    pub fn into_media_item(self, content_type: ContentType) -> Option<MediaItem> {
        let Some(id) = self.storage_id.or(self.id) else {
            tracing::warn!(collection = %content_type, "Skipping document without an id");
            return None;
        };

        let mut extra = self.extra;
        // Search-only helper field, never part of a response
        extra.remove("searchName");

        Some(MediaItem {
            id,
            content_type,
            title: self.title,
            name: self.name,
            overview: self.overview,
            popularity: self.popularity,
            vote_average: self.vote_average,
            release_date: self.release_date,
            first_air_date: self.first_air_date,
            original_language: self.original_language,
            genres: decode_named_refs(self.genres),
            cast: decode_named_refs(self.cast),
            keywords: decode_named_refs(self.keywords),
            watch_providers: decode_watch_providers(self.watch_providers),
            similarity: self.similarity,
            embedding: normalize_vector(self.vector.as_ref()).into_vec(),
            extra,
        })
    }
}

/// Accepts `[{id, name}]` and `["name"]`; legacy numeric ids carry no name and are dropped
fn decode_named_refs(raw: Option<Value>) -> Vec<NamedRef> {
    let Some(Value::Array(values)) = raw else {
        return Vec::new();
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawNamedRef>(value) {
            Ok(RawNamedRef::Object { id, name }) => Some(NamedRef { id, name }),
            Ok(RawNamedRef::Name(name)) => Some(NamedRef { id: None, name }),
            Err(_) => None,
        })
        .collect()
}

fn decode_watch_providers(raw: Option<Value>) -> BTreeMap<String, RegionProviders> {
    let Some(Value::Object(regions)) = raw else {
        return BTreeMap::new();
    };

    regions
        .into_iter()
        .filter_map(|(region, providers)| {
            match serde_json::from_value::<RegionProviders>(providers) {
                Ok(parsed) => Some((region, parsed)),
                Err(e) => {
                    tracing::debug!(region = %region, error = %e, "Ignoring malformed watch providers");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_reconciles_ids() {
        let item = StoredDocument::from_value(json!({ "_id": "550", "id": 550 }), ContentType::Movie)
            .unwrap();
        assert_eq!(item.id, ItemId::Text("550".to_string()));

        let item = StoredDocument::from_value(json!({ "id": 1399 }), ContentType::Tv).unwrap();
        assert_eq!(item.id, ItemId::Int(1399));
        assert_eq!(item.content_type, ContentType::Tv);

        assert!(StoredDocument::from_value(json!({ "title": "No id" }), ContentType::Movie).is_none());
    }

    #[test]
    fn test_decode_accepts_both_named_shapes() {
        let item = StoredDocument::from_value(
            json!({
                "_id": 1,
                "genres": ["Drama", { "id": 80, "name": "Crime" }, 18],
                "cast": [{ "id": 287, "name": "Brad Pitt" }],
                "keywords": null
            }),
            ContentType::Movie,
        )
        .unwrap();

        assert_eq!(
            item.genres,
            vec![
                NamedRef::named("Drama"),
                NamedRef {
                    id: Some(ItemId::Int(80)),
                    name: "Crime".to_string()
                }
            ]
        );
        assert_eq!(item.cast[0].name, "Brad Pitt");
        assert!(item.keywords.is_empty());
    }

    #[test]
    fn test_decode_vector_and_similarity() {
        let item = StoredDocument::from_value(
            json!({ "_id": 1, "$vector": { "data": [0.5, 0.25] }, "$similarity": 0.9 }),
            ContentType::Movie,
        )
        .unwrap();

        assert_eq!(item.embedding, Some(vec![0.5, 0.25]));
        assert_eq!(item.similarity, Some(0.9));
        assert!(!item.extra.contains_key("$vector"));
    }

    #[test]
    fn test_decode_watch_providers_and_extra_fields() {
        let item = StoredDocument::from_value(
            json!({
                "_id": 1,
                "poster_path": "/p.jpg",
                "searchName": "fight club",
                "watch_providers": {
                    "US": { "stream": ["Hulu"], "buy": ["Apple TV"] },
                    "XX": "garbage"
                }
            }),
            ContentType::Movie,
        )
        .unwrap();

        assert_eq!(item.watch_providers.len(), 1);
        assert_eq!(item.watch_providers["US"].stream, vec!["Hulu"]);
        assert!(item.watch_providers["US"].rent.is_empty());
        assert_eq!(item.extra["poster_path"], "/p.jpg");
        assert!(!item.extra.contains_key("searchName"));
    }
}
