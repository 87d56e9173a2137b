use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt::Display};

/// Identity of a media item as assigned by the upstream metadata source
///
/// Stored documents carry either a numeric TMDB id or its string form, so both
/// are accepted and kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl ItemId {
    /// Every stored representation a user-supplied id may have been written as
    pub fn lookup_values(raw: &str) -> Vec<Value> {
        let raw = raw.trim();
        let mut values = vec![Value::String(raw.to_string())];
        if let Ok(n) = raw.parse::<i64>() {
            values.push(Value::from(n));
        }
        values
    }

    /// True when `raw` names this id in either representation
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            ItemId::Int(n) => raw.trim().parse::<i64>().ok() == Some(*n),
            ItemId::Text(s) => s == raw.trim(),
        }
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{}", id),
            ItemId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// Collection an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Tv,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Movie, ContentType::Tv];

    /// Parses a `content_types` request value
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "movies" | "movie" => Some(ContentType::Movie),
            "tvshows" | "tvshow" | "tv" | "shows" => Some(ContentType::Tv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Tv => "tv",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a title can be watched through a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Stream,
    Rent,
    Buy,
}

impl PaymentType {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "stream" => Some(PaymentType::Stream),
            "rent" => Some(PaymentType::Rent),
            "buy" => Some(PaymentType::Buy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Stream => "stream",
            PaymentType::Rent => "rent",
            PaymentType::Buy => "buy",
        }
    }
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A genre, cast member or keyword attached to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub name: String,
}

impl NamedRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// Provider names for one region, split by payment type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionProviders {
    #[serde(default)]
    pub stream: Vec<String>,
    #[serde(default)]
    pub rent: Vec<String>,
    #[serde(default)]
    pub buy: Vec<String>,
}

/// A movie or TV show as returned to clients
///
/// Built once at the storage boundary from whatever shape the store returned;
/// fields the pipeline does not interpret are kept in `extra` and passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: ItemId,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub cast: Vec<NamedRef>,
    #[serde(default)]
    pub keywords: Vec<NamedRef>,
    #[serde(default)]
    pub watch_providers: BTreeMap<String, RegionProviders>,
    /// Vector similarity to the query, present only on vector-sorted results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaItem {
    pub fn new(id: ItemId, content_type: ContentType) -> Self {
        Self {
            id,
            content_type,
            title: None,
            name: None,
            overview: None,
            popularity: None,
            vote_average: None,
            release_date: None,
            first_air_date: None,
            original_language: None,
            genres: Vec::new(),
            cast: Vec::new(),
            keywords: Vec::new(),
            watch_providers: BTreeMap::new(),
            similarity: None,
            embedding: None,
            extra: Map::new(),
        }
    }

    /// Movies carry `title`, shows carry `name`
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }

    /// Popularity used for ranking, missing values rank as zero
    pub fn rank_popularity(&self) -> f64 {
        self.popularity.unwrap_or(0.0)
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }

    /// Identity scoped to the item's collection
    pub fn key(&self) -> (ContentType, &ItemId) {
        (self.content_type, &self.id)
    }
}
