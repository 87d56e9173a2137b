use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{ContentType, PaymentType},
};

/// Raw search parameters as they arrive on the query string
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub person: Option<String>,
    pub genre: Option<String>,
    pub keywords: Option<String>,
    pub language: Option<String>,
    pub providers: Option<String>,
    pub payment_types: Option<String>,
    pub movie_id: Option<String>,
    pub content_types: Option<String>,
    pub limit: Option<String>,
    pub show_similar: Option<String>,
}

/// Result-count bounds applied while parsing requests
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl Limits {
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

/// Facet selections that narrow the document set
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterSelection {
    pub persons: Vec<String>,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    pub languages: Vec<String>,
    pub providers: Vec<String>,
    pub payment_types: Vec<PaymentType>,
}

impl FilterSelection {
    /// Number of individual facet values, payment types excluded
    pub fn facet_count(&self) -> usize {
        self.persons.len()
            + self.genres.len()
            + self.keywords.len()
            + self.languages.len()
            + self.providers.len()
    }

    /// True when only genres (and possibly payment types) are selected
    pub fn is_genre_only(&self) -> bool {
        !self.genres.is_empty()
            && self.persons.is_empty()
            && self.keywords.is_empty()
            && self.languages.is_empty()
            && self.providers.is_empty()
    }
}

/// A parsed, validated search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub selection: FilterSelection,
    pub movie_ids: Vec<String>,
    pub content_types: Vec<ContentType>,
    pub limit: usize,
    pub show_similar: bool,
}

impl SearchRequest {
    /// A bare browse over the given collections
    pub fn discover(content_types: Vec<ContentType>, limit: usize) -> Self {
        Self {
            query: None,
            selection: FilterSelection::default(),
            movie_ids: Vec::new(),
            content_types,
            limit,
            show_similar: false,
        }
    }

    /// True when nothing but collections, payment types and limit is set
    pub fn is_discover(&self) -> bool {
        self.query.is_none()
            && self.movie_ids.is_empty()
            && !self.show_similar
            && self.selection.facet_count() == 0
    }

    /// True for a genre browse with no other narrowing
    pub fn is_genre_browse(&self) -> bool {
        self.query.is_none()
            && self.movie_ids.is_empty()
            && !self.show_similar
            && self.selection.is_genre_only()
    }
}

impl SearchParams {
    /// Validates and normalizes the raw parameters
    ///
    /// Fails only on values that can never be satisfied (unknown content or
    /// payment types); everything else is normalized.
    pub fn into_request(self, limits: &Limits) -> AppResult<SearchRequest> {
        let content_types = parse_content_types(self.content_types.as_deref())?;
        let payment_types = parse_payment_types(self.payment_types.as_deref())?;

        let query = self
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| q.chars().count() >= 2);

        Ok(SearchRequest {
            query,
            selection: FilterSelection {
                persons: split_list(self.person.as_deref()),
                genres: split_list(self.genre.as_deref()),
                keywords: split_list(self.keywords.as_deref()),
                languages: split_list(self.language.as_deref())
                    .into_iter()
                    .map(|l| l.to_lowercase())
                    .collect(),
                providers: split_list(self.providers.as_deref()),
                payment_types,
            },
            movie_ids: split_list(self.movie_id.as_deref()),
            content_types,
            limit: limits.resolve(parse_limit(self.limit.as_deref())),
            show_similar: parse_flag(self.show_similar.as_deref()),
        })
    }
}

/// Splits a comma list, trimming entries and dropping blanks and repeats
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for part in raw.unwrap_or_default().split(',') {
        let part = part.trim();
        if !part.is_empty() && !values.iter().any(|v| v == part) {
            values.push(part.to_string());
        }
    }
    values
}

/// A positive integer limit; anything else means "use the default"
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&limit| limit > 0)
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes" | "on")
    )
}

/// Parses `content_types`, defaulting to every collection
pub fn parse_content_types(raw: Option<&str>) -> AppResult<Vec<ContentType>> {
    let mut types = Vec::new();
    for value in split_list(raw) {
        let content_type = ContentType::from_param(&value)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown content type: {}", value)))?;
        types.push(content_type);
    }

    if types.is_empty() {
        return Ok(ContentType::ALL.to_vec());
    }

    types.sort();
    types.dedup();
    Ok(types)
}

fn parse_payment_types(raw: Option<&str>) -> AppResult<Vec<PaymentType>> {
    let mut types = Vec::new();
    for value in split_list(raw) {
        let payment_type = PaymentType::from_param(&value)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown payment type: {}", value)))?;
        types.push(payment_type);
    }
    types.sort();
    types.dedup();
    Ok(types)
}
