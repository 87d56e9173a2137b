/// TMDB metadata pass-through
///
/// Keeps the API key server-side: clients call `/tmdb/{path}?...` and the
/// request is forwarded to `{base_url}/{path}` with `api_key` appended.
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};

/// Upstream answer, status preserved
#[derive(Debug, Clone, PartialEq)]
pub struct TmdbResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>, base_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> AppResult<String> {
        Ok(format!("{}/{}", self.base_url, validate_path(path)?))
    }

    /// Forwards a GET to TMDB
    pub async fn proxy(&self, path: &str, params: &[(String, String)]) -> AppResult<TmdbResponse> {
        let url = self.url_for(path)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Internal("TMDB_API_KEY is not set".to_string()))?;

        let mut query = forwarded_params(params);
        query.push(("api_key".to_string(), api_key.to_string()));

        let start = Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("TMDB request for {} timed out", path))
                } else {
                    AppError::HttpClient(e)
                }
            })?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("TMDB returned a non-JSON body: {}", e)))?;

        tracing::info!(
            path = %path,
            status = status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "TMDB request proxied"
        );

        Ok(TmdbResponse { status, body })
    }
}

/// Rejects anything that could escape the TMDB base path
fn validate_path(path: &str) -> AppResult<&str> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return Err(AppError::InvalidInput(
            "Missing required path".to_string(),
        ));
    }

    let allowed = path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'));
    let traverses = path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if !allowed || traverses {
        return Err(AppError::InvalidInput(format!("Invalid TMDB path: {}", path)));
    }

    Ok(path)
}

/// Client parameters minus blanks and any attempt to supply the key
fn forwarded_params(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(key, value)| !value.is_empty() && key != "api_key" && key != "path")
        .cloned()
        .collect()
}
