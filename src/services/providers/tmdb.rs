/// TMDb (The Movie Database) API provider
///
/// All four lookups go through one request helper that adds the API key and
/// language query parameters, applies the per-request timeout and retries
/// transient failures.
///
/// API Flow:
/// 1. Identity: /find/{imdb_id}?external_source=imdb_id → {movie|tv}_results
///    (or /search/{movie|tv}?query= for title-only ratings)
/// 2. Neighbors: /{movie|tv}/{id}/recommendations → results
/// 3. Genres: /genre/{movie|tv}/list → genres
use crate::{
    config::Settings,
    error::{AppError, AppResult},
    models::{Candidate, GenreCatalog, MediaKind},
    services::{
        providers::MetadataProvider,
        retry::{retry_with_backoff, RetryPolicy},
    },
};
use reqwest::{header::RETRY_AFTER, Client as HttpClient, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Everything the client needs, fixed for the session
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub api_url: String,
    pub language: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl TmdbConfig {
    pub fn from_settings(settings: &Settings, api_key: String) -> Self {
        Self {
            api_key,
            api_url: settings.api_url.clone(),
            language: settings.language.clone(),
            timeout: settings.request_timeout(),
            retry: RetryPolicy {
                max_retries: settings.max_retries,
                ..RetryPolicy::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    id: u32,
    name: String,
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: Url,
    language: String,
    retry: RetryPolicy,
}

impl TmdbProvider {
    pub fn new(config: TmdbConfig) -> AppResult<Self> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            AppError::Config(format!("Invalid API URL '{}': {}", config.api_url, e))
        })?;
        if api_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "API URL '{}' cannot be used as a base",
                config.api_url
            )));
        }

        let http_client = HttpClient::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http_client,
            api_key: config.api_key,
            api_url,
            language: config.language,
            retry: config.retry,
        })
    }

    /// Base URL with the given path segments appended (each one escaped)
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json(&self, segments: &[&str], params: &[(&str, &str)]) -> AppResult<Value> {
        retry_with_backoff(&self.retry, || self.get_json_once(segments, params)).await
    }

    async fn get_json_once(&self, segments: &[&str], params: &[(&str, &str)]) -> AppResult<Value> {
        let url = self.endpoint(segments);

        let response = self
            .http_client
            .get(url.clone())
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, retry_after, &body));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %url.path(),
                "Failed to deserialize TMDb response"
            );
            AppError::CorruptData(format!("Failed to parse TMDb response: {}", e))
        })
    }
}

/// Maps a non-success status to the error taxonomy
fn classify_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::Auth(format!("TMDb returned {}: {}", status, body)),
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited { retry_after },
        s if s.is_server_error() => {
            AppError::Unavailable(format!("TMDb returned status {}: {}", status, body))
        }
        _ => AppError::ExternalApi(format!("TMDb returned status {}: {}", status, body)),
    }
}

/// Retry-After in delta-seconds form; HTTP dates are ignored
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Candidates from a JSON array; malformed entries are skipped
fn parse_candidates(kind: MediaKind, results: Option<&Value>) -> Vec<Candidate> {
    let Some(results) = results.and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|record| match Candidate::from_record(kind, record.clone()) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                tracing::debug!(error = %e, kind = %kind, "Skipping malformed TMDb record");
                None
            }
        })
        .collect()
}

fn parse_genres(body: Value) -> AppResult<GenreCatalog> {
    let response: GenreListResponse = serde_json::from_value(body)
        .map_err(|e| AppError::CorruptData(format!("Invalid genre list: {}", e)))?;
    Ok(response
        .genres
        .into_iter()
        .map(|genre| (genre.id, genre.name))
        .collect())
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_by_title(&self, kind: MediaKind, name: &str) -> AppResult<Vec<Candidate>> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .get_json(&["search", kind.path_segment()], &[("query", name)])
            .await?;
        let candidates = parse_candidates(kind, body.get("results"));

        tracing::debug!(
            query = %name,
            kind = %kind,
            results = candidates.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(candidates)
    }

    async fn search_by_external_id(
        &self,
        kind: MediaKind,
        external_id: &str,
    ) -> AppResult<Vec<Candidate>> {
        if external_id.trim().is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .get_json(&["find", external_id], &[("external_source", "imdb_id")])
            .await?;
        Ok(parse_candidates(kind, body.get(kind.find_results_field())))
    }

    async fn recommendations(
        &self,
        kind: MediaKind,
        provider_id: u64,
    ) -> AppResult<Vec<Candidate>> {
        let id = provider_id.to_string();
        let body = self
            .get_json(&[kind.path_segment(), id.as_str(), "recommendations"], &[])
            .await?;
        let candidates = parse_candidates(kind, body.get("results"));

        tracing::debug!(
            provider_id = provider_id,
            kind = %kind,
            results = candidates.len(),
            provider = "tmdb",
            "Recommendations fetched"
        );

        Ok(candidates)
    }

    async fn genre_catalog(&self, kind: MediaKind) -> AppResult<GenreCatalog> {
        let body = self
            .get_json(&["genre", kind.path_segment(), "list"], &[])
            .await?;
        let catalog = parse_genres(body)?;

        tracing::info!(kind = %kind, genres = catalog.len(), "Genre catalog loaded");

        Ok(catalog)
    }

    async fn verify_api_key(&self) -> AppResult<()> {
        self.get_json(&["configuration"], &[]).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
