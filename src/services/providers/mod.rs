/// Metadata / recommendation provider abstraction
///
/// The suggestion engine only talks to the provider through this trait, so
/// the HTTP client can be swapped for a stub in tests.
use crate::{
    error::AppResult,
    models::{Candidate, GenreCatalog, MediaKind},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for metadata providers
///
/// Every call is stateless from the caller's point of view. An empty result
/// is `Ok(vec![])`, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search titles by name; best match first
    async fn search_by_title(&self, kind: MediaKind, name: &str) -> AppResult<Vec<Candidate>>;

    /// Look titles up by the rating site's identifier; may be empty
    async fn search_by_external_id(
        &self,
        kind: MediaKind,
        external_id: &str,
    ) -> AppResult<Vec<Candidate>>;

    /// Titles the provider recommends for one of its own ids
    async fn recommendations(&self, kind: MediaKind, provider_id: u64)
        -> AppResult<Vec<Candidate>>;

    /// Genre id to name mapping for the kind
    async fn genre_catalog(&self, kind: MediaKind) -> AppResult<GenreCatalog>;

    /// Cheap authenticated call so a bad key fails before any long-running work
    async fn verify_api_key(&self) -> AppResult<()>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
