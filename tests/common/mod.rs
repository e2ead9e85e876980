#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use media_suggest::{
    error::{AppError, AppResult},
    models::{Candidate, GenreCatalog, MediaKind, RatedItem},
    services::providers::MetadataProvider,
};

/// In-memory provider with canned lookups
#[derive(Default)]
pub struct StubProvider {
    by_external_id: HashMap<String, Vec<Candidate>>,
    by_title: HashMap<String, Vec<Candidate>>,
    recommendations: HashMap<u64, Vec<Candidate>>,
    genres: HashMap<MediaKind, GenreCatalog>,
    failing_ids: HashMap<String, fn() -> AppError>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_external_id(mut self, external_id: &str, matches: Vec<Candidate>) -> Self {
        self.by_external_id.insert(external_id.to_string(), matches);
        self
    }

    pub fn with_title(mut self, title: &str, matches: Vec<Candidate>) -> Self {
        self.by_title.insert(title.to_string(), matches);
        self
    }

    pub fn with_recommendations(mut self, id: u64, neighbors: Vec<Candidate>) -> Self {
        self.recommendations.insert(id, neighbors);
        self
    }

    pub fn with_genres(mut self, kind: MediaKind, genres: &[(u32, &str)]) -> Self {
        self.genres.insert(
            kind,
            genres
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
        );
        self
    }

    pub fn failing(mut self, external_id: &str, error: fn() -> AppError) -> Self {
        self.failing_ids.insert(external_id.to_string(), error);
        self
    }

    /// Number of provider lookups made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for StubProvider {
    async fn search_by_title(&self, _kind: MediaKind, name: &str) -> AppResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.by_title.get(name).cloned().unwrap_or_default())
    }

    async fn search_by_external_id(
        &self,
        _kind: MediaKind,
        external_id: &str,
    ) -> AppResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failing_ids.get(external_id) {
            return Err(error());
        }
        Ok(self
            .by_external_id
            .get(external_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn recommendations(&self, _kind: MediaKind, provider_id: u64) -> AppResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .recommendations
            .get(&provider_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn genre_catalog(&self, kind: MediaKind) -> AppResult<GenreCatalog> {
        Ok(self.genres.get(&kind).cloned().unwrap_or_default())
    }

    async fn verify_api_key(&self) -> AppResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub fn film(id: u64, title: &str, popularity: f64, vote_average: f64, genre_ids: Vec<u32>) -> Candidate {
    Candidate::new(
        MediaKind::Film,
        id,
        title,
        popularity,
        vote_average,
        genre_ids,
        Some("2010-01-01"),
    )
}

pub fn series(id: u64, title: &str, popularity: f64, vote_average: f64, genre_ids: Vec<u32>) -> Candidate {
    Candidate::new(
        MediaKind::Series,
        id,
        title,
        popularity,
        vote_average,
        genre_ids,
        Some("2015-09-30"),
    )
}

pub fn rated(external_id: &str, title: &str, rating: f64, kind: MediaKind) -> RatedItem {
    RatedItem {
        external_id: Some(external_id.to_string()),
        media_kind: kind,
        ..RatedItem::titled(title, rating)
    }
}
