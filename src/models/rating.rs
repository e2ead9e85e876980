use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::MediaKind;

/// One row of the user's rating export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatedItem {
    /// Rating site identifier (e.g. "tt1375666"); absent in title-only exports
    pub external_id: Option<String>,
    pub user_rating: f64,
    pub title: String,
    pub media_kind: MediaKind,
    pub rate_date: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<String>,
    pub genres: Vec<String>,
    pub provider_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub director: Option<String>,
}

impl RatedItem {
    /// Minimal item for title-only exports
    pub fn titled(title: impl Into<String>, user_rating: f64) -> Self {
        Self {
            external_id: None,
            user_rating,
            title: title.into(),
            media_kind: MediaKind::Film,
            rate_date: None,
            link: None,
            release_date: None,
            genres: Vec::new(),
            provider_average: None,
            vote_count: None,
            director: None,
        }
    }
}

/// Rated items keyed by title
///
/// A later item with the same title replaces the earlier one but keeps its
/// position, so iteration order is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct RatingSet {
    items: Vec<RatedItem>,
    index: HashMap<String, usize>,
}

impl RatingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: RatedItem) {
        match self.index.get(&item.title) {
            Some(&position) => self.items[position] = item,
            None => {
                self.index.insert(item.title.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&RatedItem> {
        self.index.get(title).map(|&position| &self.items[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatedItem> {
        self.items.iter()
    }

    /// Items of the given kind, in set order
    pub fn of_kind(&self, kind: MediaKind) -> impl Iterator<Item = &RatedItem> {
        self.iter().filter(move |item| item.media_kind == kind)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<RatedItem> for RatingSet {
    fn from_iter<I: IntoIterator<Item = RatedItem>>(iter: I) -> Self {
        let mut set = RatingSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}
