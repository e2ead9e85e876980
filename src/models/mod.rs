use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use crate::error::AppError;

pub mod rating;
pub mod suggestion;

pub use rating::{RatedItem, RatingSet};
pub use suggestion::{
    Contribution, ContributionSet, ScoreVariant, ScoredResult, Suggestion, SuggestionSet,
};

/// Kind of media the engine runs for
///
/// Carries the provider's path segment and the field names that differ
/// between movie and TV records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Film,
    Series,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Film, MediaKind::Series];

    /// Parses the rating export's title type ("movie", "tvSeries", "tvMiniSeries", ...)
    pub fn from_label(label: &str) -> Self {
        match label {
            "movie" => MediaKind::Film,
            _ => MediaKind::Series,
        }
    }

    pub fn path_segment(self) -> &'static str {
        match self {
            MediaKind::Film => "movie",
            MediaKind::Series => "tv",
        }
    }

    pub fn title_field(self) -> &'static str {
        match self {
            MediaKind::Film => "title",
            MediaKind::Series => "name",
        }
    }

    pub fn date_field(self) -> &'static str {
        match self {
            MediaKind::Film => "release_date",
            MediaKind::Series => "first_air_date",
        }
    }

    /// Field of the external-id lookup response holding this kind's matches
    pub fn find_results_field(self) -> &'static str {
        match self {
            MediaKind::Film => "movie_results",
            MediaKind::Series => "tv_results",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// A title returned by the provider (search hit or recommendation neighbor)
///
/// The provider's native record is kept verbatim and is what gets persisted;
/// the typed fields are read from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Candidate {
    pub id: u64,
    pub title: String,
    pub popularity: f64,
    pub vote_average: f64,
    pub genre_ids: Vec<u32>,
    pub release_date: Option<String>,
    raw: Value,
}

#[derive(Deserialize)]
struct CandidateFields {
    id: u64,
    #[serde(default)]
    popularity: Option<f64>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    genre_ids: Option<Vec<u32>>,
}

impl Candidate {
    /// Builds a candidate from a provider record of the given kind
    pub fn from_record(kind: MediaKind, record: Value) -> Result<Self, AppError> {
        let fields: CandidateFields = serde_json::from_value(record.clone())
            .map_err(|e| AppError::CorruptData(format!("Invalid {} record: {}", kind, e)))?;

        let title = record
            .get(kind.title_field())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::CorruptData(format!(
                    "{} record {} is missing '{}'",
                    kind,
                    fields.id,
                    kind.title_field()
                ))
            })?
            .to_string();

        let release_date = record
            .get(kind.date_field())
            .and_then(Value::as_str)
            .filter(|date| !date.is_empty())
            .map(str::to_string);

        Ok(Self {
            id: fields.id,
            title,
            popularity: fields.popularity.unwrap_or(0.0),
            vote_average: fields.vote_average.unwrap_or(0.0),
            genre_ids: fields.genre_ids.unwrap_or_default(),
            release_date,
            raw: record,
        })
    }

    /// Builds a candidate and a matching native record from plain values
    pub fn new(
        kind: MediaKind,
        id: u64,
        title: &str,
        popularity: f64,
        vote_average: f64,
        genre_ids: Vec<u32>,
        release_date: Option<&str>,
    ) -> Self {
        let mut record = serde_json::Map::new();
        record.insert("id".to_string(), Value::from(id));
        record.insert(kind.title_field().to_string(), Value::from(title));
        record.insert("popularity".to_string(), Value::from(popularity));
        record.insert("vote_average".to_string(), Value::from(vote_average));
        record.insert("genre_ids".to_string(), Value::from(genre_ids.clone()));
        record.insert(
            kind.date_field().to_string(),
            Value::from(release_date.unwrap_or_default()),
        );

        Self {
            id,
            title: title.to_string(),
            popularity,
            vote_average,
            genre_ids,
            release_date: release_date.map(str::to_string),
            raw: Value::Object(record),
        }
    }

    /// The provider's native record
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Release year, taken from the first four characters of the date
    pub fn year(&self) -> Option<&str> {
        self.release_date.as_deref().and_then(|date| date.get(..4))
    }
}

impl TryFrom<Value> for Candidate {
    type Error = AppError;

    fn try_from(record: Value) -> Result<Self, Self::Error> {
        let kind = MediaKind::ALL
            .into_iter()
            .find(|kind| record.get(kind.title_field()).is_some())
            .ok_or_else(|| AppError::CorruptData("Record has no title field".to_string()))?;
        Candidate::from_record(kind, record)
    }
}

impl From<Candidate> for Value {
    fn from(candidate: Candidate) -> Self {
        candidate.raw
    }
}

/// Provider genre id to display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreCatalog {
    genres: HashMap<u32, String>,
}

impl GenreCatalog {
    pub fn new(genres: HashMap<u32, String>) -> Self {
        Self { genres }
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.genres.get(&id).map(String::as_str)
    }

    /// Lower-cased names for the given ids; ids missing from the catalog are skipped
    pub fn lowercase_names(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.name(*id))
            .map(str::to_lowercase)
            .collect()
    }

    /// Adds the other catalog's entries, overwriting ids present in both
    pub fn merge(&mut self, other: GenreCatalog) {
        self.genres.extend(other.genres);
    }

    pub fn contains_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.genres.values().any(|g| g.to_lowercase() == name)
    }

    /// Entries ordered by name, for display
    pub fn sorted_by_name(&self) -> Vec<(&str, u32)> {
        let by_name: BTreeMap<&str, u32> = self
            .genres
            .iter()
            .map(|(id, name)| (name.as_str(), *id))
            .collect();
        by_name.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

impl FromIterator<(u32, String)> for GenreCatalog {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            genres: iter.into_iter().collect(),
        }
    }
}
