use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Candidate;

/// Ratings of the user's titles that recommended one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    /// User ratings in the order they were contributed
    pub ratings: Vec<f64>,
    /// Latest snapshot the provider returned for the candidate
    pub candidate: Candidate,
}

/// Candidate id to its contributions, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ContributionSet {
    entries: Vec<Contribution>,
    index: HashMap<u64, usize>,
}

impl ContributionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rating` to the candidate's list and replaces its snapshot
    pub fn upsert(&mut self, candidate: Candidate, rating: f64) {
        match self.index.get(&candidate.id) {
            Some(&position) => {
                let entry = &mut self.entries[position];
                entry.ratings.push(rating);
                entry.candidate = candidate;
            }
            None => {
                self.index.insert(candidate.id, self.entries.len());
                self.entries.push(Contribution {
                    ratings: vec![rating],
                    candidate,
                });
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<&Contribution> {
        self.index.get(&id).map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contribution> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A candidate with both scores computed
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    pub title: String,
    pub blended_score: f64,
    pub personalized_score: f64,
    pub contribution_count: usize,
    pub candidate: Candidate,
}

/// Which of the two scores a ranked list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreVariant {
    /// Includes the provider's vote average
    Blended,
    /// Only the user's own ratings
    Personalized,
}

/// One ranked entry, persisted as `[title, [score, contribution_count, candidate]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SuggestionRecord", into = "SuggestionRecord")]
pub struct Suggestion {
    pub title: String,
    pub score: f64,
    pub contribution_count: usize,
    pub candidate: Candidate,
}

#[derive(Serialize, Deserialize)]
struct SuggestionRecord(String, (f64, usize, Candidate));

impl From<SuggestionRecord> for Suggestion {
    fn from(SuggestionRecord(title, (score, contribution_count, candidate)): SuggestionRecord) -> Self {
        Self {
            title,
            score,
            contribution_count,
            candidate,
        }
    }
}

impl From<Suggestion> for SuggestionRecord {
    fn from(suggestion: Suggestion) -> Self {
        SuggestionRecord(
            suggestion.title,
            (
                suggestion.score,
                suggestion.contribution_count,
                suggestion.candidate,
            ),
        )
    }
}

/// Both ranked lists for one media kind, each ascending by score (best last)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionSet {
    pub blended: Vec<Suggestion>,
    pub personalized: Vec<Suggestion>,
}

impl SuggestionSet {
    /// Ranks scored results; ties keep the input order
    pub fn from_scored(results: Vec<ScoredResult>) -> Self {
        let mut blended: Vec<Suggestion> = results
            .iter()
            .map(|result| Suggestion {
                title: result.title.clone(),
                score: result.blended_score,
                contribution_count: result.contribution_count,
                candidate: result.candidate.clone(),
            })
            .collect();
        let mut personalized: Vec<Suggestion> = results
            .into_iter()
            .map(|result| Suggestion {
                title: result.title,
                score: result.personalized_score,
                contribution_count: result.contribution_count,
                candidate: result.candidate,
            })
            .collect();

        blended.sort_by(|a, b| a.score.total_cmp(&b.score));
        personalized.sort_by(|a, b| a.score.total_cmp(&b.score));

        Self {
            blended,
            personalized,
        }
    }

    pub fn list(&self, variant: ScoreVariant) -> &[Suggestion] {
        match variant {
            ScoreVariant::Blended => &self.blended,
            ScoreVariant::Personalized => &self.personalized,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blended.is_empty() && self.personalized.is_empty()
    }
}
