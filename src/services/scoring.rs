//! Suggestion scores
//!
//! Both scores are non-negative and higher is better. Lists are sorted
//! ascending, so the best suggestions are at the end.

use crate::models::{Contribution, ScoredResult};

/// The two scores of one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    /// Personalized score weighted by the provider's vote average
    pub blended: f64,
    /// Popularity, relevance and the user's own ratings only
    pub personalized: f64,
}

/// Scores a candidate from its popularity, provider vote average (0-10) and
/// the user ratings (0-10) of the titles that recommended it.
///
/// `ratings` must not be empty.
pub fn score(popularity: f64, vote_average: f64, ratings: &[f64]) -> Scores {
    debug_assert!(!ratings.is_empty(), "a candidate needs at least one rating");
    let count = ratings.len() as f64;

    // Popularity is open-ended (roughly 100 for an old favourite, 2000 for a hyped
    // release); arctan flattens it into (0, pi/2)
    let popularity_score = popularity.max(0.0).atan();
    // More of the user's titles pointing here counts, with diminishing returns
    let relevance_score = (count * 10.0).sqrt().atan();
    // Circular shape: climbing from mediocre matters more than near-perfect
    let vote_average_score = (vote_average / 10.0).max(0.0).sqrt();
    // Mean of the contributing user ratings, scaled to 0..1
    let similar_average_score = (ratings.iter().sum::<f64>() / 10.0) / count;

    let personalized = popularity_score * similar_average_score * relevance_score;
    Scores {
        blended: personalized * vote_average_score,
        personalized,
    }
}

/// Scores one accumulated candidate
pub fn score_contribution(contribution: &Contribution) -> ScoredResult {
    let candidate = &contribution.candidate;
    let scores = score(
        candidate.popularity,
        candidate.vote_average,
        &contribution.ratings,
    );

    ScoredResult {
        title: candidate.title.clone(),
        blended_score: scores.blended,
        personalized_score: scores.personalized,
        contribution_count: contribution.ratings.len(),
        candidate: candidate.clone(),
    }
}
