use std::collections::HashSet;

use crate::models::{GenreCatalog, Suggestion};

/// Marks a token as an exclusion ("-horror")
pub const EXCLUDE_MARKER: char = '-';

/// Required and forbidden genres, lower-cased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl GenreFilter {
    /// Builds a filter from user tokens; empty tokens are ignored
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut filter = GenreFilter::default();

        for token in tokens {
            let token = token.as_ref().trim().to_lowercase();
            match token.strip_prefix(EXCLUDE_MARKER) {
                Some(genre) if !genre.trim().is_empty() => {
                    filter.exclude.push(genre.trim().to_string())
                }
                Some(_) => {}
                None if !token.is_empty() => filter.include.push(token.clone()),
                None => {}
            }
        }

        filter
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// True when `genres` (lower-cased) holds every inclusion and no exclusion
    pub fn matches(&self, genres: &HashSet<String>) -> bool {
        self.include.iter().all(|genre| genres.contains(genre))
            && !self.exclude.iter().any(|genre| genres.contains(genre))
    }

    /// Suggestions whose genres pass, in input order
    pub fn apply<'a, I>(&self, suggestions: I, catalog: &GenreCatalog) -> Vec<&'a Suggestion>
    where
        I: IntoIterator<Item = &'a Suggestion>,
    {
        if self.is_empty() {
            return suggestions.into_iter().collect();
        }

        suggestions
            .into_iter()
            .filter(|suggestion| {
                let genres: HashSet<String> = catalog
                    .lowercase_names(&suggestion.candidate.genre_ids)
                    .into_iter()
                    .collect();
                self.matches(&genres)
            })
            .collect()
    }
}
