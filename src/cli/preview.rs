use std::fmt::Write;

use crate::{
    models::{GenreCatalog, MediaKind, Suggestion},
    services::genre_filter::GenreFilter,
};

const TMDB_WEB_URL: &str = "https://www.themoviedb.org";

/// One suggestion as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEntry {
    pub title: String,
    pub year: Option<String>,
    pub score: f64,
    pub relevance: usize,
    pub genres: Vec<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub link: String,
}

/// Best-first entries of an ascending list, filtered and truncated to `item_count`
pub fn build_preview(
    suggestions: &[Suggestion],
    kind: MediaKind,
    catalog: &GenreCatalog,
    filter: &GenreFilter,
    item_count: usize,
) -> Vec<PreviewEntry> {
    filter
        .apply(suggestions.iter().rev(), catalog)
        .into_iter()
        .take(item_count)
        .map(|suggestion| {
            let candidate = &suggestion.candidate;
            PreviewEntry {
                title: suggestion.title.clone(),
                year: candidate.year().map(str::to_string),
                score: suggestion.score,
                relevance: suggestion.contribution_count,
                genres: candidate
                    .genre_ids
                    .iter()
                    .filter_map(|id| catalog.name(*id))
                    .map(str::to_string)
                    .collect(),
                popularity: candidate.popularity,
                vote_average: candidate.vote_average,
                link: format!("{}/{}/{}", TMDB_WEB_URL, kind.path_segment(), candidate.id),
            }
        })
        .collect()
}

/// Plain-text listing of preview entries
pub fn render(entries: &[PreviewEntry]) -> String {
    if entries.is_empty() {
        return "No suggestions available.\n".to_string();
    }

    let mut text = String::new();
    for entry in entries {
        let _ = writeln!(
            text,
            "{} ({}) (match {:.2}, relevance {})",
            entry.title,
            entry.year.as_deref().unwrap_or("?"),
            entry.score,
            entry.relevance
        );
        let _ = writeln!(text, "\tGenres: {}", entry.genres.join(", "));
        let _ = writeln!(text, "\tPopularity: {}", entry.popularity);
        let _ = writeln!(text, "\tRating: {}", entry.vote_average);
        let _ = writeln!(text, "\t{}", entry.link);
    }
    text
}

/// Genre catalog as "name - id" lines, ordered by name
pub fn render_genres(catalog: &GenreCatalog) -> String {
    let mut text = String::from("Genres:\n");
    for (name, id) in catalog.sorted_by_name() {
        let _ = writeln!(text, "\t{} - {}", name, id);
    }
    text
}
