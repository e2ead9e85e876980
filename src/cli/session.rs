use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    cli::{
        command::Command,
        preview::{build_preview, render, render_genres},
    },
    error::{AppError, AppResult},
    models::{GenreCatalog, MediaKind, ScoreVariant, SuggestionSet},
    services::{
        aggregator::{aggregate, ConsoleProgress, ProgressSink, Silent},
        genre_filter::GenreFilter,
        providers::MetadataProvider,
        ratings::load_ratings,
    },
    store::SuggestionStore,
};

const OPTIONS: &str = "\
Options:
\t's[uggest] [tv]' \t- preview <media_type>_suggestions.txt
\t's[uggest] [tv] p[ersonalized]' \t- preview <media_type>_suggestions_p.txt
\t'g[enre]' \t- show genre options
\t'[tv] [-]<genre>, ...' \t- preview <media_type>_suggestions.txt filtered by genre[s]
\t'u[pdate]' \t- reload ratings and regenerate suggestion files
\t'q[uit]' \t- exit
";

/// How the suggestion lists were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepared {
    /// Read back from the store
    Cached,
    /// Regenerated from the ratings file
    Generated,
    /// No ratings file; nothing was written and the lists are unchanged
    NoRatings,
}

/// State of one interactive run: provider, genre catalog and the ranked lists
pub struct Session {
    provider: Arc<dyn MetadataProvider>,
    store: SuggestionStore,
    ratings_path: PathBuf,
    catalog: GenreCatalog,
    suggestions: HashMap<MediaKind, SuggestionSet>,
    item_count: usize,
    quiet: bool,
}

impl Session {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        store: SuggestionStore,
        ratings_path: PathBuf,
        item_count: usize,
        quiet: bool,
    ) -> Self {
        Self {
            provider,
            store,
            ratings_path,
            catalog: GenreCatalog::default(),
            suggestions: HashMap::new(),
            item_count,
            quiet,
        }
    }

    /// Fetches and merges the genre catalogs of every media kind
    pub async fn load_genres(&mut self) -> AppResult<()> {
        let mut catalog = GenreCatalog::default();
        for kind in MediaKind::ALL {
            catalog.merge(self.provider.genre_catalog(kind).await?);
        }
        self.catalog = catalog;
        Ok(())
    }

    pub fn suggestions(&self, kind: MediaKind) -> Option<&SuggestionSet> {
        self.suggestions.get(&kind)
    }

    /// Uses stored lists when all of them load cleanly, regenerates otherwise
    pub async fn prepare(&mut self, force_update: bool) -> AppResult<Prepared> {
        if !force_update && self.store.exists_all().await {
            match self.load_cached().await {
                Ok(cached) => {
                    self.suggestions = cached;
                    return Ok(Prepared::Cached);
                }
                Err(e @ AppError::CorruptData(_)) => {
                    tracing::warn!(error = %e, "Stored suggestions are unreadable, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        self.update().await
    }

    async fn load_cached(&self) -> AppResult<HashMap<MediaKind, SuggestionSet>> {
        let mut cached = HashMap::new();
        for kind in MediaKind::ALL {
            cached.insert(kind, self.store.load(kind).await?);
        }
        Ok(cached)
    }

    /// Reloads ratings, aggregates every media kind, then saves all lists
    ///
    /// Nothing is written unless every kind was aggregated. Without a ratings
    /// file the lists already loaded are kept.
    pub async fn update(&mut self) -> AppResult<Prepared> {
        let ratings = match load_ratings(&self.ratings_path) {
            Ok(ratings) => ratings,
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.ratings_path.display(), "Ratings file not found");
                return Ok(Prepared::NoRatings);
            }
            Err(e) => return Err(e),
        };

        let mut fresh = HashMap::new();
        for kind in MediaKind::ALL {
            let mut progress: Box<dyn ProgressSink> = if self.quiet {
                Box::new(Silent)
            } else {
                Box::new(ConsoleProgress)
            };
            let aggregation =
                aggregate(self.provider.as_ref(), &ratings, kind, progress.as_mut()).await?;
            fresh.insert(kind, aggregation.suggestions);
        }

        for (kind, suggestions) in &fresh {
            self.store.save(*kind, suggestions).await?;
        }
        self.suggestions = fresh;

        Ok(Prepared::Generated)
    }

    fn preview(&self, kind: MediaKind, variant: ScoreVariant, filter: &GenreFilter) -> String {
        let list = self
            .suggestions
            .get(&kind)
            .map(|set| set.list(variant))
            .unwrap_or_default();
        render(&build_preview(
            list,
            kind,
            &self.catalog,
            filter,
            self.item_count,
        ))
    }

    /// Output for commands that need no I/O beyond the in-memory lists
    pub fn respond(&self, command: &Command) -> Option<String> {
        match command {
            Command::Suggest { kind, variant } => {
                Some(self.preview(*kind, *variant, &GenreFilter::default()))
            }
            Command::ListGenres => Some(render_genres(&self.catalog)),
            Command::FilterGenres { kind, tokens } => Some(self.preview(
                *kind,
                ScoreVariant::Blended,
                &GenreFilter::parse(tokens),
            )),
            Command::Unknown(input) => Some(format!("Command '{}' didn't match.\n", input)),
            Command::Update | Command::Quit | Command::Empty => None,
        }
    }

    /// Prompt loop; returns on `quit` or end of input
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Note: All queries default to movie results.")?;
        writeln!(
            out,
            "Note: Personalized suggestions don't include the average rating."
        )?;

        let mut lines = input.lines();
        loop {
            write!(out, "{}Enter command: ", OPTIONS)?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                return Ok(());
            };

            let command = Command::parse(&line, &self.catalog);
            match &command {
                Command::Quit => return Ok(()),
                Command::Update => match self.update().await {
                    Ok(Prepared::NoRatings) => writeln!(
                        out,
                        "No ratings found at {}; export your ratings there and run update again.",
                        self.ratings_path.display()
                    )?,
                    Ok(_) => writeln!(out, "Suggestions updated.")?,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => writeln!(out, "Update failed: {}", e)?,
                },
                other => {
                    if let Some(text) = self.respond(other) {
                        write!(out, "{}", text)?;
                    }
                }
            }
        }
    }
}
