use crate::models::{GenreCatalog, MediaKind, ScoreVariant};
use crate::services::genre_filter::EXCLUDE_MARKER;

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Preview a ranked list
    Suggest {
        kind: MediaKind,
        variant: ScoreVariant,
    },
    /// Print the genre catalog
    ListGenres,
    /// Preview the blended list filtered by genre tokens
    FilterGenres {
        kind: MediaKind,
        tokens: Vec<String>,
    },
    /// Reload ratings and regenerate every list
    Update,
    Quit,
    Empty,
    Unknown(String),
}

/// Each typed word must be a prefix of the command's word at the same position,
/// and the word counts must agree.
///
/// `command_matches("s tv p", "suggest tv personalized")` is true.
pub fn command_matches(input: &str, command: &str) -> bool {
    let typed: Vec<&str> = input.split_whitespace().collect();
    let words: Vec<&str> = command.split_whitespace().collect();

    typed.len() == words.len()
        && typed
            .iter()
            .zip(&words)
            .all(|(typed, word)| word.starts_with(typed))
}

const SUGGEST_COMMANDS: [(&str, MediaKind, ScoreVariant); 4] = [
    ("suggest", MediaKind::Film, ScoreVariant::Blended),
    ("suggest tv", MediaKind::Series, ScoreVariant::Blended),
    ("suggest personalized", MediaKind::Film, ScoreVariant::Personalized),
    ("suggest tv personalized", MediaKind::Series, ScoreVariant::Personalized),
];

impl Command {
    /// Parses a line; genre tokens are only accepted when every one names a
    /// genre in `catalog`
    pub fn parse(input: &str, catalog: &GenreCatalog) -> Command {
        let input = input.trim();
        if input.is_empty() {
            return Command::Empty;
        }

        for (command, kind, variant) in SUGGEST_COMMANDS {
            if command_matches(input, command) {
                return Command::Suggest { kind, variant };
            }
        }

        if command_matches(input, "genre") {
            return Command::ListGenres;
        }

        if let Some(tokens) = genre_tokens(input, catalog) {
            return Command::FilterGenres {
                kind: MediaKind::Film,
                tokens,
            };
        }

        if let Some((first, rest)) = input.split_once(char::is_whitespace) {
            if command_matches(first, "tv") {
                if let Some(tokens) = genre_tokens(rest, catalog) {
                    return Command::FilterGenres {
                        kind: MediaKind::Series,
                        tokens,
                    };
                }
            }
        }

        if command_matches(input, "update") {
            return Command::Update;
        }

        if command_matches(input, "quit") {
            return Command::Quit;
        }

        Command::Unknown(input.to_string())
    }
}

/// Comma-separated genre tokens, if all of them are known genres
fn genre_tokens(input: &str, catalog: &GenreCatalog) -> Option<Vec<String>> {
    let tokens: Vec<String> = input
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .collect();

    let all_known = tokens.iter().all(|token| {
        let genre = token.strip_prefix(EXCLUDE_MARKER).unwrap_or(token.as_str()).trim();
        !genre.is_empty() && catalog.contains_name(genre)
    });

    all_known.then_some(tokens)
}
