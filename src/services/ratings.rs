use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{MediaKind, RatedItem, RatingSet},
};

/// Columns of the full rating export
const COL_EXTERNAL_ID: usize = 0;
const COL_USER_RATING: usize = 1;
const COL_RATE_DATE: usize = 2;
const COL_TITLE: usize = 3;
const COL_LINK: usize = 4;
const COL_TITLE_TYPE: usize = 5;
const COL_PROVIDER_AVERAGE: usize = 6;
const COL_GENRES: usize = 9;
const COL_VOTE_COUNT: usize = 10;
const COL_RELEASE_DATE: usize = 11;
const COL_DIRECTOR: usize = 12;
const FULL_COLUMNS: usize = 13;

/// Columns of the title-only export
const SIMPLE_COL_TITLE: usize = 0;
const SIMPLE_COL_USER_RATING: usize = 1;
const SIMPLE_COLUMNS: usize = 2;

/// Column layout of a ratings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingsLayout {
    /// Rating site export: id, rating, date, title, link, type, average, ..., director
    Full,
    /// Just title and rating
    TitleOnly,
}

impl RatingsLayout {
    /// Full when the header is wide enough, title-only otherwise
    fn detect(header: &ByteRecord) -> Self {
        if header.len() >= FULL_COLUMNS {
            RatingsLayout::Full
        } else {
            RatingsLayout::TitleOnly
        }
    }

    fn min_columns(self) -> usize {
        match self {
            RatingsLayout::Full => FULL_COLUMNS,
            RatingsLayout::TitleOnly => SIMPLE_COLUMNS,
        }
    }
}

/// Loads a ratings export from disk
pub fn load_ratings(path: &Path) -> AppResult<RatingSet> {
    let file = std::fs::File::open(path)?;
    let ratings = parse_ratings(file)?;

    tracing::info!(
        path = %path.display(),
        ratings = ratings.len(),
        "Loaded ratings"
    );

    Ok(ratings)
}

/// Parses a ratings export; the first row is a header and is discarded
///
/// Bytes are decoded as ISO-8859-1, which is what the rating site exports.
pub fn parse_ratings<R: Read>(reader: R) -> AppResult<RatingSet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let layout = RatingsLayout::detect(reader.byte_headers()?);
    tracing::debug!(layout = ?layout, "Detected ratings layout");

    let mut ratings = RatingSet::new();
    let mut record = ByteRecord::new();
    // Row 0 is the header
    let mut row = 1;

    while reader.read_byte_record(&mut record)? {
        ratings.insert(parse_row(&record, layout, row)?);
        row += 1;
    }

    Ok(ratings)
}

fn parse_row(record: &ByteRecord, layout: RatingsLayout, row: usize) -> AppResult<RatedItem> {
    if record.len() < layout.min_columns() {
        return Err(AppError::Parse(format!(
            "row {} has {} fields, expected at least {}",
            row,
            record.len(),
            layout.min_columns()
        )));
    }

    let field = |index: usize| latin1(record.get(index).unwrap_or_default());
    let optional = |index: usize| Some(field(index)).filter(|value| !value.trim().is_empty());

    match layout {
        RatingsLayout::TitleOnly => Ok(RatedItem::titled(
            field(SIMPLE_COL_TITLE),
            parse_number(&field(SIMPLE_COL_USER_RATING), "rating", row)?,
        )),
        RatingsLayout::Full => Ok(RatedItem {
            external_id: optional(COL_EXTERNAL_ID),
            user_rating: parse_number(&field(COL_USER_RATING), "rating", row)?,
            title: field(COL_TITLE),
            media_kind: MediaKind::from_label(&field(COL_TITLE_TYPE)),
            rate_date: optional(COL_RATE_DATE),
            link: optional(COL_LINK),
            release_date: optional(COL_RELEASE_DATE),
            genres: field(COL_GENRES)
                .split(", ")
                .filter(|genre| !genre.is_empty())
                .map(str::to_string)
                .collect(),
            provider_average: optional(COL_PROVIDER_AVERAGE)
                .map(|value| parse_number(&value, "average rating", row))
                .transpose()?,
            vote_count: optional(COL_VOTE_COUNT)
                .map(|value| parse_number::<u64>(&value, "vote count", row))
                .transpose()?,
            director: optional(COL_DIRECTOR),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str, row: usize) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Parse(format!("row {} has a non-numeric {}: '{}'", row, what, value)))
}

/// ISO-8859-1: every byte is the code point of the same value
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HEADER: &str = "Const,Your Rating,Date Rated,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors\n";

    #[test]
    fn test_parse_full_row() {
        let csv = format!(
            "{}tt0133093,9,2020-01-02,The Matrix,https://www.imdb.com/title/tt0133093/,movie,8.7,136,1999,\"Action, Sci-Fi\",1900000,1999-03-31,\"Lana Wachowski, Lilly Wachowski\"\n",
            FULL_HEADER
        );

        let ratings = parse_ratings(csv.as_bytes()).unwrap();
        let matrix = ratings.get("The Matrix").unwrap();
        assert_eq!(matrix.external_id.as_deref(), Some("tt0133093"));
        assert_eq!(matrix.user_rating, 9.0);
        assert_eq!(matrix.media_kind, MediaKind::Film);
        assert_eq!(matrix.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(matrix.provider_average, Some(8.7));
        assert_eq!(matrix.vote_count, Some(1_900_000));
        assert_eq!(matrix.release_date.as_deref(), Some("1999-03-31"));
        assert_eq!(matrix.director.as_deref(), Some("Lana Wachowski, Lilly Wachowski"));
    }

    #[test]
    fn test_series_label_and_empty_optionals() {
        let csv = format!(
            "{}tt0903747,10,2021-05-05,Breaking Bad,,tvSeries,,49,2008,Drama,,2008-01-20,\n",
            FULL_HEADER
        );

        let ratings = parse_ratings(csv.as_bytes()).unwrap();
        let show = ratings.get("Breaking Bad").unwrap();
        assert_eq!(show.media_kind, MediaKind::Series);
        assert_eq!(show.provider_average, None);
        assert_eq!(show.vote_count, None);
        assert_eq!(show.link, None);
        assert_eq!(show.director, None);
    }

    #[test]
    fn test_latin1_titles_preserved() {
        let mut bytes = FULL_HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"tt0211915,8,2020-01-01,Am\xe9lie,,movie,8.3,122,2001,Comedy,700000,2001-04-25,Jean-Pierre Jeunet\n");

        let ratings = parse_ratings(bytes.as_slice()).unwrap();
        assert!(ratings.get("Amélie").is_some());
    }

    #[test]
    fn test_last_duplicate_title_wins() {
        let csv = format!(
            "{h}tt1,5,,Dup,,movie,,,,,,,\ntt2,8,,Other,,movie,,,,,,,\ntt3,7,,Dup,,movie,,,,,,,\n",
            h = FULL_HEADER
        );

        let ratings = parse_ratings(csv.as_bytes()).unwrap();
        assert_eq!(ratings.len(), 2);
        let dup = ratings.get("Dup").unwrap();
        assert_eq!(dup.external_id.as_deref(), Some("tt3"));
        assert_eq!(dup.user_rating, 7.0);
    }

    #[test]
    fn test_too_few_fields_is_parse_error() {
        let csv = format!("{}tt1,5,2020-01-01,Short\n", FULL_HEADER);
        let result = parse_ratings(csv.as_bytes());
        assert!(matches!(result, Err(AppError::Parse(msg)) if msg.contains("row 1")));
    }

    #[test]
    fn test_non_numeric_rating_is_parse_error() {
        let csv = format!("{}tt1,great,,Title,,movie,,,,,,,\n", FULL_HEADER);
        assert!(matches!(parse_ratings(csv.as_bytes()), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_title_only_layout() {
        let csv = "title,rating\nAlpha,9\nBeta,6.5\n";

        let ratings = parse_ratings(csv.as_bytes()).unwrap();
        assert_eq!(ratings.len(), 2);
        let beta = ratings.get("Beta").unwrap();
        assert_eq!(beta.user_rating, 6.5);
        assert_eq!(beta.external_id, None);
        assert_eq!(beta.media_kind, MediaKind::Film);
    }

    #[test]
    fn test_header_only_is_empty() {
        let ratings = parse_ratings(FULL_HEADER.as_bytes()).unwrap();
        assert!(ratings.is_empty());
    }
}
