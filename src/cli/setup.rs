use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    config::{ApiKeyConfig, TMDB_API_KEY_LINK},
    error::{AppError, AppResult},
};

/// Asks for an API key and reads one line of `input`
///
/// Only the key line is consumed, so the same reader can feed the command loop.
pub async fn prompt_api_key<R, W>(input: &mut R, out: &mut W) -> AppResult<ApiKeyConfig>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "No API key found. Get one at {}", TMDB_API_KEY_LINK)?;
    write!(out, "Enter your TMDb API key: ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Err(AppError::Config("No API key entered".to_string()));
    }
    ApiKeyConfig::new(line)
}
