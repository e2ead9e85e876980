use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use media_suggest::{
    cli::{prompt_api_key, Prepared, Session},
    config::{ApiKeyConfig, Settings},
    error::AppError,
    services::providers::{tmdb::TmdbConfig, MetadataProvider, TmdbProvider},
    store::SuggestionStore,
};

/// Movie and TV suggestions built from your own ratings
#[derive(Parser, Debug)]
#[command(name = "media-suggest")]
#[command(version, about, long_about = None)]
struct Args {
    /// Regenerate suggestion files even when cached ones exist
    #[arg(short, long)]
    update: bool,

    /// Hide progress output while aggregating
    #[arg(short, long)]
    quiet: bool,

    /// Entries shown per preview (overrides SUGGEST_ITEM_COUNT)
    #[arg(short = 'n', long)]
    item_count: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("media_suggest=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;
    tracing::debug!(?settings, "Loaded settings");

    // Shared by the key prompt and the command loop
    let mut stdin = BufReader::new(tokio::io::stdin());

    let api_key = match ApiKeyConfig::load(&settings.config_path).await? {
        Some(config) => config,
        None => {
            let config = prompt_api_key(&mut stdin, &mut std::io::stdout())
                .await
                .context("Failed to read API key")?;
            config
                .save(&settings.config_path)
                .await
                .with_context(|| format!("Failed to save {}", settings.config_path.display()))?;
            config
        }
    };

    let provider = TmdbProvider::new(TmdbConfig::from_settings(&settings, api_key.api_key))?;
    match provider.verify_api_key().await {
        Ok(()) => {}
        Err(AppError::Auth(message)) => {
            anyhow::bail!(
                "TMDb rejected the API key ({}). Fix or delete {} and try again.",
                message,
                settings.config_path.display()
            );
        }
        Err(e) => return Err(e).context("Failed to reach TMDb"),
    }

    let mut session = Session::new(
        Arc::new(provider),
        SuggestionStore::new(&settings.suggestions_dir),
        settings.ratings_path.clone(),
        args.item_count.unwrap_or(settings.item_count),
        args.quiet,
    );
    session
        .load_genres()
        .await
        .context("Failed to load genre lists")?;

    match session
        .prepare(args.update)
        .await
        .context("Failed to prepare suggestions")?
    {
        Prepared::Cached => tracing::info!("Using stored suggestions"),
        Prepared::Generated => tracing::info!("Suggestions regenerated"),
        Prepared::NoRatings => println!(
            "No ratings found at {}. Export your ratings there and run 'update'.",
            settings.ratings_path.display()
        ),
    }

    session.run(stdin, &mut std::io::stdout()).await?;

    Ok(())
}
