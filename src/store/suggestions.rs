use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::{MediaKind, ScoreVariant, Suggestion, SuggestionSet},
};

const BLENDED_SUFFIX: &str = "suggestions.txt";
const PERSONALIZED_SUFFIX: &str = "suggestions_p.txt";

/// Persists the ranked suggestion lists, one JSON array per (kind, variant)
#[derive(Debug, Clone)]
pub struct SuggestionStore {
    dir: PathBuf,
}

impl SuggestionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding one kind's list for one variant, e.g. `tv_suggestions_p.txt`
    pub fn path(&self, kind: MediaKind, variant: ScoreVariant) -> PathBuf {
        let suffix = match variant {
            ScoreVariant::Blended => BLENDED_SUFFIX,
            ScoreVariant::Personalized => PERSONALIZED_SUFFIX,
        };
        self.dir.join(format!("{}_{}", kind.path_segment(), suffix))
    }

    /// True only when both variants are on disk
    pub async fn exists(&self, kind: MediaKind) -> bool {
        for variant in [ScoreVariant::Blended, ScoreVariant::Personalized] {
            if !tokio::fs::try_exists(self.path(kind, variant))
                .await
                .unwrap_or(false)
            {
                return false;
            }
        }
        true
    }

    /// True when every kind has both variants on disk
    pub async fn exists_all(&self) -> bool {
        for kind in MediaKind::ALL {
            if !self.exists(kind).await {
                return false;
            }
        }
        true
    }

    /// Writes both lists; each file is replaced via a temporary sibling
    pub async fn save(&self, kind: MediaKind, suggestions: &SuggestionSet) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        for variant in [ScoreVariant::Blended, ScoreVariant::Personalized] {
            let list = suggestions.list(variant);
            let json = serde_json::to_string(list).map_err(|e| {
                AppError::CorruptData(format!("Suggestion serialization error: {}", e))
            })?;
            write_replacing(&self.path(kind, variant), json.as_bytes()).await?;
        }

        tracing::info!(
            kind = %kind,
            dir = %self.dir.display(),
            count = suggestions.blended.len(),
            "Saved suggestions"
        );

        Ok(())
    }

    /// Reads both lists back; malformed content is `CorruptData`
    pub async fn load(&self, kind: MediaKind) -> AppResult<SuggestionSet> {
        let blended = self.load_list(kind, ScoreVariant::Blended).await?;
        let personalized = self.load_list(kind, ScoreVariant::Personalized).await?;

        tracing::debug!(kind = %kind, count = blended.len(), "Loaded cached suggestions");

        Ok(SuggestionSet {
            blended,
            personalized,
        })
    }

    async fn load_list(&self, kind: MediaKind, variant: ScoreVariant) -> AppResult<Vec<Suggestion>> {
        let path = self.path(kind, variant);
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                AppError::CorruptData(format!("{} is not valid UTF-8", path.display()))
            }
            _ => AppError::Io(e),
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| AppError::CorruptData(format!("{}: {}", path.display(), e)))
    }
}

async fn write_replacing(path: &Path, contents: &[u8]) -> AppResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
