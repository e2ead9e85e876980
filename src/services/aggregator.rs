use std::collections::HashSet;
use std::io::Write;

use crate::{
    error::AppResult,
    models::{ContributionSet, MediaKind, RatedItem, RatingSet, SuggestionSet},
    services::{providers::MetadataProvider, scoring::score_contribution},
};

/// Receives progress while ratings are being resolved
pub trait ProgressSink {
    fn report(&mut self, processed: usize, total: usize);

    fn finish(&mut self) {}
}

/// Discards progress
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&mut self, _processed: usize, _total: usize) {}
}

/// Rewrites a single "n/total processed" line on stderr
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, processed: usize, total: usize) {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{}/{} processed", processed, total);
        let _ = stderr.flush();
    }

    fn finish(&mut self) {
        eprintln!();
    }
}

/// Everything one aggregation pass produced
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Provider ids of titles the user has rated
    pub seen: HashSet<u64>,
    /// Recommended neighbors with the ratings that led to them
    pub contributions: ContributionSet,
    /// Ranked suggestions, seen titles excluded
    pub suggestions: SuggestionSet,
}

/// Builds ranked suggestions of one media kind from the user's ratings
///
/// Items are processed one at a time. A provider failure on one item is
/// logged and the item skipped; only fatal errors (a rejected API key) abort
/// the pass.
pub async fn aggregate(
    provider: &dyn MetadataProvider,
    ratings: &RatingSet,
    kind: MediaKind,
    progress: &mut dyn ProgressSink,
) -> AppResult<Aggregation> {
    let total = ratings.of_kind(kind).count();
    let mut seen = HashSet::new();
    let mut contributions = ContributionSet::new();
    let mut skipped = 0;

    tracing::info!(kind = %kind, ratings = total, provider = provider.name(), "Aggregating suggestions");

    for (processed, item) in ratings.of_kind(kind).enumerate() {
        progress.report(processed, total);

        match collect_neighbors(provider, item, kind, &mut seen, &mut contributions).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                progress.finish();
                return Err(e);
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    title = %item.title,
                    kind = %kind,
                    error = %e,
                    "Skipping rated title after provider failure"
                );
            }
        }
    }
    progress.report(total, total);
    progress.finish();

    let suggestions = rank(&contributions, &seen);

    tracing::info!(
        kind = %kind,
        seen = seen.len(),
        candidates = contributions.len(),
        suggestions = suggestions.blended.len(),
        skipped = skipped,
        "Aggregation completed"
    );

    Ok(Aggregation {
        seen,
        contributions,
        suggestions,
    })
}

/// Resolves one rated item and records its recommended neighbors
async fn collect_neighbors(
    provider: &dyn MetadataProvider,
    item: &RatedItem,
    kind: MediaKind,
    seen: &mut HashSet<u64>,
    contributions: &mut ContributionSet,
) -> AppResult<()> {
    let Some(provider_id) = resolve(provider, item, kind).await? else {
        tracing::debug!(title = %item.title, kind = %kind, "No provider match for rated title");
        return Ok(());
    };
    seen.insert(provider_id);

    for candidate in provider.recommendations(kind, provider_id).await? {
        contributions.upsert(candidate, item.user_rating);
    }

    Ok(())
}

/// Provider id of the best match: by external id when there is one, by title otherwise
async fn resolve(
    provider: &dyn MetadataProvider,
    item: &RatedItem,
    kind: MediaKind,
) -> AppResult<Option<u64>> {
    let matches = match item.external_id.as_deref() {
        Some(external_id) => provider.search_by_external_id(kind, external_id).await?,
        None => provider.search_by_title(kind, &item.title).await?,
    };
    Ok(matches.first().map(|candidate| candidate.id))
}

/// Scores every neighbor the user has not rated and ranks both variants
pub fn rank(contributions: &ContributionSet, seen: &HashSet<u64>) -> SuggestionSet {
    let scored = contributions
        .iter()
        .filter(|contribution| !seen.contains(&contribution.candidate.id))
        .map(score_contribution)
        .collect();

    SuggestionSet::from_scored(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Candidate;
    use crate::services::providers::MockMetadataProvider;
    use mockall::predicate::eq;

    fn movie(id: u64, title: &str) -> Candidate {
        Candidate::new(MediaKind::Film, id, title, 200.0, 7.0, vec![18], None)
    }

    fn rated(external_id: &str, title: &str, rating: f64) -> RatedItem {
        RatedItem {
            external_id: Some(external_id.to_string()),
            ..RatedItem::titled(title, rating)
        }
    }

    #[tokio::test]
    async fn test_network_failure_skips_only_that_item() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_search_by_external_id()
            .withf(|_, id| id == "tt1")
            .returning(|_, _| Err(AppError::Unavailable("503".to_string())));
        provider
            .expect_search_by_external_id()
            .withf(|_, id| id == "tt2")
            .returning(|_, _| Ok(vec![movie(20, "Second")]));
        provider
            .expect_recommendations()
            .with(eq(MediaKind::Film), eq(20))
            .times(1)
            .returning(|_, _| Ok(vec![movie(30, "Neighbor")]));

        let ratings: RatingSet = vec![rated("tt1", "First", 9.0), rated("tt2", "Second", 7.0)]
            .into_iter()
            .collect();

        let aggregation = aggregate(&provider, &ratings, MediaKind::Film, &mut Silent)
            .await
            .unwrap();

        assert_eq!(aggregation.seen, HashSet::from([20]));
        assert_eq!(aggregation.suggestions.blended.len(), 1);
        assert_eq!(aggregation.suggestions.blended[0].title, "Neighbor");
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_pass() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_search_by_external_id()
            .times(1)
            .returning(|_, _| Err(AppError::Auth("401".to_string())));

        let ratings: RatingSet = vec![rated("tt1", "First", 9.0), rated("tt2", "Second", 7.0)]
            .into_iter()
            .collect();

        let result = aggregate(&provider, &ratings, MediaKind::Film, &mut Silent).await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_other_kind_is_not_resolved() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_search_by_external_id().never();
        provider.expect_search_by_title().never();

        let ratings: RatingSet = vec![rated("tt1", "A Film", 9.0)].into_iter().collect();

        let aggregation = aggregate(&provider, &ratings, MediaKind::Series, &mut Silent)
            .await
            .unwrap();
        assert!(aggregation.seen.is_empty());
        assert!(aggregation.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_title_only_item_resolved_by_search() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_search_by_external_id().never();
        provider
            .expect_search_by_title()
            .withf(|kind, name| *kind == MediaKind::Film && name == "Alpha")
            .returning(|_, _| Ok(vec![movie(1, "Alpha"), movie(99, "Alpha II")]));
        provider
            .expect_recommendations()
            .with(eq(MediaKind::Film), eq(1))
            .returning(|_, _| Ok(vec![movie(2, "Beta")]));

        let ratings: RatingSet = vec![RatedItem::titled("Alpha", 8.0)].into_iter().collect();

        let aggregation = aggregate(&provider, &ratings, MediaKind::Film, &mut Silent)
            .await
            .unwrap();
        assert!(aggregation.seen.contains(&1));
        assert!(!aggregation.seen.contains(&99));
        assert_eq!(aggregation.contributions.get(2).unwrap().ratings, vec![8.0]);
    }

    #[test]
    fn test_rank_drops_seen() {
        let mut contributions = ContributionSet::new();
        contributions.upsert(movie(1, "Rated already"), 9.0);
        contributions.upsert(movie(2, "New"), 9.0);

        let suggestions = rank(&contributions, &HashSet::from([1]));
        assert_eq!(suggestions.blended.len(), 1);
        assert_eq!(suggestions.personalized[0].title, "New");
    }

    struct Recording(Vec<(usize, usize)>);

    impl ProgressSink for Recording {
        fn report(&mut self, processed: usize, total: usize) {
            self.0.push((processed, total));
        }
    }

    #[tokio::test]
    async fn test_progress_reported_per_item() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_search_by_external_id()
            .returning(|_, _| Ok(vec![]));

        let ratings: RatingSet = vec![rated("tt1", "A", 5.0), rated("tt2", "B", 6.0)]
            .into_iter()
            .collect();

        let mut progress = Recording(Vec::new());
        aggregate(&provider, &ratings, MediaKind::Film, &mut progress)
            .await
            .unwrap();
        assert_eq!(progress.0, vec![(0, 2), (1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_progress_counts_only_target_kind() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_search_by_external_id()
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let show = RatedItem {
            media_kind: MediaKind::Series,
            ..rated("tt9", "Show", 7.0)
        };
        let ratings: RatingSet = vec![rated("tt1", "A", 5.0), show].into_iter().collect();

        let mut progress = Recording(Vec::new());
        aggregate(&provider, &ratings, MediaKind::Film, &mut progress)
            .await
            .unwrap();
        assert_eq!(progress.0, vec![(0, 1), (1, 1)]);
    }
}
