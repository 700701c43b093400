//! # Feed Orchestrator
//!
//! Wires the movie index, the preference store, the scoring sources and the
//! presentation pipeline into the rails a front-end shows:
//! 1. Build the user context from the store
//! 2. Score the index pool with the right source
//! 3. Apply genre selection, watched-hiding and sort
//!
//! Every call recomputes from the store it is given, so a mutation is
//! visible on the next read.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use data_loader::{GenreId, Movie, MovieId, MovieIndex, StarRating};
use engine::{
    CandidateSource, DEFAULT_LIKE_THRESHOLD, HistorySource, ScoredMovie, SimilarSource,
    TrendingSource, UserContext, build_user_context,
};
use pipeline::filters::{AlreadyWatchedFilter, SelectedGenresFilter};
use pipeline::{FilterPipeline, SortBy};
use preferences::PreferenceStore;

/// Default size of the trending rail
pub const DEFAULT_TRENDING_LIMIT: usize = 20;

/// Default size of the top rated rail
pub const DEFAULT_TOP_RATED_LIMIT: usize = 20;

/// How a rail should be narrowed and ordered for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedOptions {
    /// Keep movies sharing at least one of these genres; empty keeps all
    pub selected_genres: Vec<GenreId>,
    /// Display order; `None` keeps score order
    pub sort_by: Option<SortBy>,
    /// Drop movies already in the watch history
    pub hide_watched: bool,
}

impl FeedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genres(mut self, genres: impl Into<Vec<GenreId>>) -> Self {
        self.selected_genres = genres.into();
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn hide_watched(mut self, hide: bool) -> Self {
        self.hide_watched = hide;
        self
    }
}

/// The rails of the home screen
#[derive(Debug, Clone, Serialize)]
pub struct HomeFeed {
    pub recommended: Vec<ScoredMovie>,
    pub trending: Vec<ScoredMovie>,
    pub top_rated: Vec<ScoredMovie>,
}

/// A preferred genre with its display name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreAffinity {
    pub id: GenreId,
    pub name: Option<String>,
    /// Liked movies carrying this genre
    pub count: u32,
}

/// Counts of the user's collections and what they imply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub watchlist: usize,
    pub favorites: usize,
    pub rated: usize,
    pub watched: usize,
    pub liked: usize,
    pub preferred_genres: Vec<GenreAffinity>,
}

/// Main orchestrator for every rail in the feed
#[derive(Debug, Clone)]
pub struct FeedOrchestrator {
    index: Arc<MovieIndex>,
    history: HistorySource,
    similar: SimilarSource,
    trending: TrendingSource,
    like_threshold: StarRating,
    trending_limit: usize,
    top_rated_limit: usize,
}

impl FeedOrchestrator {
    /// Create an orchestrator with default sources over `index`
    pub fn new(index: Arc<MovieIndex>) -> Self {
        Self {
            index,
            history: HistorySource::new(),
            similar: SimilarSource::new(),
            trending: TrendingSource::new(),
            like_threshold: DEFAULT_LIKE_THRESHOLD,
            trending_limit: DEFAULT_TRENDING_LIMIT,
            top_rated_limit: DEFAULT_TOP_RATED_LIMIT,
        }
    }

    pub fn with_history_source(mut self, source: HistorySource) -> Self {
        self.history = source;
        self
    }

    pub fn with_similar_source(mut self, source: SimilarSource) -> Self {
        self.similar = source;
        self
    }

    pub fn with_trending_source(mut self, source: TrendingSource) -> Self {
        self.trending = source;
        self
    }

    /// Minimum rating for a watched movie to count as liked (default: 4)
    pub fn with_like_threshold(mut self, threshold: StarRating) -> Self {
        self.like_threshold = threshold;
        self
    }

    /// Size of the trending rail in the home feed (default: 20)
    pub fn with_trending_limit(mut self, limit: usize) -> Self {
        self.trending_limit = limit;
        self
    }

    /// Size of the top rated rail in the home feed (default: 20)
    pub fn with_top_rated_limit(mut self, limit: usize) -> Self {
        self.top_rated_limit = limit;
        self
    }

    pub fn index(&self) -> &MovieIndex {
        &self.index
    }

    /// Look a movie up in the index, failing on unknown ids
    pub fn resolve_movie(&self, movie_id: MovieId) -> Result<&Movie> {
        self.index
            .get_movie(movie_id)
            .with_context(|| format!("Movie {} is not in the loaded pool", movie_id))
    }

    /// Aggregate the store into what the sources score against
    pub fn user_context(&self, store: &PreferenceStore) -> UserContext {
        build_user_context(
            store.watch_history(),
            store.ratings(),
            store.favorites(),
            self.like_threshold,
        )
    }

    /// History-based recommendations over the whole pool
    pub fn recommended(&self, store: &PreferenceStore, options: &FeedOptions) -> Result<Vec<ScoredMovie>> {
        let start_time = Instant::now();
        let context = self.user_context(store);

        let scored = self.history.get_candidates(&context, self.index.movies());
        info!(
            "Scored {} recommendations from {} liked movies",
            scored.len(),
            context.liked_movies.len()
        );

        let shown = self
            .apply_options(scored, &context, options)
            .context("Failed to filter recommendations")?;

        debug!("Recommended rail ready in {:.2?}", start_time.elapsed());
        Ok(shown)
    }

    /// Movies similar to `movie_id`
    pub fn similar_movies(
        &self,
        store: &PreferenceStore,
        movie_id: MovieId,
        options: &FeedOptions,
    ) -> Result<Vec<ScoredMovie>> {
        let movie = self.resolve_movie(movie_id)?;
        let context = self.user_context(store);

        let scored = self.similar.get_candidates(Some(movie), self.index.movies());
        info!("Found {} movies similar to {:?}", scored.len(), movie.title);

        self.apply_options(scored, &context, options)
            .context("Failed to filter similar movies")
    }

    /// The `limit` most popular movies, reweighted by favorite genres
    pub fn trending(
        &self,
        store: &PreferenceStore,
        limit: usize,
        options: &FeedOptions,
    ) -> Result<Vec<ScoredMovie>> {
        let context = self.user_context(store);
        let pool = self.index.trending(limit);

        let scored = self.trending.get_candidates(&context, &pool);
        info!(
            "Trending rail: {} movies, {} favorites shaping order",
            scored.len(),
            context.favorite_count
        );

        self.apply_options(scored, &context, options)
            .context("Failed to filter trending movies")
    }

    /// The `limit` best rated movies, scored by vote average.
    ///
    /// Unlike trending, favorites do not reorder this rail.
    pub fn top_rated(
        &self,
        store: &PreferenceStore,
        limit: usize,
        options: &FeedOptions,
    ) -> Result<Vec<ScoredMovie>> {
        let context = self.user_context(store);

        let scored: Vec<ScoredMovie> = self
            .index
            .top_rated(limit)
            .into_iter()
            .map(|movie| {
                let score = movie.vote_average();
                ScoredMovie::new(movie, CandidateSource::TopRated, score)
            })
            .collect();
        info!("Top rated rail: {} movies", scored.len());

        self.apply_options(scored, &context, options)
            .context("Failed to filter top rated movies")
    }

    /// Every home screen rail, each narrowed and sorted by the same options
    pub fn home_feed(&self, store: &PreferenceStore, options: &FeedOptions) -> Result<HomeFeed> {
        let start_time = Instant::now();

        let recommended = self.recommended(store, options)?;
        let trending = self.trending(store, self.trending_limit, options)?;
        let top_rated = self.top_rated(store, self.top_rated_limit, options)?;

        debug!("Home feed ready in {:.2?}", start_time.elapsed());
        Ok(HomeFeed {
            recommended,
            trending,
            top_rated,
        })
    }

    /// Title search over the pool: exact matches first, then substrings
    pub fn search(&self, query: &str) -> Vec<Movie> {
        self.index.search_title(query).into_iter().cloned().collect()
    }

    pub fn profile(&self, store: &PreferenceStore) -> ProfileSummary {
        let context = self.user_context(store);
        let catalog = self.index.catalog();

        let preferred_genres = context
            .preferred_genres
            .iter()
            .map(|&id| GenreAffinity {
                id,
                name: catalog.name(id).map(str::to_string),
                count: context.genre_counts.get(&id).copied().unwrap_or(0),
            })
            .collect();

        ProfileSummary {
            watchlist: store.watchlist().len(),
            favorites: store.favorites().len(),
            rated: store.ratings().len(),
            watched: store.watch_history().len(),
            liked: context.liked_movies.len(),
            preferred_genres,
        }
    }

    fn apply_options(
        &self,
        scored: Vec<ScoredMovie>,
        context: &UserContext,
        options: &FeedOptions,
    ) -> Result<Vec<ScoredMovie>> {
        let mut pipeline =
            FilterPipeline::new().add_filter(SelectedGenresFilter::new(options.selected_genres.clone()));
        if options.hide_watched {
            pipeline = pipeline.add_filter(AlreadyWatchedFilter);
        }
        if let Some(sort_by) = options.sort_by {
            pipeline = pipeline.with_sort(sort_by);
        }
        pipeline.apply(scored, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Genre, GenreCatalog};
    use preferences::MemoryStorage;

    fn build_test_index() -> Arc<MovieIndex> {
        let movies = vec![
            Movie::new(1, "The Matrix")
                .with_genres(vec![28, 878])
                .with_vote_average(8.2)
                .with_popularity(80.0)
                .with_release_date("1999-03-31"),
            Movie::new(2, "Toy Story")
                .with_genres(vec![16, 35])
                .with_vote_average(8.0)
                .with_popularity(60.0)
                .with_release_date("1995-11-22"),
            Movie::new(3, "Inception")
                .with_genres(vec![28, 878, 12])
                .with_vote_average(8.4)
                .with_popularity(95.0)
                .with_release_date("2010-07-15"),
            Movie::new(4, "Paddington")
                .with_genres(vec![35, 10751])
                .with_vote_average(7.3)
                .with_popularity(20.0)
                .with_release_date("2014-11-24"),
        ];
        let catalog: GenreCatalog = [
            Genre { id: 28, name: "Action".to_string() },
            Genre { id: 878, name: "Science Fiction".to_string() },
            Genre { id: 35, name: "Comedy".to_string() },
        ]
        .into_iter()
        .collect();

        Arc::new(MovieIndex::from_parts(movies, catalog))
    }

    fn ids(movies: &[ScoredMovie]) -> Vec<MovieId> {
        movies.iter().map(|s| s.movie_id()).collect()
    }

    #[test]
    fn test_new_profile_gets_no_recommendations() {
        let orchestrator = FeedOrchestrator::new(build_test_index());
        let store = PreferenceStore::new(MemoryStorage::new());

        let recommended = orchestrator.recommended(&store, &FeedOptions::new()).unwrap();
        assert!(recommended.is_empty());
    }

    #[test]
    fn test_recommendations_follow_liked_history() {
        let index = build_test_index();
        let orchestrator = FeedOrchestrator::new(index.clone());
        let mut store = PreferenceStore::new(MemoryStorage::new());

        store.add_to_watch_history(index.get_movie(1).unwrap().clone());
        store.rate_movie(1, 5).unwrap();

        let recommended = orchestrator.recommended(&store, &FeedOptions::new()).unwrap();
        assert_eq!(recommended[0].movie_id(), 3);
        assert!(recommended.iter().all(|s| s.movie_id() != 1));
    }

    #[test]
    fn test_similar_movies_unknown_id_is_error() {
        let orchestrator = FeedOrchestrator::new(build_test_index());
        let store = PreferenceStore::new(MemoryStorage::new());

        assert!(orchestrator.similar_movies(&store, 999, &FeedOptions::new()).is_err());
    }

    #[test]
    fn test_similar_movies_hide_watched() {
        let index = build_test_index();
        let orchestrator = FeedOrchestrator::new(index.clone());
        let mut store = PreferenceStore::new(MemoryStorage::new());
        store.add_to_watch_history(index.get_movie(3).unwrap().clone());

        let similar = orchestrator.similar_movies(&store, 1, &FeedOptions::new()).unwrap();
        assert_eq!(similar[0].movie_id(), 3);

        let options = FeedOptions::new().hide_watched(true);
        let similar = orchestrator.similar_movies(&store, 1, &options).unwrap();
        assert!(similar.iter().all(|s| s.movie_id() != 3));
    }

    #[test]
    fn test_trending_reweights_by_favorites() {
        let index = build_test_index();
        let orchestrator = FeedOrchestrator::new(index.clone());
        let mut store = PreferenceStore::new(MemoryStorage::new());

        let plain = orchestrator.trending(&store, 10, &FeedOptions::new()).unwrap();
        assert_eq!(ids(&plain), vec![3, 1, 2, 4]);

        store.add_to_favorites(index.get_movie(4).unwrap().clone());
        let personal = orchestrator.trending(&store, 10, &FeedOptions::new()).unwrap();
        assert_eq!(ids(&personal), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_top_rated_ignores_favorites() {
        let index = build_test_index();
        let orchestrator = FeedOrchestrator::new(index.clone());
        let mut store = PreferenceStore::new(MemoryStorage::new());
        store.add_to_favorites(index.get_movie(4).unwrap().clone());

        let top = orchestrator.top_rated(&store, 3, &FeedOptions::new()).unwrap();
        assert_eq!(ids(&top), vec![3, 1, 2]);
        assert_eq!(top[0].score, 8.4);
        assert_eq!(top[0].source, CandidateSource::TopRated);

        let comedy = FeedOptions::new().with_genres(vec![35]);
        let top = orchestrator.top_rated(&store, 10, &comedy).unwrap();
        assert_eq!(ids(&top), vec![2, 4]);
    }

    #[test]
    fn test_home_feed_has_every_rail() {
        let index = build_test_index();
        let orchestrator = FeedOrchestrator::new(index.clone())
            .with_trending_limit(2)
            .with_top_rated_limit(1);
        let mut store = PreferenceStore::new(MemoryStorage::new());
        store.add_to_watch_history(index.get_movie(1).unwrap().clone());
        store.rate_movie(1, 5).unwrap();

        let feed = orchestrator.home_feed(&store, &FeedOptions::new()).unwrap();
        assert_eq!(feed.recommended[0].movie_id(), 3);
        assert_eq!(ids(&feed.trending), vec![3, 1]);
        assert_eq!(ids(&feed.top_rated), vec![3]);

        let feed = orchestrator
            .home_feed(&store, &FeedOptions::new().hide_watched(true))
            .unwrap();
        assert_eq!(ids(&feed.trending), vec![3]);
    }

    #[test]
    fn test_profile_summary_names_genres() {
        let index = build_test_index();
        let orchestrator = FeedOrchestrator::new(index.clone());
        let mut store = PreferenceStore::new(MemoryStorage::new());

        store.add_to_watch_history(index.get_movie(1).unwrap().clone());
        store.add_to_watch_history(index.get_movie(3).unwrap().clone());
        store.rate_movie(1, 4).unwrap();
        store.rate_movie(3, 5).unwrap();
        store.add_to_watchlist(index.get_movie(2).unwrap().clone());

        let profile = orchestrator.profile(&store);
        assert_eq!(profile.watched, 2);
        assert_eq!(profile.liked, 2);
        assert_eq!(profile.watchlist, 1);
        // 28 and 878 tie at 2; 28 is seen first
        assert_eq!(profile.preferred_genres[0].name.as_deref(), Some("Action"));
        assert_eq!(profile.preferred_genres[0].count, 2);
        assert_eq!(profile.preferred_genres[1].name.as_deref(), Some("Science Fiction"));
        assert_eq!(profile.preferred_genres[2].id, 12);
        assert_eq!(profile.preferred_genres[2].name, None);
    }
}
