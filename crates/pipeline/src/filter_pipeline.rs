//! The FilterPipeline orchestrates filters and an optional final sort.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::sort::{SortBy, sort_movies};
use crate::traits::Filter;
use anyhow::Result;
use engine::{ScoredMovie, UserContext};
use tracing;

/// Chains filters, then optionally re-sorts what survives.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(SelectedGenresFilter::new(vec![28, 12]))
///     .add_filter(AlreadyWatchedFilter)
///     .with_sort(SortBy::Rating);
///
/// let shown = pipeline.apply(scored, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
    sort_by: Option<SortBy>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            sort_by: None,
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Re-sort the filtered list. Without this the score order is kept.
    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence, then the sort if one is set.
    ///
    /// # Returns
    /// * `Ok(Vec<ScoredMovie>)` - The movies to display
    /// * `Err` - If any filter fails
    pub fn apply(&self, movies: Vec<ScoredMovie>, context: &UserContext) -> Result<Vec<ScoredMovie>> {
        let mut current = movies;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }

        if let Some(sort_by) = self.sort_by {
            tracing::debug!("Sorting {} movies by {}", current.len(), sort_by);
            sort_movies(&mut current, sort_by);
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
