//! Presentation pipeline for scored movie lists.
//!
//! This crate provides:
//! - Filter trait and implementations (selected genres, already watched)
//! - SortBy display orderings
//! - FilterPipeline for composing filters with an optional final sort
//!
//! ## Architecture
//! The engine produces a ranked list; the pipeline decides what is shown:
//! 1. Filters drop movies outside the selected genres, or already watched
//! 2. An optional sort replaces score order with a display order
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, SortBy};
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(SelectedGenresFilter::new(options.selected_genres.clone()))
//!     .with_sort(SortBy::Popularity);
//!
//! let shown = pipeline.apply(recommended, &context)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod sort;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use sort::{SortBy, sort_movies};
