//! Feed crate for the Marquee movie browser.
//!
//! This crate contains the orchestrator that owns the movie index and
//! turns a preference store into the recommended, similar, trending and
//! top rated rails.

pub mod orchestrator;

pub use orchestrator::{
    DEFAULT_TOP_RATED_LIMIT, DEFAULT_TRENDING_LIMIT, FeedOptions, FeedOrchestrator, GenreAffinity,
    HomeFeed, ProfileSummary,
};
