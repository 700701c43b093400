mod logging;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{GenreCatalog, GenreId, Movie, MovieId, MovieIndex, StarRating};
use engine::ScoredMovie;
use feed::{FeedOptions, FeedOrchestrator, HomeFeed, ProfileSummary};
use pipeline::SortBy;
use preferences::{JsonFileStorage, PreferenceConfig, PreferenceStore, RatingPolicy};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Marquee - personal movie recommendations from your watch history
#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Browse a movie pool with recommendations from your own history", long_about = None)]
struct Cli {
    /// Directory holding movies.json (and optionally genres.json)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory where watchlist, favorites, ratings and history are kept
    #[arg(short, long, default_value = "profile")]
    profile_dir: PathBuf,

    /// What to do with a rating outside 1..=5
    #[arg(long, value_enum, default_value_t = PolicyArg::Reject)]
    rating_policy: PolicyArg,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Accept,
    Reject,
    Clamp,
}

impl From<PolicyArg> for RatingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Accept => RatingPolicy::Accept,
            PolicyArg::Reject => RatingPolicy::Reject,
            PolicyArg::Clamp => RatingPolicy::Clamp,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recommendations from the genres of movies you rated 4 or 5
    Recommend {
        /// Number of recommendations to show
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Only show movies in these genres (repeatable)
        #[arg(long = "genre")]
        genres: Vec<GenreId>,

        /// popularity, rating, release_date or title
        #[arg(long, value_parser = parse_sort_by)]
        sort: Option<SortBy>,

        /// Show which genres matched and the raw score
        #[arg(long)]
        explain: bool,
    },

    /// Movies similar to one movie
    Similar {
        #[arg(long)]
        movie_id: MovieId,

        /// Hide movies already in your watch history
        #[arg(long)]
        hide_watched: bool,

        #[arg(long)]
        explain: bool,
    },

    /// Popular movies, reordered by your favorite genres
    Trending {
        #[arg(long, default_value = "20")]
        limit: usize,

        #[arg(long = "genre")]
        genres: Vec<GenreId>,

        #[arg(long, value_parser = parse_sort_by)]
        sort: Option<SortBy>,

        #[arg(long)]
        hide_watched: bool,

        #[arg(long)]
        explain: bool,
    },

    /// Best rated movies in the pool
    TopRated {
        #[arg(long, default_value = "20")]
        limit: usize,

        #[arg(long = "genre")]
        genres: Vec<GenreId>,

        #[arg(long, value_parser = parse_sort_by)]
        sort: Option<SortBy>,

        #[arg(long)]
        hide_watched: bool,

        #[arg(long)]
        explain: bool,
    },

    /// Recommended, trending and top rated rails together
    Home {
        /// Only show movies in these genres (repeatable)
        #[arg(long = "genre")]
        genres: Vec<GenreId>,

        /// One ordering for every rail
        #[arg(long, value_parser = parse_sort_by)]
        sort: Option<SortBy>,

        #[arg(long)]
        hide_watched: bool,

        #[arg(long)]
        explain: bool,
    },

    /// Search the pool by title
    Search {
        /// Title to search for (case-insensitive, exact matches first)
        #[arg(long)]
        title: String,
    },

    /// List the genre catalog
    Genres,

    /// Record a movie as watched
    Watch {
        #[arg(long)]
        movie_id: MovieId,
    },

    /// Rate a movie 1-5
    Rate {
        #[arg(long)]
        movie_id: MovieId,

        #[arg(long)]
        rating: StarRating,
    },

    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Show or clear the watch history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Summary of your lists and preferred genres
    Profile,
}

#[derive(Subcommand)]
enum ListAction {
    Add {
        #[arg(long)]
        movie_id: MovieId,
    },
    Remove {
        #[arg(long)]
        movie_id: MovieId,
    },
    Show,
}

#[derive(Subcommand)]
enum HistoryAction {
    Show,
    Clear,
}

#[derive(Clone, Copy)]
enum MovieList {
    Watchlist,
    Favorites,
}

impl MovieList {
    fn label(&self) -> &'static str {
        match self {
            MovieList::Watchlist => "watchlist",
            MovieList::Favorites => "favorites",
        }
    }
}

fn parse_sort_by(raw: &str) -> std::result::Result<SortBy, String> {
    raw.parse::<SortBy>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    info!("Loading movie pool from {}", cli.data_dir.display());
    let start = Instant::now();
    let index = Arc::new(
        MovieIndex::load_from_files(&cli.data_dir)
            .with_context(|| format!("Failed to load movie pool from {}", cli.data_dir.display()))?,
    );
    info!("Loaded {} movies in {:?}", index.len(), start.elapsed());

    let orchestrator = FeedOrchestrator::new(index);
    let config = PreferenceConfig::default().with_rating_policy(cli.rating_policy.into());
    let mut store = PreferenceStore::load(JsonFileStorage::new(&cli.profile_dir), config);
    let json = cli.json;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            limit,
            genres,
            sort,
            explain,
        } => handle_recommend(&orchestrator, &store, limit, genres, sort, explain, json)?,
        Commands::Similar {
            movie_id,
            hide_watched,
            explain,
        } => handle_similar(&orchestrator, &store, movie_id, hide_watched, explain, json)?,
        Commands::Trending {
            limit,
            genres,
            sort,
            hide_watched,
            explain,
        } => {
            let options = rail_options(genres, sort, hide_watched);
            handle_trending(&orchestrator, &store, limit, &options, explain, json)?
        }
        Commands::TopRated {
            limit,
            genres,
            sort,
            hide_watched,
            explain,
        } => {
            let options = rail_options(genres, sort, hide_watched);
            handle_top_rated(&orchestrator, &store, limit, &options, explain, json)?
        }
        Commands::Home {
            genres,
            sort,
            hide_watched,
            explain,
        } => {
            let options = rail_options(genres, sort, hide_watched);
            handle_home(&orchestrator, &store, &options, explain, json)?
        }
        Commands::Search { title } => handle_search(&orchestrator, &title, json)?,
        Commands::Genres => handle_genres(orchestrator.index().catalog(), json)?,
        Commands::Watch { movie_id } => handle_watch(&orchestrator, &mut store, movie_id)?,
        Commands::Rate { movie_id, rating } => handle_rate(&orchestrator, &mut store, movie_id, rating)?,
        Commands::Watchlist { action } => {
            handle_list(&orchestrator, &mut store, MovieList::Watchlist, action, json)?
        }
        Commands::Favorites { action } => {
            handle_list(&orchestrator, &mut store, MovieList::Favorites, action, json)?
        }
        Commands::History { action } => handle_history(&orchestrator, &mut store, action, json)?,
        Commands::Profile => handle_profile(&orchestrator, &store, json)?,
    }

    report_persist_error(&mut store);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    orchestrator: &FeedOrchestrator,
    store: &PreferenceStore,
    limit: usize,
    genres: Vec<GenreId>,
    sort: Option<SortBy>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let mut options = FeedOptions::new().with_genres(genres);
    options.sort_by = sort;

    let mut recommendations = orchestrator.recommended(store, &options)?;
    recommendations.truncate(limit);

    if json {
        return print_json(&recommendations);
    }
    if recommendations.is_empty() {
        println!(
            "{}",
            "No recommendations yet. Watch and rate a few movies 4 or 5 stars first.".yellow()
        );
        return Ok(());
    }
    print_scored("Recommended for you", &recommendations, orchestrator.index().catalog(), explain);
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(
    orchestrator: &FeedOrchestrator,
    store: &PreferenceStore,
    movie_id: MovieId,
    hide_watched: bool,
    explain: bool,
    json: bool,
) -> Result<()> {
    let options = FeedOptions::new().hide_watched(hide_watched);
    let similar = orchestrator.similar_movies(store, movie_id, &options)?;

    if json {
        return print_json(&similar);
    }
    let title = orchestrator.resolve_movie(movie_id)?.title.clone();
    print_scored(
        &format!("Because you looked at {}", title),
        &similar,
        orchestrator.index().catalog(),
        explain,
    );
    Ok(())
}

fn rail_options(genres: Vec<GenreId>, sort: Option<SortBy>, hide_watched: bool) -> FeedOptions {
    let mut options = FeedOptions::new().with_genres(genres).hide_watched(hide_watched);
    options.sort_by = sort;
    options
}

/// Handle the 'trending' command
fn handle_trending(
    orchestrator: &FeedOrchestrator,
    store: &PreferenceStore,
    limit: usize,
    options: &FeedOptions,
    explain: bool,
    json: bool,
) -> Result<()> {
    let trending = orchestrator.trending(store, limit, options)?;

    if json {
        return print_json(&trending);
    }
    print_scored("Trending", &trending, orchestrator.index().catalog(), explain);
    Ok(())
}

/// Handle the 'top-rated' command
fn handle_top_rated(
    orchestrator: &FeedOrchestrator,
    store: &PreferenceStore,
    limit: usize,
    options: &FeedOptions,
    explain: bool,
    json: bool,
) -> Result<()> {
    let top_rated = orchestrator.top_rated(store, limit, options)?;

    if json {
        return print_json(&top_rated);
    }
    print_scored("Top rated", &top_rated, orchestrator.index().catalog(), explain);
    Ok(())
}

/// Handle the 'home' command
fn handle_home(
    orchestrator: &FeedOrchestrator,
    store: &PreferenceStore,
    options: &FeedOptions,
    explain: bool,
    json: bool,
) -> Result<()> {
    let feed = orchestrator.home_feed(store, options)?;

    if json {
        return print_json(&feed);
    }
    print_home(&feed, orchestrator.index().catalog(), explain);
    Ok(())
}

fn print_home(feed: &HomeFeed, catalog: &GenreCatalog, explain: bool) {
    if feed.recommended.is_empty() {
        println!("{}", "Recommended for you".bold().blue());
        println!("  {}", "Watch and rate a few movies 4 or 5 stars to fill this rail.".dimmed());
    } else {
        print_scored("Recommended for you", &feed.recommended, catalog, explain);
    }
    println!();
    print_scored("Trending", &feed.trending, catalog, explain);
    println!();
    print_scored("Top rated", &feed.top_rated, catalog, explain);
}

/// Handle the 'search' command
fn handle_search(orchestrator: &FeedOrchestrator, title: &str, json: bool) -> Result<()> {
    let matches = orchestrator.search(title);

    if json {
        return print_json(&matches);
    }
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches.iter().take(20) {
        println!("  {}", format_movie(movie, orchestrator.index().catalog()));
    }
    Ok(())
}

/// Handle the 'genres' command
fn handle_genres(catalog: &GenreCatalog, json: bool) -> Result<()> {
    if json {
        return print_json(&catalog.genres());
    }
    if catalog.is_empty() {
        println!("{}", "No genre catalog loaded (genres.json missing).".yellow());
        return Ok(());
    }
    for genre in catalog.genres() {
        println!("{:>6}  {}", genre.id.to_string().cyan(), genre.name);
    }
    Ok(())
}

/// Handle the 'watch' command
fn handle_watch(orchestrator: &FeedOrchestrator, store: &mut PreferenceStore, movie_id: MovieId) -> Result<()> {
    let movie = orchestrator.resolve_movie(movie_id)?.clone();
    let title = movie.title.clone();

    if store.add_to_watch_history(movie) {
        println!("{} Added {} to your watch history", "✓".green(), title.bold());
    } else {
        println!("{} is already in your watch history", title.bold());
    }
    Ok(())
}

/// Handle the 'rate' command
fn handle_rate(
    orchestrator: &FeedOrchestrator,
    store: &mut PreferenceStore,
    movie_id: MovieId,
    rating: StarRating,
) -> Result<()> {
    let title = orchestrator.resolve_movie(movie_id)?.title.clone();
    let stored = store
        .rate_movie(movie_id, rating)
        .with_context(|| format!("Failed to rate {}", title))?;

    println!("{} Rated {} {}", "✓".green(), title.bold(), stars(stored));
    if !store.watch_history().iter().any(|e| e.movie_id() == movie_id) {
        println!(
            "  {}",
            "Only rated movies in your watch history shape recommendations.".dimmed()
        );
    }
    Ok(())
}

/// Handle the 'watchlist' and 'favorites' commands
fn handle_list(
    orchestrator: &FeedOrchestrator,
    store: &mut PreferenceStore,
    list: MovieList,
    action: ListAction,
    json: bool,
) -> Result<()> {
    match action {
        ListAction::Add { movie_id } => {
            let movie = orchestrator.resolve_movie(movie_id)?.clone();
            let title = movie.title.clone();
            let added = match list {
                MovieList::Watchlist => store.add_to_watchlist(movie),
                MovieList::Favorites => store.add_to_favorites(movie),
            };
            if added {
                println!("{} Added {} to {}", "✓".green(), title.bold(), list.label());
            } else {
                println!("{} is already in {}", title.bold(), list.label());
            }
        }
        ListAction::Remove { movie_id } => {
            let removed = match list {
                MovieList::Watchlist => store.remove_from_watchlist(movie_id),
                MovieList::Favorites => store.remove_from_favorites(movie_id),
            };
            if removed {
                println!("{} Removed {} from {}", "✓".green(), movie_id, list.label());
            } else {
                println!("Movie {} is not in {}", movie_id, list.label());
            }
        }
        ListAction::Show => {
            let movies = match list {
                MovieList::Watchlist => store.watchlist(),
                MovieList::Favorites => store.favorites(),
            };
            if json {
                return print_json(&movies);
            }
            println!("{}", format!("Your {} ({}):", list.label(), movies.len()).bold().blue());
            for movie in movies {
                println!("  {}", format_movie(movie, orchestrator.index().catalog()));
            }
        }
    }
    Ok(())
}

/// Handle the 'history' command
fn handle_history(
    orchestrator: &FeedOrchestrator,
    store: &mut PreferenceStore,
    action: HistoryAction,
    json: bool,
) -> Result<()> {
    match action {
        HistoryAction::Show => {
            if json {
                return print_json(&store.watch_history());
            }
            println!(
                "{}",
                format!("Watch history ({}), newest first:", store.watch_history().len())
                    .bold()
                    .blue()
            );
            for entry in store.watch_history() {
                let rating = store.get_movie_rating(entry.movie_id());
                println!(
                    "  {}  {} {}",
                    entry.watched_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                    format_movie(&entry.movie, orchestrator.index().catalog()),
                    stars(rating)
                );
            }
        }
        HistoryAction::Clear => {
            store.clear_watch_history();
            println!("{} Cleared watch history", "✓".green());
        }
    }
    Ok(())
}

/// Handle the 'profile' command
fn handle_profile(orchestrator: &FeedOrchestrator, store: &PreferenceStore, json: bool) -> Result<()> {
    let profile = orchestrator.profile(store);
    if json {
        return print_json(&profile);
    }
    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &ProfileSummary) {
    println!("{}", "Your profile".bold().blue());
    println!("{}Watched: {} ({} liked)", "• ".green(), profile.watched, profile.liked);
    println!("{}Rated: {}", "• ".green(), profile.rated);
    println!("{}Watchlist: {}", "• ".green(), profile.watchlist);
    println!("{}Favorites: {}", "• ".green(), profile.favorites);

    if profile.preferred_genres.is_empty() {
        println!("No preferred genres yet.");
        return;
    }
    println!("Preferred genres:");
    for (rank, genre) in profile.preferred_genres.iter().enumerate() {
        let name = genre
            .name
            .clone()
            .unwrap_or_else(|| format!("genre {}", genre.id));
        println!("  {}. {} ({} liked)", rank + 1, name, genre.count);
    }
}

/// Print a persistence failure without failing the command
fn report_persist_error(store: &mut PreferenceStore) {
    if let Some(e) = store.take_persist_error() {
        warn!("Preferences were not saved: {}", e);
        eprintln!("{} changes were not saved: {}", "warning:".yellow(), e);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to encode output as JSON")?;
    println!("{}", rendered);
    Ok(())
}

fn format_movie(movie: &Movie, catalog: &GenreCatalog) -> String {
    let year = movie
        .release_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "????".to_string());
    let genres = catalog.describe(&movie.genre_ids, 3);
    format!(
        "{}: {} ({}) [{}] {:.1}",
        movie.id.to_string().cyan(),
        movie.title,
        year,
        genres,
        movie.vote_average()
    )
}

fn stars(rating: StarRating) -> String {
    if rating == 0 {
        return String::new();
    }
    "★".repeat(rating as usize).yellow().to_string()
}

/// Helper function to format and print a scored rail
fn print_scored(header: &str, movies: &[ScoredMovie], catalog: &GenreCatalog, explain: bool) {
    println!("{}", header.bold().blue());
    for (i, scored) in movies.iter().enumerate() {
        println!(
            "{}. {}",
            (i + 1).to_string().green(),
            format_movie(&scored.movie, catalog)
        );
        if explain {
            let matched = if scored.matched_genres.is_empty() {
                "none".to_string()
            } else {
                catalog.describe(&scored.matched_genres, scored.matched_genres.len())
            };
            println!(
                "   Score: {:.2}, Source: {:?}, Matched genres: {}",
                scored.score, scored.source, matched
            );
        }
    }
}
