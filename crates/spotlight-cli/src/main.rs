//! Artist Spotlight CLI - browse the artists and events directory from a terminal.
//!
//! Collections are read from a web server (`--data-url`) or a local
//! directory (`--data-dir`) and cached in the user's cache directory
//! between runs.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spotlight_core::api::{DirectoryFetcher, Fetcher, HttpFetcher};
use spotlight_core::facets::{facet_options, ARTIST_MEDIUMS, EVENT_TYPES};
use spotlight_core::filter::{
    ArtistCriteria, ArtistSort, EventCriteria, EventSort, PriceFilter, Timeframe,
};
use spotlight_core::models::{Artist, Event, Experience, ResourceKind};
use spotlight_core::prefs::{FileBackend, PreferenceStore};
use spotlight_core::{App, Config};

// ============================================================================
// Constants
// ============================================================================

/// Bio and description excerpts in list output
const EXCERPT_LEN: usize = 80;

const LOG_FILE: &str = "spotlight.log";

// ============================================================================
// Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "spotlight")]
#[command(about = "Browse the Artist Spotlight directory")]
#[command(version)]
struct Cli {
    /// Base URL serving artists.json and events.json
    #[arg(long, env = "SPOTLIGHT_DATA_URL", global = true)]
    data_url: Option<String>,

    /// Local directory holding artists.json and events.json
    #[arg(long, env = "SPOTLIGHT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Also write logs to a file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List artists matching the given filters
    Artists(ArtistArgs),
    /// List events matching the given filters
    Events(EventArgs),
    /// Show one artist and remember the view
    Artist { id: String },
    /// Show one event and remember the view
    Event { id: String },
    /// Print a calendar link for an event and remember the addition
    Calendar { id: String },
    /// Category counts for both collections
    Facets,
    /// Featured artists preview
    Featured,
    /// Next upcoming events preview
    Upcoming,
    /// Recently viewed artists or events
    Recent {
        #[arg(value_enum)]
        collection: Collection,
    },
    /// Cache age of each collection
    Status,
    /// Drop cached collections, saved filters and view history
    ClearCache,
}

#[derive(Args, Debug)]
struct ArtistArgs {
    #[arg(long)]
    medium: Option<String>,
    #[arg(long)]
    available: bool,
    #[arg(long)]
    featured: bool,
    #[arg(long, value_parser = parse_experience)]
    experience: Option<Experience>,
    #[arg(long)]
    search: Option<String>,
    /// name, newest, rating or portfolio
    #[arg(long)]
    sort: Option<ArtistSort>,
    /// Start from the filters used last time
    #[arg(long)]
    last: bool,
}

#[derive(Args, Debug)]
struct EventArgs {
    #[arg(long)]
    category: Option<String>,
    /// upcoming, past, ongoing, today, this-week or this-month
    #[arg(long)]
    timeframe: Option<Timeframe>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// free or paid
    #[arg(long)]
    price: Option<PriceFilter>,
    /// date-asc, date-desc, title, location or price
    #[arg(long)]
    sort: Option<EventSort>,
    /// Start from the filters used last time
    #[arg(long)]
    last: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Collection {
    Artists,
    Events,
}

impl From<Collection> for ResourceKind {
    fn from(c: Collection) -> Self {
        match c {
            Collection::Artists => ResourceKind::Artists,
            Collection::Events => ResourceKind::Events,
        }
    }
}

fn parse_experience(s: &str) -> Result<Experience, String> {
    Experience::parse(s).ok_or_else(|| {
        format!(
            "unknown experience level '{}' (expected beginner, intermediate, experienced or professional)",
            s
        )
    })
}

impl ArtistArgs {
    fn into_criteria(self, saved: ArtistCriteria) -> ArtistCriteria {
        let base = if self.last { saved } else { ArtistCriteria::default() };
        ArtistCriteria {
            medium: self.medium.or(base.medium),
            available_only: self.available || base.available_only,
            featured_only: self.featured || base.featured_only,
            experience: self.experience.or(base.experience),
            search: self.search.or(base.search),
            sort_by: self.sort.or(base.sort_by),
        }
    }
}

impl EventArgs {
    fn into_criteria(self, saved: EventCriteria) -> EventCriteria {
        let base = if self.last { saved } else { EventCriteria::default() };
        EventCriteria {
            category: self.category.or(base.category),
            timeframe: self.timeframe.or(base.timeframe),
            location: self.location.or(base.location),
            search: self.search.or(base.search),
            price: self.price.or(base.price),
            sort_by: self.sort.or(base.sort_by),
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Initialize the tracing subscriber for logging.
///
/// RUST_LOG controls the level (default `warn`). The returned guard must be
/// held until exit so buffered file output is flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn build_fetcher(config: &Config) -> Result<Arc<dyn Fetcher>> {
    if let Some(url) = &config.data_url {
        let fetcher = HttpFetcher::new(url, config.request_timeout())
            .context("Failed to build HTTP client")?;
        return Ok(Arc::new(fetcher));
    }
    if let Some(dir) = &config.data_dir {
        return Ok(Arc::new(DirectoryFetcher::new(dir.clone())));
    }
    bail!("No data source configured. Pass --data-url or --data-dir (or set SPOTLIGHT_DATA_URL / SPOTLIGHT_DATA_DIR).")
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());
    info!("Artist Spotlight starting");

    let mut config = Config::load().context("Failed to load configuration")?;
    if cli.data_url.is_some() {
        config.data_url = cli.data_url.clone();
    }
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
        if cli.data_url.is_none() {
            config.data_url = None;
        }
    }

    let cache_dir = config.cache_dir()?;
    debug!(path = %cache_dir.display(), "Using cache directory");
    let backend = FileBackend::new(cache_dir).context("Failed to open cache directory")?;
    let prefs = PreferenceStore::new(Arc::new(backend));

    if let Command::ClearCache = cli.command {
        prefs.clear();
        println!("Cleared cached data, saved filters and view history.");
        return Ok(());
    }

    let fetcher = build_fetcher(&config)?;
    let mut app = App::new(config, prefs, fetcher);
    let now = Utc::now();
    app.refresh(now).await;

    for kind in ResourceKind::ALL {
        if let Some(message) = app.failure_message(kind) {
            eprintln!("{}", message);
        }
    }

    let json = cli.json;
    match cli.command {
        Command::Artists(args) => {
            let criteria = args.into_criteria(app.restore_artist_criteria());
            let artists = app.filtered_artists(&criteria);
            if json {
                print_json(&artists)?;
            } else {
                println!("{} of {} artists", artists.len(), app.artists.len());
                artists.iter().for_each(print_artist_line);
            }
        }
        Command::Events(args) => {
            let criteria = args.into_criteria(app.restore_event_criteria());
            let events = app.filtered_events(&criteria);
            if json {
                print_json(&events)?;
            } else {
                println!("{} of {} events", events.len(), app.events.len());
                events.iter().for_each(print_event_line);
            }
        }
        Command::Artist { id } => {
            let artist = app
                .find_artist(&id)
                .with_context(|| format!("No artist with id '{}'", id))?;
            app.record_artist_view(artist, now);
            if json {
                print_json(artist)?;
            } else {
                print_artist_detail(artist);
            }
        }
        Command::Event { id } => {
            let event = app
                .find_event(&id)
                .with_context(|| format!("No event with id '{}'", id))?;
            app.record_event_view(event, now);
            if json {
                print_json(event)?;
            } else {
                print_event_detail(event);
            }
        }
        Command::Calendar { id } => {
            let event = app
                .find_event(&id)
                .with_context(|| format!("No event with id '{}'", id))?;
            let url = app
                .add_to_calendar(event, now)
                .with_context(|| format!("Event '{}' has no date", id))?;
            println!("{}", url);
        }
        Command::Facets => {
            let mediums = facet_options(&ARTIST_MEDIUMS, &app.medium_facets);
            let types = facet_options(&EVENT_TYPES, &app.event_type_facets);
            if json {
                print_json(&serde_json::json!({ "mediums": mediums, "eventTypes": types }))?;
            } else {
                println!("Artist mediums:");
                for option in mediums {
                    println!("  {:<20} {:>4}", option.label, option.count);
                }
                println!("Event types:");
                for option in types {
                    println!("  {:<20} {:>4}", option.label, option.count);
                }
            }
        }
        Command::Featured => {
            let featured = app.featured_artists();
            if json {
                print_json(&featured)?;
            } else if featured.is_empty() {
                println!("No featured artists.");
            } else {
                featured.into_iter().for_each(print_artist_line);
            }
        }
        Command::Upcoming => {
            let upcoming = app.upcoming_events();
            if json {
                print_json(&upcoming)?;
            } else if upcoming.is_empty() {
                println!("No upcoming events.");
            } else {
                upcoming.into_iter().for_each(print_event_line);
            }
        }
        Command::Recent { collection } => {
            let recent = app.recently_viewed(collection.into());
            if json {
                print_json(&recent)?;
            } else {
                for entry in recent {
                    println!(
                        "{}  {} ({})",
                        entry.viewed_at.format("%Y-%m-%d %H:%M"),
                        entry.name,
                        entry.category
                    );
                }
            }
        }
        Command::Status => {
            for kind in ResourceKind::ALL {
                let source = match app.load_source(kind) {
                    Some(source) => format!("{:?}", source).to_lowercase(),
                    None => "failed".to_string(),
                };
                println!("{:<8} cached {:<10} source {}", kind.name(), app.cache_age(kind, now), source);
            }
        }
        Command::ClearCache => {}
    }

    info!("Artist Spotlight done");
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_artist_line(artist: &Artist) {
    println!(
        "{:<24} {:<14} {} {:<9} {}",
        artist.display_name,
        artist.medium_label(),
        artist.stars(),
        artist.status_label(),
        artist.bio_excerpt(EXCERPT_LEN)
    );
}

fn print_event_line(event: &Event) {
    let countdown = event.countdown_label().unwrap_or_default();
    println!(
        "{:<32} {:<16} {:<10} {} {}",
        event.title,
        event.type_label(),
        event.price_label(),
        event.formatted_date,
        countdown
    );
}

fn print_artist_detail(artist: &Artist) {
    println!("{} ({})", artist.display_name, artist.id);
    println!("  Medium:     {}", artist.medium_label());
    if !artist.secondary_mediums.is_empty() {
        println!("  Also:       {}", artist.secondary_mediums.join(", "));
    }
    if let Some(level) = artist.experience {
        println!("  Experience: {}", level);
    }
    println!("  Rating:     {} ({:.1})", artist.stars(), artist.rating);
    println!("  Status:     {}", artist.status_label());
    println!("  Works:      {}", artist.portfolio_count);
    if let Some(location) = &artist.location {
        println!("  Location:   {}", location);
    }
    if let Some(website) = &artist.website {
        println!("  Website:    {}", website);
    }
    println!("  Tags:       {}", artist.tags.join(", "));
    if !artist.bio.is_empty() {
        println!();
        println!("{}", artist.bio);
    }
}

fn print_event_detail(event: &Event) {
    println!("{} ({})", event.title, event.id);
    println!("  Type:     {}", event.type_label());
    println!("  When:     {} [{}]", event.formatted_date, event.status().label());
    if let Some(time) = &event.time {
        println!("  Time:     {}", time);
    }
    println!("  Where:    {}", event.location);
    if let Some(venue) = &event.venue {
        println!("  Venue:    {}", venue);
    }
    println!("  Price:    {}", event.price_label());
    if let Some(organizer) = &event.organizer {
        println!("  Host:     {}", organizer);
    }
    if let Some(url) = &event.registration_url {
        println!("  Register: {}", url);
    }
    if let Some(link) = event.calendar_url() {
        println!("  Calendar: {}", link);
    }
    if !event.description.is_empty() {
        println!();
        println!("{}", event.description);
    }
}
