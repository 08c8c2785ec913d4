//! Jikan gateway CLI: browse the anime catalog through the paced gateway.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jikan_gateway::api::{AnimeData, DataResponse, PaginatedResponse};
use jikan_gateway::feed::{anime_detail, home_feed};
use jikan_gateway::format::{
    display_title, format_count, format_score, truncate_text, youtube_embed_url,
};
use jikan_gateway::JikanGateway;
use serde::Serialize;
use shared::{Config, ConfigOrigin, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print raw JSON instead of a listing
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hero, trending and upcoming sections, fetched concurrently
    Home,
    /// Top-ranked anime
    Top {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 25)]
        limit: u32,
    },
    /// Upcoming season
    Upcoming {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Currently airing season
    Season {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Free-text search
    Search {
        query: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Details of a single anime by MAL ID
    Anime { id: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let (config, origin) = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mut log_config = LogConfig::from_settings("jikan-gateway", &config.logging);
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    match origin {
        ConfigOrigin::File(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigOrigin::Defaults => warn!(
            path = %args.config.display(),
            "Config file not found, using defaults"
        ),
    }

    let gateway =
        JikanGateway::from_config(&config.gateway).context("Failed to create Jikan gateway")?;
    info!(
        base_url = %config.gateway.base_url,
        min_interval_ms = config.gateway.min_interval_ms,
        "Gateway ready"
    );

    match args.command {
        Command::Home => {
            let feed = home_feed(&gateway).await;
            if args.json {
                print_json(&feed)?;
            } else {
                print_section("Top picks", &feed.hero);
                print_section("Trending now", &feed.trending);
                print_section("Coming soon", &feed.upcoming);
            }
        }
        Command::Top { page, limit } => {
            let response = gateway.top_anime(page, limit).await?;
            print_page("Top anime", &response, args.json)?;
        }
        Command::Upcoming { page } => {
            let response = gateway.upcoming_anime(page).await?;
            print_page("Upcoming", &response, args.json)?;
        }
        Command::Season { page } => {
            let response = gateway.current_season_anime(page).await?;
            print_page("This season", &response, args.json)?;
        }
        Command::Search { query, page } => {
            let response = gateway.search_anime(&query, page).await?;
            if response.data.is_empty() && !args.json {
                println!("No results found for \"{}\"", query.trim());
            } else {
                print_page("Search results", &response, args.json)?;
            }
        }
        Command::Anime { id } => match anime_detail(&gateway, &id).await {
            Some(response) => print_detail(&response, args.json)?,
            None => {
                eprintln!("Anime not found: {}", id);
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn print_page(
    heading: &str,
    response: &PaginatedResponse<AnimeData>,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(response);
    }
    print_section(heading, &response.data);
    println!(
        "page {}/{}{}",
        response.pagination.current_page,
        response.pagination.last_visible_page,
        if response.pagination.has_next_page {
            " (more available)"
        } else {
            ""
        }
    );
    Ok(())
}

fn print_section(heading: &str, entries: &[AnimeData]) {
    println!("== {} ==", heading);
    if entries.is_empty() {
        println!("  (nothing to show)");
        return;
    }
    for anime in entries {
        println!("{}", listing_line(anime));
    }
}

fn listing_line(anime: &AnimeData) -> String {
    let rank = anime
        .rank
        .map(|r| format!("#{}", r))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "  {:>6}  {:<7}  {:<48}  ★ {:>4}  {:>6} members",
        rank,
        anime.mal_id,
        truncate_text(Some(display_title(anime)), 45),
        format_score(anime.score),
        format_count(anime.members),
    )
}

fn print_detail(response: &DataResponse<AnimeData>, json: bool) -> Result<()> {
    if json {
        return print_json(response);
    }

    let anime = &response.data;
    println!("{} ({})", display_title(anime), anime.mal_id);
    if anime.title_english.is_some() && display_title(anime) != anime.title {
        println!("  {}", anime.title);
    }
    println!(
        "  score {}  rank {}  members {}  favorites {}",
        format_score(anime.score),
        anime.rank.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string()),
        format_count(anime.members),
        format_count(anime.favorites),
    );
    if let Some(status) = &anime.status {
        let episodes = anime
            .episodes
            .map(|e| format!("{} episodes", e))
            .unwrap_or_else(|| "episodes unknown".to_string());
        println!("  {}, {}", status, episodes);
    }
    if let Some(aired) = anime.aired.as_ref().and_then(|a| a.string.as_deref()) {
        println!("  aired {}", aired);
    }
    if !anime.genres.is_empty() {
        let genres: Vec<&str> = anime.genres.iter().map(|g| g.name.as_str()).collect();
        println!("  genres: {}", genres.join(", "));
    }
    if !anime.studios.is_empty() {
        let studios: Vec<&str> = anime.studios.iter().map(|s| s.name.as_str()).collect();
        println!("  studios: {}", studios.join(", "));
    }
    let trailer = anime.trailer.as_ref().and_then(|t| t.youtube_id.as_deref());
    if let Some(url) = youtube_embed_url(trailer) {
        println!("  trailer: {}", url);
    }
    if anime.synopsis.is_some() {
        println!();
        println!("{}", truncate_text(anime.synopsis.as_deref(), 600));
    }
    Ok(())
}
