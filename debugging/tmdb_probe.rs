//! Query TMDB through the site's client and print the normalized records.
//! Usage:
//!   cargo run --bin tmdb_probe -- genres
//!   cargo run --bin tmdb_probe -- search <title> [year]
//!   cargo run --bin tmdb_probe -- detail <tmdb_id> [region]
//!   cargo run --bin tmdb_probe -- similar <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinescout::config::Config;
use cinescout::models::SearchCriteria;
use cinescout::region::Region;
use cinescout::tmdb::{TmdbApi, TmdbClient};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Probe {
    Genres,
    Search,
    Detail,
    Similar,
}

impl FromStr for Probe {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "genres" => Ok(Probe::Genres),
            "search" => Ok(Probe::Search),
            "detail" => Ok(Probe::Detail),
            "similar" => Ok(Probe::Similar),
            _ => Err(anyhow::anyhow!(
                "probe must be one of 'genres', 'search', 'detail', 'similar'"
            )),
        }
    }
}

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin tmdb_probe -- genres");
    eprintln!("       cargo run --bin tmdb_probe -- search <title> [year]");
    eprintln!("       cargo run --bin tmdb_probe -- detail <tmdb_id> [region]");
    eprintln!("       cargo run --bin tmdb_probe -- similar <tmdb_id>");
    std::process::exit(1);
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    arg.ok_or_else(|| anyhow::anyhow!("missing tmdb_id"))?
        .parse()
        .context("tmdb_id must be an integer")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let probe = Probe::from_str(&args[1])?;
    let config = Config::from_env()?;
    let client = TmdbClient::new(&config)?;

    let output = match probe {
        Probe::Genres => serde_json::to_value(client.genres().await)?,
        Probe::Search => {
            let Some(title) = args.get(2) else { usage() };
            let criteria =
                SearchCriteria::from_form(Some(title.as_str()), None, args.get(3).map(String::as_str));
            serde_json::to_value(client.search_movies(&criteria).await)?
        }
        Probe::Detail => {
            let id = parse_id(args.get(2))?;
            let region = Region::resolve(args.get(3).map(String::as_str), config.default_region);
            match client.movie_detail(id, region).await {
                Some(detail) => serde_json::to_value(detail)?,
                None => anyhow::bail!("No TMDB movie found for id {}", id),
            }
        }
        Probe::Similar => {
            let id = parse_id(args.get(2))?;
            serde_json::to_value(client.similar_movies(id).await)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
