use crate::region::{Region, FALLBACK_REGION};
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use tracing::warn;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Process-wide settings, built once at startup and handed to the components
/// that need them.
#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub language: String,
    pub default_region: Region,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let tmdb_api_key = var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;

        let tmdb_base_url = var("TMDB_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| TMDB_BASE.to_string());

        let language = var("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let default_region = match var("DEFAULT_REGION") {
            Some(raw) => Region::parse(&raw).unwrap_or_else(|| {
                warn!(
                    "DEFAULT_REGION '{}' is not supported, using {}",
                    raw, FALLBACK_REGION
                );
                FALLBACK_REGION
            }),
            None => FALLBACK_REGION,
        };

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR '{}' is not a socket address", bind_raw))?;

        Ok(Self {
            tmdb_api_key,
            tmdb_base_url,
            language,
            default_region,
            bind_addr,
        })
    }

    /// Configuration pointing at an arbitrary upstream, used by tests and the debugging binary.
    pub fn for_upstream(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            tmdb_api_key: api_key.into(),
            tmdb_base_url: base_url.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            default_region: FALLBACK_REGION,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        }
    }
}
