use crate::region::Region;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/w1280";
pub const OVERVIEW_SNIPPET_CHARS: usize = 230;
const EARLIEST_YEAR: i32 = 1870;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub title: Option<String>,
    pub genre_id: Option<i64>,
    pub year: Option<i32>,
}

impl SearchCriteria {
    /// Builds criteria from raw form values. Blank values are dropped, as are
    /// genres that are not integers and years outside a plausible range.
    pub fn from_form(title: Option<&str>, genre: Option<&str>, year: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let genre_id = genre.map(str::trim).filter(|g| !g.is_empty()).and_then(|g| {
            let parsed = g.parse::<i64>().ok().filter(|id| *id > 0);
            if parsed.is_none() {
                debug!("Ignoring invalid genre filter '{}'", g);
            }
            parsed
        });

        let latest_year = Utc::now().year() + 5;
        let year = year.map(str::trim).filter(|y| !y.is_empty()).and_then(|y| {
            let parsed = y
                .parse::<i32>()
                .ok()
                .filter(|v| (EARLIEST_YEAR..=latest_year).contains(v));
            if parsed.is_none() {
                debug!("Ignoring invalid year filter '{}'", y);
            }
            parsed
        });

        Self {
            title,
            genre_id,
            year,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.genre_id.is_none() && self.year.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub overview_snippet: String,
    pub poster_url: Option<String>,
    pub rating: Option<f64>,
    pub vote_count: u64,
    pub release_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchProviders {
    pub stream: Vec<String>,
    pub buy: Vec<String>,
    pub rent: Vec<String>,
    /// Set when the requested region had no listing and these groups belong
    /// to another region.
    pub fallback_region: Option<Region>,
}

impl WatchProviders {
    pub fn is_empty(&self) -> bool {
        self.stream.is_empty() && self.buy.is_empty() && self.rent.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub overview: String,
    pub tagline: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub backdrop_url: Option<String>,
    pub genre_names: Vec<String>,
    pub trailer_url: Option<String>,
    pub watch_providers: WatchProviders,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarMovie {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub rating: Option<f64>,
    pub release_date: String,
}

impl SimilarMovie {
    pub fn poster_url(&self) -> Option<String> {
        poster_url(self.poster_path.as_deref())
    }
}

pub fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{POSTER_BASE}{p}"))
}

pub fn backdrop_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{BACKDROP_BASE}{p}"))
}

/// Rounds a vote average to one decimal place. Non-finite values count as absent.
pub fn round_rating(raw: Option<f64>) -> Option<f64> {
    raw.filter(|v| v.is_finite()).map(|v| (v * 10.0).round() / 10.0)
}

/// First four characters of a release date, or an empty string.
pub fn release_year(date: Option<&str>) -> String {
    date.map(|d| d.chars().take(4).collect())
        .unwrap_or_default()
}

pub fn overview_snippet(overview: &str) -> String {
    let trimmed = overview.trim();
    if trimmed.chars().count() <= OVERVIEW_SNIPPET_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(OVERVIEW_SNIPPET_CHARS - 3).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}
