//! Upstream record shapes and their conversion into the site's typed records.
//!
//! Every list element is parsed on its own so one malformed entry never drops
//! the rest of the list. Optional fields of the wrong type are treated as
//! missing instead of failing the record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::models::{
    backdrop_url, overview_snippet, poster_url, release_year, round_rating, Genre, MovieDetail,
    MovieSummary, SimilarMovie, WatchProviders,
};
use crate::region::Region;

pub(crate) const YOUTUBE_WATCH_BASE: &str = "https://www.youtube.com/watch?v=";
const PROVIDER_FALLBACK_REGION: Region = Region::US;

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

/// A list whose elements are parsed one by one. Elements that fail to parse
/// are dropped, and anything other than an array reads as empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Same as [`lenient_list`] for the values of an object.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| Some((key, serde_json::from_value(value).ok()?)))
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawMovie {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub original_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub vote_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub genre_ids: Vec<i64>,
}

impl RawMovie {
    fn display_title(&self) -> String {
        self.title
            .as_deref()
            .or(self.original_title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled")
            .to_string()
    }

    pub fn has_genre(&self, genre_id: i64) -> bool {
        self.genre_ids.contains(&genre_id)
    }

    pub fn into_summary(self) -> MovieSummary {
        let title = self.display_title();
        MovieSummary {
            id: self.id,
            title,
            overview_snippet: overview_snippet(self.overview.as_deref().unwrap_or_default()),
            poster_url: poster_url(self.poster_path.as_deref()),
            rating: round_rating(self.vote_average),
            vote_count: self.vote_count.unwrap_or(0),
            release_year: release_year(self.release_date.as_deref()),
        }
    }

    pub fn into_similar(self) -> SimilarMovie {
        let title = self.display_title();
        SimilarMovie {
            id: self.id,
            title,
            poster_path: self.poster_path.filter(|p| !p.is_empty()),
            rating: round_rating(self.vote_average),
            release_date: self.release_date.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NamedGenre {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDetail {
    #[serde(flatten)]
    pub movie: RawMovie,
    #[serde(default, deserialize_with = "lenient")]
    tagline: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    runtime: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    genres: Vec<NamedGenre>,
}

/// Detail response composed with `append_to_response=videos,watch/providers`.
/// Either sub-resource is `None` when the upstream did not embed it.
#[derive(Debug, Deserialize)]
pub(crate) struct DetailAppended {
    #[serde(flatten)]
    pub detail: RawDetail,
    #[serde(default, deserialize_with = "lenient")]
    pub videos: Option<Videos>,
    #[serde(default, rename = "watch/providers", deserialize_with = "lenient")]
    pub providers: Option<ProviderResults>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Videos {
    #[serde(default, deserialize_with = "lenient_list")]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default, deserialize_with = "lenient")]
    site: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    video_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProviderResults {
    #[serde(default, deserialize_with = "lenient_map")]
    results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Default, Deserialize)]
struct RegionProviders {
    #[serde(default, deserialize_with = "lenient_list")]
    flatrate: Vec<Provider>,
    #[serde(default, deserialize_with = "lenient_list")]
    buy: Vec<Provider>,
    #[serde(default, deserialize_with = "lenient_list")]
    rent: Vec<Provider>,
}

impl RegionProviders {
    fn is_empty(&self) -> bool {
        self.flatrate.is_empty() && self.buy.is_empty() && self.rent.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct Provider {
    #[serde(default, deserialize_with = "lenient")]
    provider_name: Option<String>,
}

/// Parses `body[key]` as a list, keeping the elements that parse as `T`.
pub(crate) fn parse_records<T: DeserializeOwned>(body: &Value, key: &str) -> Vec<T> {
    let Some(items) = body.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping malformed '{}' entry: {}", key, e);
                None
            }
        })
        .collect()
}

pub(crate) fn parse_genres(body: &Value) -> Vec<Genre> {
    let mut seen = HashSet::new();
    parse_records::<Genre>(body, "genres")
        .into_iter()
        .filter(|g| seen.insert(g.id))
        .collect()
}

/// `None` when the body is not a movie record, which covers the empty object
/// returned for failed calls.
pub(crate) fn parse_detail(body: &Value) -> Option<DetailAppended> {
    if body.get("id").and_then(Value::as_i64).is_none() {
        return None;
    }
    match serde_json::from_value(body.clone()) {
        Ok(detail) => Some(detail),
        Err(e) => {
            debug!("Malformed movie detail record: {}", e);
            None
        }
    }
}

pub(crate) fn parse_videos(body: Value) -> Videos {
    serde_json::from_value(body).unwrap_or_default()
}

pub(crate) fn parse_providers(body: Value) -> ProviderResults {
    serde_json::from_value(body).unwrap_or_default()
}

/// First YouTube trailer in upstream order.
pub(crate) fn select_trailer(videos: &Videos) -> Option<String> {
    videos
        .results
        .iter()
        .filter(|v| {
            v.site.as_deref() == Some("YouTube") && v.video_type.as_deref() == Some("Trailer")
        })
        .find_map(|v| v.key.as_deref().filter(|k| !k.is_empty()))
        .map(|key| format!("{YOUTUBE_WATCH_BASE}{key}"))
}

/// Provider groups for `region`. A region with no listing borrows the US
/// listing, and the result records that in `fallback_region`.
pub(crate) fn providers_for(results: &ProviderResults, region: Region) -> WatchProviders {
    let listed = |r: Region| results.results.get(r.code()).filter(|e| !e.is_empty());

    let (entry, fallback_region) = match listed(region) {
        Some(entry) => (entry, None),
        None => match listed(PROVIDER_FALLBACK_REGION) {
            Some(entry) if region != PROVIDER_FALLBACK_REGION => {
                debug!(
                    "No providers listed for {}, showing {}",
                    region, PROVIDER_FALLBACK_REGION
                );
                (entry, Some(PROVIDER_FALLBACK_REGION))
            }
            _ => return WatchProviders::default(),
        },
    };
    WatchProviders {
        stream: provider_names(&entry.flatrate),
        buy: provider_names(&entry.buy),
        rent: provider_names(&entry.rent),
        fallback_region,
    }
}

fn provider_names(group: &[Provider]) -> Vec<String> {
    group
        .iter()
        .filter_map(|p| p.provider_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn build_detail(
    detail: RawDetail,
    videos: &Videos,
    providers: &ProviderResults,
    region: Region,
) -> MovieDetail {
    let RawDetail {
        movie,
        tagline,
        runtime,
        backdrop_path,
        genres,
    } = detail;

    let overview = movie.overview.clone().unwrap_or_default().trim().to_string();
    let genre_names = genres
        .into_iter()
        .filter_map(|g| g.name)
        .filter(|n| !n.trim().is_empty())
        .collect();

    MovieDetail {
        summary: movie.into_summary(),
        overview,
        tagline: tagline.filter(|t| !t.trim().is_empty()),
        runtime_minutes: runtime.filter(|r| *r > 0),
        backdrop_url: backdrop_url(backdrop_path.as_deref()),
        genre_names,
        trailer_url: select_trailer(videos),
        watch_providers: providers_for(providers, region),
        region,
    }
}
