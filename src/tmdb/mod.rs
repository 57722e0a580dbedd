use async_trait::async_trait;
use tracing::{debug, info};

mod client;
mod records;

pub use client::TmdbClient;

use crate::models::{Genre, MovieDetail, MovieSummary, SearchCriteria, SimilarMovie};
use crate::region::Region;
use records::{ProviderResults, RawMovie, Videos};

pub const SIMILAR_LIMIT: usize = 8;
const DETAIL_APPENDS: &str = "videos,watch/providers";

/// Every method degrades to an empty value (or `None`) when the upstream call
/// fails; callers never see transport or status errors.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn genres(&self) -> Vec<Genre>;
    async fn search_movies(&self, criteria: &SearchCriteria) -> Vec<MovieSummary>;
    async fn discover_movies(&self, genre_id: Option<i64>, year: Option<i32>) -> Vec<MovieSummary>;
    async fn movie_detail(&self, id: i64, region: Region) -> Option<MovieDetail>;
    async fn similar_movies(&self, id: i64) -> Vec<SimilarMovie>;
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn genres(&self) -> Vec<Genre> {
        let body = self.get_json("/genre/movie/list", &[]).await;
        records::parse_genres(&body)
    }

    /// Title searches go to the text-search endpoint; a genre filter is then
    /// applied locally because that endpoint has no genre parameter. Without a
    /// title the query becomes a popularity-sorted discovery.
    async fn search_movies(&self, criteria: &SearchCriteria) -> Vec<MovieSummary> {
        let Some(title) = criteria.title.as_deref() else {
            return self.discover_movies(criteria.genre_id, criteria.year).await;
        };

        let mut params = vec![
            ("query", title.to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(year) = criteria.year {
            params.push(("primary_release_year", year.to_string()));
        }

        let body = self.get_json("/search/movie", &params).await;
        let results: Vec<RawMovie> = records::parse_records(&body, "results");
        let total = results.len();
        let summaries: Vec<MovieSummary> = results
            .into_iter()
            .filter(|m| criteria.genre_id.map_or(true, |g| m.has_genre(g)))
            .map(RawMovie::into_summary)
            .collect();
        debug!(
            "Search '{}' returned {} results, {} after genre filter",
            title,
            total,
            summaries.len()
        );
        summaries
    }

    async fn discover_movies(&self, genre_id: Option<i64>, year: Option<i32>) -> Vec<MovieSummary> {
        let mut params = vec![("sort_by", "popularity.desc".to_string())];
        if let Some(genre) = genre_id {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = year {
            params.push(("primary_release_year", year.to_string()));
        }

        let body = self.get_json("/discover/movie", &params).await;
        records::parse_records::<RawMovie>(&body, "results")
            .into_iter()
            .map(RawMovie::into_summary)
            .collect()
    }

    /// Fetches the record with videos and providers embedded. If the upstream
    /// leaves either sub-resource out, it is fetched separately.
    async fn movie_detail(&self, id: i64, region: Region) -> Option<MovieDetail> {
        let body = self
            .get_json(
                &format!("/movie/{id}"),
                &[("append_to_response", DETAIL_APPENDS.to_string())],
            )
            .await;
        let Some(appended) = records::parse_detail(&body) else {
            info!("No TMDB movie record for id {}", id);
            return None;
        };

        let records::DetailAppended {
            detail,
            videos,
            providers,
        } = appended;
        let (videos, providers) = tokio::join!(
            async move {
                match videos {
                    Some(v) => v,
                    None => self.fetch_videos(id).await,
                }
            },
            async move {
                match providers {
                    Some(p) => p,
                    None => self.fetch_providers(id).await,
                }
            },
        );

        Some(records::build_detail(detail, &videos, &providers, region))
    }

    async fn similar_movies(&self, id: i64) -> Vec<SimilarMovie> {
        let body = self.get_json(&format!("/movie/{id}/similar"), &[]).await;
        records::parse_records::<RawMovie>(&body, "results")
            .into_iter()
            .take(SIMILAR_LIMIT)
            .map(RawMovie::into_similar)
            .collect()
    }
}

impl TmdbClient {
    async fn fetch_videos(&self, id: i64) -> Videos {
        debug!("Videos not embedded for {}, fetching separately", id);
        let body = self.get_json(&format!("/movie/{id}/videos"), &[]).await;
        records::parse_videos(body)
    }

    async fn fetch_providers(&self, id: i64) -> ProviderResults {
        debug!("Watch providers not embedded for {}, fetching separately", id);
        let body = self
            .get_json(&format!("/movie/{id}/watch/providers"), &[])
            .await;
        records::parse_providers(body)
    }
}
