use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(config: &Config) -> Result<Self> {
        let user_agent = format!("cinescout/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: config.tmdb_api_key.clone(),
            base_url: config.tmdb_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }

    /// GETs `path` with the API key and language attached. Anything other than
    /// a 200 with a JSON body comes back as an empty object; the failure is
    /// logged here and nowhere else.
    pub async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Value {
        let url = format!("{}{}", self.base_url, path);
        debug!(path = %path, "TMDB request");

        let res = match self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key), ("language", &self.language)])
            .query(params)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                // The URL carries the API key, keep it out of the logs.
                error!("TMDB request to {} failed: {}", path, e.without_url());
                return empty_object();
            }
        };

        let status = res.status();
        if status != StatusCode::OK {
            warn!("TMDB rejected {} with status {}", path, status);
            return empty_object();
        }

        match res.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                warn!("TMDB response for {} is not valid JSON: {}", path, e.without_url());
                empty_object()
            }
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
