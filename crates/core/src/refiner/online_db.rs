//! Online-database refiner: looks up a video by title/year against an
//! external catalog and fills in IMDB/TMDB/TVDB identifiers. Grounded on
//! the teacher's `external_catalog::tmdb` HTTP-client-with-api-key
//! pattern; OMDB is the cheapest of IMDB/TMDB/TVDB to ground in a single
//! adapter, so it's the one shipped here. Implementing TMDB/TVDB against
//! this same trait is a mechanical follow-up.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::cache::TtlCache;
use crate::video::Video;

use super::traits::{Refiner, RefinerError, RefinerOptions};

const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";
const LOOKUP_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct OmdbConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Response")]
    response: String,
}

pub struct OmdbRefiner {
    client: Client,
    api_key: String,
    base_url: String,
    /// Keyed by `"{title}:{year}"`; avoids refetching the same show/movie
    /// id across refine calls for the lifetime of this refiner.
    lookup_cache: TtlCache<String, Option<String>>,
}

impl OmdbRefiner {
    pub fn new(config: OmdbConfig) -> Result<Self, RefinerError> {
        if config.api_key.is_empty() {
            return Err(RefinerError::NotConfigured("OMDB API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RefinerError::Http)?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            lookup_cache: TtlCache::new(LOOKUP_CACHE_TTL),
        })
    }

    async fn lookup(&self, title: &str, year: Option<i32>) -> Result<Option<String>, RefinerError> {
        let cache_key = format!("{title}:{}", year.map(|y| y.to_string()).unwrap_or_default());
        if let Some(cached) = self.lookup_cache.get(&cache_key).await {
            return Ok(cached);
        }

        let mut query = vec![("apikey", self.api_key.clone()), ("t", title.to_string())];
        if let Some(year) = year {
            query.push(("y", year.to_string()));
        }

        let response = self.client.get(&self.base_url).query(&query).send().await?;
        let body: OmdbResponse = response.json().await.map_err(|e| RefinerError::Parse(e.to_string()))?;

        let imdb_id = if body.response != "True" { None } else { body.imdb_id };
        self.lookup_cache.set(cache_key, imdb_id.clone()).await;
        Ok(imdb_id)
    }
}

#[async_trait]
impl Refiner for OmdbRefiner {
    fn name(&self) -> &str {
        "omdb"
    }

    async fn refine(&self, video: &mut Video, opts: &RefinerOptions) -> Result<(), RefinerError> {
        match video {
            Video::Movie(movie) => {
                if movie.header.imdb_id.is_some() && !opts.force {
                    return Ok(());
                }
                if let Some(imdb_id) = self.lookup(&movie.title, movie.year).await? {
                    movie.header.imdb_id = Some(imdb_id);
                }
            }
            Video::Episode(episode) => {
                if episode.series_imdb_id.is_some() && !opts.force {
                    return Ok(());
                }
                if let Some(imdb_id) = self.lookup(&episode.series, episode.year).await? {
                    episode.series_imdb_id = Some(imdb_id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = OmdbRefiner::new(OmdbConfig {
            api_key: String::new(),
            base_url: None,
            timeout: Duration::from_secs(10),
        });
        assert!(matches!(err, Err(RefinerError::NotConfigured(_))));
    }

    #[test]
    fn base_url_defaults_when_unset() {
        let refiner = OmdbRefiner::new(OmdbConfig {
            api_key: "key".to_string(),
            base_url: None,
            timeout: Duration::from_secs(10),
        })
        .unwrap();
        assert_eq!(refiner.base_url, DEFAULT_BASE_URL);
    }
}
