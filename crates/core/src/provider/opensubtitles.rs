//! OpenSubtitles provider: session-based, login/logout, token-cached.
//!
//! Grounded on `original_source`'s `opensubtitlescom.py` for the
//! login/token/status-code taxonomy, and on the teacher's
//! `searcher::jackett::JackettSearcher` for the reqwest-client-with-
//! timeout and error-mapping shape.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::subtitle::Subtitle;
use crate::video::{Video, VideoKind};

use super::traits::{video_kind_set, Provider};
use super::types::{Capabilities, ProviderError, ProviderState};

const SERVER_URL: &str = "https://api.opensubtitles.com/api/v1/";
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct OpenSubtitlesConfig {
    pub api_key: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchResultItem>,
}

#[derive(Deserialize)]
struct SearchResultItem {
    id: String,
    attributes: SearchResultAttributes,
}

#[derive(Deserialize)]
struct SearchResultAttributes {
    language: String,
    #[serde(default)]
    hearing_impaired: bool,
    #[serde(default)]
    foreign_parts_only: bool,
    #[serde(default)]
    moviehash_match: bool,
    url: Option<String>,
    #[serde(default)]
    files: Vec<SearchResultFile>,
}

#[derive(Deserialize)]
struct SearchResultFile {
    file_id: i64,
}

#[derive(Deserialize)]
struct DownloadResponse {
    link: String,
}

pub struct OpenSubtitlesProvider {
    config: OpenSubtitlesConfig,
    client: Option<Client>,
    token: Option<String>,
    token_expires_at: Option<DateTime<Utc>>,
    capabilities: Capabilities,
    state: ProviderState,
}

impl OpenSubtitlesProvider {
    pub fn new(config: OpenSubtitlesConfig) -> Self {
        let languages = ["eng", "fra", "deu", "spa", "ita", "por", "pol", "rus"]
            .into_iter()
            .map(Language::new)
            .collect();

        Self {
            config,
            client: None,
            token: None,
            token_expires_at: None,
            capabilities: Capabilities {
                languages,
                video_kinds: video_kind_set(&[VideoKind::Movie, VideoKind::Episode]),
                required_hash: None,
            },
            state: ProviderState::New,
        }
    }

    fn client(&self) -> Result<&Client, ProviderError> {
        self.client.as_ref().ok_or(ProviderError::NotInitialized)
    }

    fn token_is_fresh(&self) -> bool {
        matches!(
            (&self.token, &self.token_expires_at),
            (Some(_), Some(expires)) if Utc::now() < *expires
        )
    }

    async fn login(&mut self) -> Result<(), ProviderError> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password) else {
            // Anonymous mode: reduced capability, no token needed.
            return Ok(());
        };

        if self.token_is_fresh() {
            return Ok(());
        }

        let client = self.client()?;
        let response = client
            .post(format!("{SERVER_URL}login"))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let response = check_status(response).await?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(e.to_string()))?;

        self.token = Some(body.token);
        self.token_expires_at = Some(Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS));
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        StatusCode::UNAUTHORIZED => Err(ProviderError::Authentication("invalid credentials".to_string())),
        StatusCode::NOT_ACCEPTABLE => Err(ProviderError::Authentication("session expired".to_string())),
        StatusCode::INSUFFICIENT_STORAGE => Err(ProviderError::DownloadLimitExceeded),
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::TooManyRequests),
        StatusCode::SERVICE_UNAVAILABLE => Err(ProviderError::ServiceUnavailable("503".to_string())),
        other => Err(ProviderError::Other(format!("unexpected status {other}"))),
    }
}

fn is_rate_limited_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/html"))
        .unwrap_or(false)
}

/// Builds the `/subtitles` query params for `video`/`languages`, plus the
/// set of ID attributes the query asserts a match on (an id used as a
/// search criterion is a match for every result the query returns).
fn build_search_query(video: &Video, lang_codes: &[String]) -> (Vec<(&'static str, String)>, HashSet<String>) {
    let query_title = match video {
        Video::Movie(m) => m.title.clone(),
        Video::Episode(e) => e.series.clone(),
    };

    let mut query: Vec<(&str, String)> = vec![("query", query_title), ("languages", lang_codes.join(","))];
    if let Some(moviehash) = video.header().hashes.get("opensubtitles") {
        query.push(("moviehash", moviehash.clone()));
    }

    let mut id_match_attrs: HashSet<String> = HashSet::new();
    if let Some(imdb_id) = &video.header().imdb_id {
        query.push(("imdb_id", imdb_id.clone()));
        id_match_attrs.insert("imdb_id".to_string());
    }
    if let Some(tmdb_id) = video.header().tmdb_id {
        query.push(("tmdb_id", tmdb_id.to_string()));
        id_match_attrs.insert("tmdb_id".to_string());
    }
    if let Video::Episode(e) = video {
        query.push(("season_number", e.season.to_string()));
        query.push(("episode_number", e.episode.to_string()));
        if let Some(series_imdb_id) = &e.series_imdb_id {
            query.push(("parent_imdb_id", series_imdb_id.clone()));
            id_match_attrs.insert("series_imdb_id".to_string());
        }
        if let Some(series_tmdb_id) = e.series_tmdb_id {
            query.push(("parent_tmdb_id", series_tmdb_id.to_string()));
            id_match_attrs.insert("series_tmdb_id".to_string());
        }
    }

    (query, id_match_attrs)
}

#[async_trait]
impl Provider for OpenSubtitlesProvider {
    fn name(&self) -> &str {
        "opensubtitles"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn initialize(&mut self) -> Result<(), ProviderError> {
        let client = Client::builder()
            .timeout(self.config.timeout)
            .user_agent("subcore/0.1")
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    "Api-Key",
                    reqwest::header::HeaderValue::from_str(&self.config.api_key)
                        .map_err(|e| ProviderError::Configuration(e.to_string()))?,
                );
                headers
            })
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;
        self.client = Some(client);
        self.login().await?;
        self.state = ProviderState::Ready;
        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), ProviderError> {
        self.token = None;
        self.token_expires_at = None;
        self.client = None;
        self.state = ProviderState::Closed;
        Ok(())
    }

    async fn list_subtitles(
        &mut self,
        video: &Video,
        languages: &HashSet<Language>,
    ) -> Result<Vec<Subtitle>, ProviderError> {
        if self.state != ProviderState::Ready {
            return Err(ProviderError::NotInitialized);
        }

        let lang_codes: Vec<String> = languages.iter().map(Language::to_ietf).collect();
        let (query, id_match_attrs) = build_search_query(video, &lang_codes);

        let client = self.client()?;
        let response = client
            .get(format!("{SERVER_URL}subtitles"))
            .header(
                "Authorization",
                self.token.as_deref().map(|t| format!("Bearer {t}")).unwrap_or_default(),
            )
            .query(&query)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if is_rate_limited_html(&response) {
            return Err(ProviderError::DownloadLimitExceeded);
        }
        let response = check_status(response).await?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(e.to_string()))?;

        let mut subtitles = Vec::new();
        for item in body.data {
            let Ok(language) = Language::from_ietf(&item.attributes.language) else {
                continue;
            };
            let mut subtitle = Subtitle::new("opensubtitles", item.id, language);
            subtitle.hearing_impaired = item.attributes.hearing_impaired;
            subtitle.foreign_only = item.attributes.foreign_parts_only;
            subtitle.provider_hash_match = item.attributes.moviehash_match;
            subtitle.provider_id_matches = id_match_attrs.clone();
            subtitle.page_link = item.attributes.url;
            if let Some(file) = item.attributes.files.first() {
                subtitle.download_link = Some(file.file_id.to_string());
            }
            subtitles.push(subtitle);
        }

        Ok(subtitles)
    }

    async fn download_subtitle(&mut self, subtitle: &mut Subtitle) -> Result<(), ProviderError> {
        if self.state != ProviderState::Ready {
            return Err(ProviderError::NotInitialized);
        }
        let file_id = subtitle
            .download_link
            .as_ref()
            .ok_or_else(|| ProviderError::Other("subtitle has no file id".to_string()))?
            .clone();

        let client = self.client()?;
        let response = client
            .post(format!("{SERVER_URL}download"))
            .header(
                "Authorization",
                self.token.as_deref().map(|t| format!("Bearer {t}")).unwrap_or_default(),
            )
            .json(&serde_json::json!({ "file_id": file_id }))
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        let response = check_status(response).await?;
        let body: DownloadResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(e.to_string()))?;

        let content = client
            .get(body.link)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?
            .bytes()
            .await
            .map_err(ProviderError::from_reqwest)?;

        subtitle.set_content(content.to_vec());
        Ok(())
    }
}
