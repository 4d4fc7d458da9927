//! Clash of Clans API client.
//!
//! Loads a clan's current league group and every scheduled war in it.
//! Responses are cached in memory per URL so dashboard refreshes inside the
//! TTL never hit the upstream API.

pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{CwlSnapshot, LeagueGroup, Tag, TagError, War};
use cache::TtlCache;

pub const DEFAULT_BASE_URL: &str = "https://api.clashofclans.com/v1";

/// Errors that can occur while talking to the upstream API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid API token")]
    InvalidToken,

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(#[from] TagError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,

    /// Bearer token; proxies in front of the API may not need one
    pub token: Option<String>,

    pub timeout: Duration,

    /// How long a response is served from memory
    pub cache_ttl: Duration,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(120),
            user_agent: format!("trinity-cwl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Anything that can produce a snapshot of a clan's current CWL season.
#[async_trait]
pub trait CwlSource: Send + Sync {
    async fn snapshot(&self, clan: &Tag) -> Result<CwlSnapshot, FetchError>;
}

/// A fixed snapshot, served for whichever clan it contains.
///
/// Backs `serve --snapshot` and router tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    snapshot: CwlSnapshot,
}

impl StaticSource {
    pub fn new(snapshot: CwlSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl CwlSource for StaticSource {
    async fn snapshot(&self, clan: &Tag) -> Result<CwlSnapshot, FetchError> {
        let known = self.snapshot.group.clan(clan).is_some()
            || self.snapshot.wars.iter().any(|w| w.involves(clan));
        if known {
            Ok(self.snapshot.clone())
        } else {
            Err(FetchError::NotFound(format!("clan {}", clan)))
        }
    }
}

/// HTTP client for the CWL endpoints, with a shared response cache.
#[derive(Clone)]
pub struct CwlClient {
    client: Client,
    base_url: String,
    cache: Arc<TtlCache<serde_json::Value>>,
}

impl CwlClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("trinity-cwl")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.token.as_deref().filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| FetchError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            cache: Arc::new(TtlCache::with_system_clock(config.cache_ttl)),
        })
    }

    fn league_group_url(&self, clan: &Tag) -> String {
        format!("{}/clans/{}/currentwar/leaguegroup", self.base_url, clan.url_encoded())
    }

    fn war_url(&self, war_tag: &Tag) -> String {
        format!("{}/clanwarleagues/wars/{}", self.base_url, war_tag.url_encoded())
    }

    /// The clan's current league group.
    pub async fn league_group(&self, clan: &Tag) -> Result<LeagueGroup, FetchError> {
        self.get_json(&self.league_group_url(clan)).await
    }

    /// A single CWL war. The war tag is filled in when the payload omits it.
    pub async fn war(&self, war_tag: &Tag) -> Result<War, FetchError> {
        let mut war: War = self.get_json(&self.war_url(war_tag)).await?;
        if war.normalized_war_tag().is_none() {
            war.war_tag = Some(war_tag.to_string());
        }
        Ok(war)
    }

    /// Load the league group and every scheduled war concurrently.
    ///
    /// A war that fails to load is logged and left out; only a failure to
    /// load the group itself is an error.
    pub async fn fetch_snapshot(&self, clan: &Tag) -> Result<CwlSnapshot, FetchError> {
        let group = self.league_group(clan).await?;
        let war_tags = group.all_war_tags();
        info!("Fetching {} wars for {}", war_tags.len(), clan);

        let mut tasks = JoinSet::new();
        for (idx, war_tag) in war_tags.into_iter().enumerate() {
            let client = self.clone();
            tasks.spawn(async move {
                let result = client.war(&war_tag).await;
                (idx, war_tag, result)
            });
        }

        let mut loaded = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, _, Ok(war))) => loaded.push((idx, war)),
                Ok((_, war_tag, Err(e))) => warn!("Skipping war {}: {}", war_tag, e),
                Err(e) => warn!("War fetch task failed: {}", e),
            }
        }
        loaded.sort_by_key(|(idx, _)| *idx);

        Ok(CwlSnapshot {
            group,
            wars: loaded.into_iter().map(|(_, war)| war).collect(),
            fetched_at: Some(Utc::now()),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let value = match self.cache.get(url) {
            Some(value) => {
                debug!("Serving {} from cache", url);
                value
            }
            None => {
                let value = self.get_uncached(url).await?;
                self.cache.insert(url, value.clone());
                value
            }
        };
        // Undecodable payloads are dropped from the cache
        serde_json::from_value(value).map_err(|e| {
            self.cache.invalidate(url);
            FetchError::from(e)
        })
    }

    async fn get_uncached(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        info!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CwlSource for CwlClient {
    async fn snapshot(&self, clan: &Tag) -> Result<CwlSnapshot, FetchError> {
        self.fetch_snapshot(clan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Clan;

    fn client(base_url: &str) -> CwlClient {
        CwlClient::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let client = client("https://proxy.example.com/v1/");
        assert_eq!(
            client.league_group_url(&Tag::from("#2PP")),
            "https://proxy.example.com/v1/clans/%232PP/currentwar/leaguegroup"
        );
        assert_eq!(
            client.war_url(&Tag::from("8QRUV")),
            "https://proxy.example.com/v1/clanwarleagues/wars/%238QRUV"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = CwlClient::new(ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = CwlClient::new(ClientConfig {
            token: Some("bad\ntoken".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(FetchError::InvalidToken)));
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_ttl, Duration::from_secs(120));
        assert!(config.user_agent.starts_with("trinity-cwl/"));
    }

    #[tokio::test]
    async fn test_cached_response_skips_network() {
        // Unroutable host: any real request would fail.
        let client = client("http://127.0.0.1:9");
        let url = client.league_group_url(&Tag::from("2PP"));
        client.cache.insert(
            url,
            serde_json::json!({
                "state": "inWar",
                "season": "2024-01",
                "clans": [{"tag": "#2PP", "name": "Trinity"}],
                "rounds": [{"warTags": ["#8QRUV", "#0"]}]
            }),
        );

        let group = client.league_group(&Tag::from("#2pp")).await.unwrap();
        assert_eq!(group.season.as_deref(), Some("2024-01"));
        assert_eq!(group.all_war_tags(), vec![Tag::from("8QRUV")]);
    }

    #[tokio::test]
    async fn test_undecodable_response_is_evicted() {
        let client = client("http://127.0.0.1:9");
        let url = client.war_url(&Tag::from("8QRUV"));
        client.cache.insert(url.clone(), serde_json::json!({"clan": "not a clan"}));

        let result = client.war(&Tag::from("8QRUV")).await;
        assert!(matches!(result, Err(FetchError::Json(_))));
        assert!(client.cache.get(&url).is_none());
    }

    #[tokio::test]
    async fn test_snapshot_skips_failed_wars() {
        let client = client("http://127.0.0.1:9");
        client.cache.insert(
            client.league_group_url(&Tag::from("2PP")),
            serde_json::json!({
                "clans": [{"tag": "#2PP", "name": "Trinity"}],
                "rounds": [{"warTags": ["#8QRUV"]}, {"warTags": ["#9YYY"]}]
            }),
        );
        client.cache.insert(
            client.war_url(&Tag::from("8QRUV")),
            serde_json::json!({
                "state": "warEnded",
                "clan": {"tag": "#2PP", "name": "Trinity", "stars": 20},
                "opponent": {"tag": "#9QQ", "name": "Rivals", "stars": 18}
            }),
        );

        let snapshot = client.fetch_snapshot(&Tag::from("2PP")).await.unwrap();
        assert_eq!(snapshot.wars.len(), 1);
        assert_eq!(snapshot.wars[0].war_tag.as_deref(), Some("#8QRUV"));
        assert!(snapshot.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_static_source() {
        let snapshot = CwlSnapshot {
            group: LeagueGroup {
                clans: vec![Clan {
                    tag: Tag::from("2PP"),
                    name: "Trinity".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };
        let source = StaticSource::new(snapshot.clone());

        assert_eq!(source.snapshot(&Tag::from("#2PP")).await.unwrap(), snapshot);
        assert!(matches!(
            source.snapshot(&Tag::from("9QQ")).await,
            Err(FetchError::NotFound(_))
        ));
    }
}
