//! Cache-first HTTP fetching with a hard deadline.

use crate::app::ports::{HttpClientPort, HttpRequest};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::constants::BADGE_SUFFIX;
use crate::error::{Result, TrackerError};
use crate::infra::http_client::ReqwestHttp;
use crate::metrics::FetchMetrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Per-request options. The method takes part in the cache key; the body does not.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Lifetime of the cache entry written on a miss; `None` uses the store default.
    pub ttl: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
            ttl: None,
        }
    }
}

impl FetchOptions {
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn HttpClientPort>,
    cache: CacheStore,
    timeout: Duration,
    badge_endpoint: String,
}

impl Fetcher {
    pub fn new(client: Arc<dyn HttpClientPort>, cache: CacheStore, timeout: Duration) -> Self {
        Self {
            client,
            cache,
            timeout,
            badge_endpoint: crate::constants::DEFAULT_BADGE_ENDPOINT.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(ReqwestHttp::new()?);
        Ok(Self::new(client, CacheStore::from_config(config), config.fetch_timeout())
            .with_badge_endpoint(config.badge_endpoint.clone()))
    }

    pub fn with_badge_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.badge_endpoint = endpoint.into();
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs the request, dropping it if the deadline passes first.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String> {
        let request = HttpRequest {
            method: options.method.to_ascii_uppercase(),
            url: url.to_string(),
            headers: options.headers.clone(),
            body: options.body.clone(),
        };

        let started = Instant::now();
        let response = match tokio::time::timeout(self.timeout, self.client.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                FetchMetrics::record_error("transport");
                return Err(e);
            }
            Err(_) => {
                FetchMetrics::record_error("timeout");
                return Err(TrackerError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                });
            }
        };

        if !response.is_success() {
            FetchMetrics::record_error("status");
            return Err(TrackerError::FetchFailed {
                url: url.to_string(),
                status: response.status,
            });
        }

        FetchMetrics::record_success(started.elapsed().as_secs_f64());
        Ok(response.body)
    }

    /// Serves a fresh cache entry if there is one, otherwise fetches and caches.
    pub async fn fetch_with_cache(&self, url: &str, options: &FetchOptions) -> Result<String> {
        match self.cache.read(url, &options.method).await {
            Ok(body) => {
                debug!("use cache file for {}", url);
                return Ok(body);
            }
            Err(e) if e.is_cache_miss() => debug!("not found cache file for {}", url),
            Err(e) => return Err(e),
        }

        let body = self.fetch(url, options).await?;
        self.cache.write(url, &options.method, &body, options.ttl).await?;
        Ok(body)
    }

    /// Star count text from the badge service, or an empty string when the
    /// markup does not have the expected shape.
    pub async fn fetch_badge_count(&self, owner: &str, repo: &str) -> Result<String> {
        let url = format!("{}/{}/{}", self.badge_endpoint.trim_end_matches('/'), owner, repo);
        let markup = self.fetch_with_cache(&url, &FetchOptions::default()).await?;
        match parse_badge_count(&markup) {
            Some(count) => Ok(count.to_string()),
            None => {
                warn!("got github star failed for {}/{}", owner, repo);
                Ok(String::new())
            }
        }
    }
}

/// Text right before the closing `</text></a></g></svg>` of a badge.
pub fn parse_badge_count(markup: &str) -> Option<&str> {
    let text = markup.strip_suffix(BADGE_SUFFIX)?;
    let start = text.rfind('>').map_or(0, |i| i + 1);
    Some(&text[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_badge_count() {
        let markup = r#"<svg><g><a><text x="1">stars</text><text x="2">12k</text></a></g></svg>"#;
        assert_eq!(parse_badge_count(markup), Some("12k"));
    }

    #[test]
    fn test_parse_badge_count_without_suffix() {
        assert_eq!(parse_badge_count("<svg><text>12k</text></svg>"), None);
        assert_eq!(parse_badge_count(""), None);
    }

    #[test]
    fn test_default_options_use_get() {
        let options = FetchOptions::default();
        assert_eq!(options.method, "GET");
        assert!(options.ttl.is_none());
    }
}
