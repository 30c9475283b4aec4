use crate::error::Result;
use async_trait::async_trait;

/// Outbound HTTP seam used by the fetch scheduler.
///
/// Implementations only move bytes; timeouts, status handling and caching
/// live in [`crate::fetch::Fetcher`].
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}
