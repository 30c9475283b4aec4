//! Mapping from a request to the directory that holds its cache entries.
//!
//! Layout: `<root>/http/<host>/<METHOD>/<path segments...>/<query>`, where the
//! host and the re-serialized query string are percent-encoded like
//! `encodeURIComponent`. Query parameters are not sorted, so the same
//! parameters in a different order land in a different directory.

use crate::error::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};
use url::Url;

const HTTP_DIR: &str = "http";

const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Composite key of a cached response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub host: String,
    pub method: String,
    pub pathname: String,
    pub query: String,
}

impl CacheKey {
    pub fn new(url: &Url, method: &str) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(url.query_pairs())
            .finish();

        Self {
            host,
            method: method.to_ascii_uppercase(),
            pathname: url.path().to_string(),
            query,
        }
    }

    pub fn parse(url: &str, method: &str) -> Result<Self> {
        Ok(Self::new(&Url::parse(url)?, method))
    }

    /// Directory of this key relative to the cache root.
    pub fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from(HTTP_DIR);
        push_segment(&mut dir, &encode_uri_component(&self.host));
        push_segment(&mut dir, &self.method);
        for segment in self.pathname.split('/') {
            push_segment(&mut dir, segment);
        }
        push_segment(&mut dir, &encode_uri_component(&self.query));
        dir
    }
}

// empty segments collapse like a path join; dot segments never escape the root
fn push_segment(dir: &mut PathBuf, segment: &str) {
    if !segment.is_empty() && segment != "." && segment != ".." {
        dir.push(segment);
    }
}

/// Absolute entry directory for `(url, method)` under `root`.
pub fn cache_key_path(root: &Path, url: &str, method: &str) -> Result<PathBuf> {
    Ok(root.join(CacheKey::parse(url, method)?.relative_dir()))
}

/// Root of every cached HTTP response under a cache directory.
pub fn http_root(root: &Path) -> PathBuf {
    root.join(HTTP_DIR)
}
