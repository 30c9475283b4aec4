//! Content paths, feed URLs and slugs for rendered lists.

use crate::constants::{CONTENT_DIR, INDEX_MARKDOWN_PATH};
use crate::error::{Result, TrackerError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use url::Url;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<[!/a-z].*?>").expect("valid html tag regex"));
static UNWANTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"[\x{2000}-\x{206F}\x{2E00}-\x{2E7F}\\'!"#$%&()*+,./:;<=>?@\[\]^`{|}~]"##)
        .expect("valid punctuation regex")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("valid whitespace regex"));

/// Joins URL-style path parts, collapsing empty and `.` segments and resolving `..`.
pub fn posix_join(parts: &[&str]) -> String {
    let absolute = parts.first().is_some_and(|p| p.starts_with('/'));
    let mut segments: Vec<&str> = Vec::new();
    for part in parts {
        for segment in part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
    }
    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// `/owner/repo/` -> `/content/owner/repo/README.md`
pub fn pathname_to_file_path(pathname: &str) -> String {
    if pathname.ends_with('/') {
        posix_join(&["/", CONTENT_DIR, pathname, INDEX_MARKDOWN_PATH])
    } else {
        posix_join(&["/", CONTENT_DIR, pathname])
    }
}

pub fn pathname_to_week_file_path(pathname: &str) -> String {
    posix_join(&["/", CONTENT_DIR, pathname, "week", INDEX_MARKDOWN_PATH])
}

pub fn pathname_to_overview_file_path(pathname: &str) -> String {
    posix_join(&["/", CONTENT_DIR, pathname, "readme", INDEX_MARKDOWN_PATH])
}

pub fn url_to_file_path(url: &str) -> Result<String> {
    Ok(pathname_to_file_path(Url::parse(url)?.path()))
}

/// Daily feeds live next to the list, weekly feeds under `week/`.
pub fn pathname_to_feed_url(domain: &str, pathname: &str, is_day: bool) -> String {
    let week = if is_day { "" } else { "week" };
    format!(
        "{}{}",
        domain.trim_end_matches('/'),
        posix_join(&["/", pathname, week, "feed.xml"])
    )
}

pub fn repo_html_url(url: &str, default_branch: &str, file: &str) -> String {
    format!("{}/blob/{}/{}", url.trim_end_matches('/'), default_branch, file)
}

/// `<items root>/<owner>/<repo>/<file>.json`
pub fn items_file_path(items_root: &Path, identifier: &str, file: &str) -> PathBuf {
    items_root.join(identifier).join(format!("{}.json", file))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItemsFilePath {
    pub source_identifier: String,
    pub original_filepath: String,
}

/// Inverse of [`items_file_path`].
pub fn parse_items_file_path(items_root: &Path, filepath: &Path) -> Result<ParsedItemsFilePath> {
    let relative = filepath.strip_prefix(items_root).map_err(|_| {
        TrackerError::Config(format!(
            "{} is not under {}",
            filepath.display(),
            items_root.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.len() < 3 {
        return Err(TrackerError::Config(format!(
            "{} does not name an items file",
            filepath.display()
        )));
    }

    let file = parts[2..].join("/");
    let original_filepath = file.strip_suffix(".json").unwrap_or(&file).to_string();
    Ok(ParsedItemsFilePath {
        source_identifier: format!("{}/{}", parts[0], parts[1]),
        original_filepath,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub file_type: String,
    pub name: String,
    pub ext: String,
}

/// `list_awesome_things.json` -> type `list`, name `awesome_things`, ext `.json`
pub fn parse_filename(filename: &str) -> ParsedFilename {
    let base = Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = match base.rfind('.') {
        Some(dot) if dot > 0 => (&base[..dot], &base[dot..]),
        _ => (base.as_str(), ""),
    };
    let (file_type, name) = stem.split_once('_').unwrap_or((stem, ""));
    ParsedFilename {
        file_type: file_type.to_string(),
        name: name.to_string(),
        ext: ext.to_string(),
    }
}

/// Heading slug compatible with marked's slugger.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let without_tags = HTML_TAG.replace_all(lowered.trim(), "");
    let without_punctuation = UNWANTED.replace_all(&without_tags, "");
    WHITESPACE.replace_all(&without_punctuation, "-").into_owned()
}
