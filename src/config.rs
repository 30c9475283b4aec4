use crate::constants::{
    CONTENT_DIR, DEFAULT_BADGE_ENDPOINT, DEFAULT_CACHE_DIR, DEFAULT_CATEGORY, DEFAULT_CONCURRENCY_LIMIT,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_FILE_MIN_UPDATED_HOURS, DEFAULT_FILE_TYPE, DEV_CACHE_TTL_SECS, DEV_DOMAIN,
    INDEX_MARKDOWN_PATH, PROD_CACHE_TTL_SECS, PROD_DOMAIN,
};
use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    /// Interprets the `PROD` flag: only `1` selects production.
    pub fn from_prod_flag(value: Option<&str>) -> Self {
        match value {
            Some("1") => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    pub fn is_dev(self) -> bool {
        self == RunMode::Development
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: RunMode,
    pub cache_dir: PathBuf,
    /// Overrides the mode-dependent cache TTL.
    pub cache_ttl_secs: Option<u64>,
    pub fetch_timeout_secs: u64,
    pub concurrency_limit: usize,
    pub badge_endpoint: String,
    pub file_min_updated_hours: u64,
    pub sources: BTreeMap<String, RawSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_ttl_secs: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            badge_endpoint: DEFAULT_BADGE_ENDPOINT.to_string(),
            file_min_updated_hours: DEFAULT_FILE_MIN_UPDATED_HOURS,
            sources: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            TrackerError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolves the mode from the `PROD` flag, replacing whatever the file said.
    pub fn with_prod_flag(self, flag: Option<&str>) -> Self {
        self.with_mode(RunMode::from_prod_flag(flag))
    }

    fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(TrackerError::Config("concurrency_limit must be at least 1".to_string()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(TrackerError::Config("fetch_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        let secs = self.cache_ttl_secs.unwrap_or(match self.mode {
            RunMode::Production => PROD_CACHE_TTL_SECS,
            RunMode::Development => DEV_CACHE_TTL_SECS,
        });
        Duration::from_secs(secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn layout(&self) -> Layout {
        Layout::for_mode(self.mode)
    }

    /// Normalized sources, in identifier order.
    pub fn sources(&self) -> Result<Vec<Source>> {
        self.sources
            .iter()
            .map(|(key, raw)| Source::from_raw(key, raw))
            .collect()
    }

    pub fn categories(&self) -> Result<Vec<String>> {
        let mut categories: Vec<String> = Vec::new();
        for source in self.sources()? {
            if !categories.contains(&source.category) {
                categories.push(source.category);
            }
        }
        Ok(categories)
    }
}

/// Mode-dependent output directories and site domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub dist: PathBuf,
    pub db: PathBuf,
    pub public: PathBuf,
    pub current: PathBuf,
    pub static_dir: PathBuf,
    pub domain: String,
}

impl Layout {
    pub fn for_mode(mode: RunMode) -> Self {
        let dev = mode.is_dev();
        Self {
            dist: PathBuf::from(if dev { "dist" } else { "prod-dist" }),
            db: PathBuf::from(if dev { "db" } else { "prod-db" }),
            public: PathBuf::from(if dev { "public" } else { "prod-public" }),
            current: PathBuf::from(if dev { "dev-current" } else { "current" }),
            static_dir: PathBuf::from("static"),
            domain: if dev { DEV_DOMAIN } else { PROD_DOMAIN }.to_string(),
        }
    }

    pub fn dist_content(&self) -> PathBuf {
        self.dist.join(CONTENT_DIR)
    }

    pub fn data_raw(&self) -> PathBuf {
        self.current.join("1-raw")
    }

    pub fn data_items(&self) -> PathBuf {
        self.db.join("items")
    }

    pub fn db_meta_file(&self) -> PathBuf {
        self.db.join("meta.json")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    pub url: Option<String>,
    pub category: Option<String>,
    pub default_branch: Option<String>,
    pub files: Option<BTreeMap<String, RawSourceFile>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourceFile {
    pub name: Option<String>,
    pub index: Option<bool>,
    pub options: Option<FileOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOptions {
    #[serde(rename = "type", default = "default_file_type")]
    pub file_type: String,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            file_type: default_file_type(),
        }
    }
}

fn default_file_type() -> String {
    DEFAULT_FILE_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileConfig {
    pub filepath: String,
    pub pathname: String,
    pub name: String,
    pub index: bool,
    pub options: FileOptions,
}

/// A tracked repository after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    /// `owner/repo`
    pub identifier: String,
    pub url: String,
    pub category: String,
    pub default_branch: Option<String>,
    pub files: BTreeMap<String, FileConfig>,
}

impl Source {
    pub fn from_raw(key: &str, raw: &RawSource) -> Result<Self> {
        let repo_name = match key.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => repo,
            _ => {
                return Err(TrackerError::Config(format!(
                    "source '{}' must be written as owner/repo",
                    key
                )))
            }
        };
        let default_name = title_case(repo_name);

        let files = match raw.files.as_ref().filter(|files| !files.is_empty()) {
            Some(raw_files) => {
                let single = raw_files.len() == 1;
                let mut files = BTreeMap::new();
                for (file_key, raw_file) in raw_files {
                    let index = single || raw_file.index.unwrap_or(false);
                    let name = match &raw_file.name {
                        Some(name) => name.clone(),
                        None if index => default_name.clone(),
                        None => format!("{} ({})", default_name, file_key),
                    };
                    let pathname = if index {
                        format!("/{}/", key)
                    } else {
                        format!("/{}/{}/", key, remove_extname(file_key))
                    };
                    files.insert(
                        file_key.clone(),
                        FileConfig {
                            filepath: file_key.clone(),
                            pathname,
                            name,
                            index,
                            options: raw_file.options.clone().unwrap_or_default(),
                        },
                    );
                }
                if !files.values().any(|file| file.index) {
                    return Err(TrackerError::Config(format!("source {} has no index file", key)));
                }
                files
            }
            None => BTreeMap::from([(
                INDEX_MARKDOWN_PATH.to_string(),
                FileConfig {
                    filepath: INDEX_MARKDOWN_PATH.to_string(),
                    pathname: format!("/{}/", key),
                    name: default_name,
                    index: true,
                    options: FileOptions::default(),
                },
            )]),
        };

        Ok(Self {
            identifier: key.to_string(),
            url: raw
                .url
                .clone()
                .unwrap_or_else(|| format!("https://github.com/{}", key)),
            category: raw.category.clone().unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            default_branch: raw.default_branch.clone(),
            files,
        })
    }

    /// The index file, or the first configured file if none is marked.
    pub fn index_file(&self) -> Option<&FileConfig> {
        self.files
            .values()
            .find(|file| file.index)
            .or_else(|| self.files.values().next())
    }

    /// `(owner, repo)` halves of the identifier.
    pub fn owner_repo(&self) -> Option<(&str, &str)> {
        self.identifier.split_once('/')
    }
}

/// `awesome-rust` -> `Awesome Rust`
pub fn title_case(value: &str) -> String {
    value
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops the final extension, if any: `docs/list.md` -> `docs/list`.
pub fn remove_extname(filename: &str) -> &str {
    let base_start = filename.rfind('/').map(|i| i + 1).unwrap_or(0);
    match filename[base_start..].rfind('.') {
        Some(dot) if dot > 0 => &filename[..base_start + dot],
        _ => filename,
    }
}
