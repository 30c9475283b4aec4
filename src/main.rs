use anyhow::Context;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use track_awesome::calendar::{self, WeekNumber};
use track_awesome::config::Config;
use track_awesome::constants::DEFAULT_CONFIG_PATH;
use track_awesome::fetch::{FetchOptions, Fetcher};
use track_awesome::limiter::run_limited;
use track_awesome::{logging, metrics};

#[derive(Parser)]
#[command(name = "track_awesome")]
#[command(about = "Tracks awesome list changes and groups them by day and week")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration; defaults apply when it is missing
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for rotated JSON logs
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    /// Print Prometheus metrics before exiting
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a URL through the response cache and print the body
    Fetch {
        url: String,
        #[arg(long, default_value = "GET")]
        method: String,
        /// Skip the cache and always hit the network
        #[arg(long)]
        no_cache: bool,
    },
    /// Print the star count badge text of owner/repo
    Stars { repo: String },
    /// Print the day number of a date (YYYY-MM-DD or RFC 3339)
    Day { date: String },
    /// Print the ISO week number of a date (YYYY-MM-DD or RFC 3339)
    Week { date: String },
    /// Describe a YYYYWW week number
    WeekInfo { week: u32 },
    /// Remove every expired cache entry
    CachePrune,
    /// List configured sources with their star counts
    Sources,
}

fn parse_date(input: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Ok(date.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("'{}' is neither YYYY-MM-DD nor RFC 3339", input))?;
    Ok(Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)))
}

fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    let config = Config::load_or_default(path)?;
    Ok(config.with_prod_flag(std::env::var("PROD").ok().as_deref()))
}

async fn list_sources(config: &Config, fetcher: &Fetcher) -> anyhow::Result<()> {
    let sources = config.sources()?;
    let mut jobs = Vec::with_capacity(sources.len());
    for source in &sources {
        let repo = source.owner_repo().map(|(o, r)| (o.to_string(), r.to_string()));
        let fetcher = fetcher.clone();
        jobs.push(move || async move {
            match repo {
                Some((owner, repo)) => fetcher.fetch_badge_count(&owner, &repo).await,
                None => Ok(String::new()),
            }
        });
    }

    let stars = run_limited(jobs, config.concurrency_limit).await?;
    for (source, stars) in sources.iter().zip(stars) {
        let index = source.index_file().map(|f| f.pathname.as_str()).unwrap_or("");
        println!("{}\t{}\t{}\t{}", source.identifier, source.category, index, stars);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log_dir);
    if cli.metrics {
        metrics::init_metrics();
    }

    let config = load_config(&cli.config)?;
    info!(mode = ?config.mode, cache_dir = %config.cache_dir.display(), "configuration loaded");

    match cli.command {
        Commands::Fetch { url, method, no_cache } => {
            let fetcher = Fetcher::from_config(&config)?;
            let options = FetchOptions::default().method(method);
            let body = if no_cache {
                fetcher.fetch(&url, &options).await?
            } else {
                fetcher.fetch_with_cache(&url, &options).await?
            };
            println!("{}", body);
        }
        Commands::Stars { repo } => {
            let (owner, name) = repo
                .split_once('/')
                .with_context(|| format!("'{}' must be written as owner/repo", repo))?;
            let fetcher = Fetcher::from_config(&config)?;
            println!("{}", fetcher.fetch_badge_count(owner, name).await?);
        }
        Commands::Day { date } => {
            let day = calendar::day_number(&parse_date(&date)?);
            let info = calendar::parse_day_number(day)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Week { date } => {
            let week = calendar::week_number(&parse_date(&date)?);
            let info = calendar::parse_week_number(week)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::WeekInfo { week } => {
            let info = calendar::parse_week_number(WeekNumber(week))?;
            println!("{}\t{}", info.name, info.date);
        }
        Commands::CachePrune => {
            let fetcher = Fetcher::from_config(&config)?;
            let removed = fetcher.cache().prune_expired().await?;
            println!("removed {} expired cache entries", removed);
        }
        Commands::Sources => {
            let fetcher = Fetcher::from_config(&config)?;
            list_sources(&config, &fetcher).await?;
        }
    }

    if let Some(rendered) = metrics::render() {
        println!("{}", rendered);
    }
    Ok(())
}
