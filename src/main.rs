use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rssfeed::config::Config;
use rssfeed::feed::build_client;
use rssfeed::poll::{self, PollResult};
use rssfeed::storage::{Database, DatabaseError};

/// Get the config directory path (~/.config/rssfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("rssfeed"))
}

#[derive(Parser, Debug)]
#[command(name = "rssfeed", version, about = "Poll RSS/Atom feeds into a local database")]
struct Args {
    /// Log per-feed diagnostics at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/rssfeed/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Subscribe to a feed and poll it once
    Add {
        url: String,
    },
    /// Poll a single feed
    Poll {
        feed_id: i64,
    },
    /// Poll every subscribed feed
    PollAll,
    /// List the most recently published entries
    Recent {
        /// Number of entries (default from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "rssfeed=info" } else { "rssfeed=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = config
        .database_path
        .clone()
        .unwrap_or_else(|| config_dir.join("rssfeed.db"));
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory {}", parent.display())
        })?;
    }
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;

    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::Locked) => {
            eprintln!("Error: The feed database is locked by another process. Try again shortly.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let client = build_client(&config.user_agent).context("Failed to build HTTP client")?;
    let options = config.poll_options(args.verbose);

    match args.command {
        Command::Add { url } => {
            let subscription = poll::subscribe(&db, &client, &url, &options).await?;
            if !subscription.created {
                println!("Already subscribed: feed {} ({})", subscription.feed.id, url);
                return Ok(());
            }
            println!("Subscribed: feed {} ({})", subscription.feed.id, url);
            if let Some(result) = &subscription.initial_poll {
                report(result);
            }
        }
        Command::Poll { feed_id } => {
            let result = poll::poll_feed(&db, &client, feed_id, &options).await;
            report(&result);
        }
        Command::PollAll => {
            let results = poll::poll_all(&db, &client, &options).await;
            for result in &results {
                report(result);
            }
        }
        Command::Recent { count } => {
            let limit = count.unwrap_or(config.recent_entries);
            let entries = db
                .recent_entries(limit)
                .await
                .context("Failed to load recent entries")?;
            for entry in entries {
                let published = Utc
                    .timestamp_opt(entry.published, 0)
                    .single()
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {}\n    {}",
                    published,
                    entry.title.as_deref().unwrap_or("(untitled)"),
                    entry.link
                );
            }
        }
    }

    Ok(())
}

fn report(result: &PollResult) {
    match &result.result {
        Ok(summary) => println!(
            "feed {}: {} new, {} already stored, {} skipped",
            result.feed_id, summary.created, summary.existing, summary.skipped
        ),
        Err(e) => eprintln!("feed {}: {}", result.feed_id, e),
    }
}
