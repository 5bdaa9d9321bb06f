use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use rss_finder::app::App;
use rss_finder::client::ApiClient;
use rss_finder::clipboard::SystemClipboard;
use rss_finder::config::Config;
use rss_finder::controller::{AppEvent, SearchController};
use rss_finder::feed::{FeedFinder, HttpFeedFinder};
use rss_finder::keybindings::KeybindingRegistry;
use rss_finder::server::{self, models::FindFeedsResponse, AppState};
use rss_finder::ui;
use rss_finder::util::normalize;

const LOG_FILE: &str = "rss-finder.log";

/// Get the config directory path (~/.config/rss-finder/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("rss-finder"))
}

#[derive(Parser, Debug)]
#[command(
    name = "rss-finder",
    version,
    about = "Find the RSS, Atom and JSON feeds of any website"
)]
struct Args {
    /// Config file (default: ~/.config/rss-finder/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the feed discovery API
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
    /// Interactive search against a running server (default)
    Tui {
        /// Server base URL (overrides client.api_url)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
    /// Run discovery once, locally, and print the results
    Find {
        /// Website URL; the scheme may be omitted
        url: String,

        /// Print the same JSON the API returns
        #[arg(long)]
        json: bool,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the terminal, so its logs go to a file instead.
fn init_file_logging(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match &args.command {
        Some(Command::Serve { bind }) => {
            init_stderr_logging();
            let config = load_config(&args)?;
            run_server(&config, *bind).await
        }
        Some(Command::Find { url, json }) => {
            init_stderr_logging();
            let config = load_config(&args)?;
            run_find(&config, url, *json).await
        }
        Some(Command::Tui { api_url }) => {
            init_file_logging(&get_config_dir()?)?;
            let config = load_config(&args)?;
            run_tui(&config, api_url.as_deref()).await
        }
        None => {
            init_file_logging(&get_config_dir()?)?;
            let config = load_config(&args)?;
            run_tui(&config, None).await
        }
    }
}

async fn run_server(config: &Config, bind: Option<SocketAddr>) -> Result<()> {
    let finder = HttpFeedFinder::new(config.server.finder_settings())
        .context("Failed to build HTTP client")?;
    let state = AppState::new(Arc::new(finder), config.server.find_options());
    let addr = bind.unwrap_or(config.server.bind);

    tracing::info!(
        addr = %addr,
        user_agent = %config.server.user_agent,
        "Starting feed discovery server"
    );
    server::serve(addr, state).await
}

async fn run_find(config: &Config, raw_url: &str, json: bool) -> Result<()> {
    let url = normalize(raw_url)?;
    let finder = HttpFeedFinder::new(config.server.finder_settings())
        .context("Failed to build HTTP client")?;

    let feeds = finder
        .find(&url, &config.server.find_options())
        .await
        .with_context(|| format!("Failed to find feeds for {}", url))?;
    let feeds = config.client.dedup_feeds(feeds);

    if json {
        let body = serde_json::to_string_pretty(&FindFeedsResponse { feeds })?;
        println!("{}", body);
    } else if feeds.is_empty() {
        println!("No RSS feeds found for this URL.");
    } else {
        for feed in &feeds {
            let title = if feed.title.trim().is_empty() {
                "Untitled Feed"
            } else {
                feed.title.as_str()
            };
            println!("{}\t{}", title, feed.link);
        }
    }
    Ok(())
}

async fn run_tui(config: &Config, api_url: Option<&str>) -> Result<()> {
    let base_url = api_url.unwrap_or(&config.client.api_url);
    let api = ApiClient::new(base_url, config.client.request_timeout())
        .context("Failed to build API client")?;
    tracing::info!(endpoint = %api.endpoint(), "Starting terminal client");

    let controller = SearchController::new(
        api,
        Arc::new(SystemClipboard),
        config.client.controller_settings(),
    );

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    let mut app = App::new(controller, keybindings, config.theme);
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
