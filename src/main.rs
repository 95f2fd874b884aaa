use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use review_queue::cli::{self, Commands, ReviewArgs};
use review_queue::config::Config;
use review_queue::highlight::Highlighter;
use review_queue::source::{PullRequestQueue, PullRequestSource};
use review_queue::tui::{
    self,
    pages::{ListPage, Page, ReviewPage},
    router::Router,
};

fn main() -> Result<()> {
    let args = cli::parse_args();

    match args.command {
        None => {
            init_logging(None)?;
            println!("Hello, review-queue");
        }
        Some(Commands::Review(review_args)) => {
            handle_review(args.config.as_deref(), review_args)?;
        }
    }

    Ok(())
}

/// Install the global subscriber. With a file, logs go there (the TUI owns
/// stderr); otherwise they go to stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("review-queue")
        .join("review-queue.log")
}

/// Handle the review command: build the pages and run the TUI.
fn handle_review(config_path: Option<&Path>, args: ReviewArgs) -> Result<()> {
    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(Some(&log_path))?;

    let config = Config::load(config_path).context("Failed to load configuration")?;

    if let Some(squad) = &args.squad {
        tracing::info!(squad = %squad, "squad filter accepted but not applied");
    }

    let queue = match &args.fixture {
        Some(path) => PullRequestQueue::from_json_file(path)
            .context("Failed to load pull request fixture")?,
        None => PullRequestQueue::sample(args.count.unwrap_or(config.source.sample_count)),
    };
    tracing::info!(pending = queue.remaining(), "starting review session");

    let highlighter = match Highlighter::with_theme(&config.ui.syntax_theme) {
        Ok(highlighter) => highlighter,
        Err(e) => {
            tracing::warn!("{}, using the default theme", e);
            Highlighter::new()
        }
    };

    let chrome = config.chrome();
    let pages = [
        Page::from(ListPage::new(queue.pending_titles(), chrome)),
        Page::from(ReviewPage::new(Box::new(queue), highlighter, chrome)),
    ];
    let router = Router::new(chrome, pages, args.page).context("Failed to build pages")?;

    tui::run(router)
}
