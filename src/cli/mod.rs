use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::tui::event::PageId;

#[derive(Parser, Debug)]
#[command(name = "review-queue", about = "Page through pending pull requests in the terminal")]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/review-queue/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the full-screen review application.
    Review(ReviewArgs),
}

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Which squad to filter for, e.g. @acme/squad-aura.
    #[arg(long)]
    pub squad: Option<String>,

    /// Page shown on startup.
    #[arg(long, value_enum, default_value_t = PageId::List)]
    pub page: PageId,

    /// Load pull requests from a JSON file instead of generating samples.
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Number of sample pull requests to generate (overrides the config file).
    #[arg(long)]
    pub count: Option<usize>,

    /// Write logs here instead of the cache directory.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_is_accepted() {
        let cli = Cli::try_parse_from(["review-queue"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn review_defaults_to_list_page() {
        let cli = Cli::try_parse_from(["review-queue", "review"]).unwrap();
        let Some(Commands::Review(args)) = cli.command else {
            panic!("expected review subcommand");
        };
        assert_eq!(args.page, PageId::List);
        assert!(args.squad.is_none());
    }

    #[test]
    fn review_accepts_page_and_squad() {
        let cli = Cli::try_parse_from([
            "review-queue",
            "review",
            "--page",
            "review",
            "--squad",
            "@acme/squad-aura",
        ])
        .unwrap();
        let Some(Commands::Review(args)) = cli.command else {
            panic!("expected review subcommand");
        };
        assert_eq!(args.page, PageId::Review);
        assert_eq!(args.squad.as_deref(), Some("@acme/squad-aura"));
    }

    #[test]
    fn unknown_page_is_rejected() {
        let result = Cli::try_parse_from(["review-queue", "review", "--page", "nonexistent"]);
        assert!(result.is_err());
    }
}
