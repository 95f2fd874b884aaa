pub mod cli;
pub mod config;
pub mod diff;
pub mod highlight;
pub mod markdown;
pub mod source;
pub mod tui;

use serde::{Deserialize, Serialize};

/// A pull request awaiting review.
///
/// Records are immutable once fetched from a source. The review page owns the
/// record it is currently displaying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub title: String,
    /// Markdown body.
    pub description: String,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub status_checks: Vec<String>,
    /// Unified diff text.
    pub diff: String,
}
