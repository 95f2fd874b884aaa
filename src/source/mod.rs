use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::PullRequest;

const SAMPLE_DESCRIPTION: &str = include_str!("../../assets/sample_description.md");
const SAMPLE_DIFF: &str = include_str!("../../assets/sample.diff");

/// Errors that can occur while building a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid pull request fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Sequential supplier of pull requests awaiting review.
///
/// `next` is destructive: it removes the head of the queue. `None` means the
/// queue is exhausted, which is an expected condition rather than an error.
pub trait PullRequestSource {
    fn next(&mut self) -> Option<PullRequest>;

    /// Number of records still pending.
    fn remaining(&self) -> usize;

    /// Titles of the pending records, head first.
    fn pending_titles(&self) -> Vec<String>;
}

/// In-memory FIFO of pull requests.
#[derive(Debug, Clone, Default)]
pub struct PullRequestQueue {
    prs: VecDeque<PullRequest>,
}

impl PullRequestQueue {
    pub fn new(prs: impl IntoIterator<Item = PullRequest>) -> Self {
        Self {
            prs: prs.into_iter().collect(),
        }
    }

    /// Generate `count` placeholder pull requests sharing an embedded
    /// description and diff.
    pub fn sample(count: usize) -> Self {
        Self::new((1..=count).map(sample_pr))
    }

    /// Load pull requests from a JSON array.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let prs: Vec<PullRequest> =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(count = prs.len(), path = %path.display(), "loaded pull request fixture");
        Ok(Self::new(prs))
    }
}

impl PullRequestSource for PullRequestQueue {
    fn next(&mut self) -> Option<PullRequest> {
        let pr = self.prs.pop_front();
        match &pr {
            Some(pr) => tracing::debug!(title = %pr.title, remaining = self.prs.len(), "fetched pull request"),
            None => tracing::debug!("pull request queue exhausted"),
        }
        pr
    }

    fn remaining(&self) -> usize {
        self.prs.len()
    }

    fn pending_titles(&self) -> Vec<String> {
        self.prs.iter().map(|pr| pr.title.clone()).collect()
    }
}

fn sample_pr(n: usize) -> PullRequest {
    PullRequest {
        title: format!("Retry failed webhook deliveries (#{})", n),
        description: SAMPLE_DESCRIPTION.to_string(),
        comments: vec![
            format!("@reviewer-{}: the ceiling should probably come from config.", n),
            format!("@author-{}: agreed, moved it into RetryPolicy.", n),
        ],
        status_checks: vec![
            "✓ ci / build".to_string(),
            "✓ ci / test".to_string(),
            format!("○ deploy / preview-{}", n),
        ],
        diff: SAMPLE_DIFF.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(title: &str) -> PullRequest {
        PullRequest {
            title: title.to_string(),
            description: String::new(),
            comments: vec![],
            status_checks: vec![],
            diff: String::new(),
        }
    }

    #[test]
    fn next_pops_in_order_then_exhausts() {
        let mut queue = PullRequestQueue::new([pr("one"), pr("two")]);
        assert_eq!(queue.remaining(), 2);
        assert_eq!(queue.next().unwrap().title, "one");
        assert_eq!(queue.next().unwrap().title, "two");
        assert!(queue.next().is_none());
        assert!(queue.next().is_none());
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn pending_titles_does_not_consume() {
        let queue = PullRequestQueue::new([pr("a"), pr("b")]);
        assert_eq!(queue.pending_titles(), vec!["a", "b"]);
        assert_eq!(queue.remaining(), 2);
    }

    #[test]
    fn sample_generates_distinct_titles() {
        let queue = PullRequestQueue::sample(3);
        let titles = queue.pending_titles();
        assert_eq!(titles.len(), 3);
        assert_ne!(titles[0], titles[1]);
        assert!(titles[2].contains("#3"));
    }

    #[test]
    fn sample_diff_parses() {
        let files = crate::diff::parse_diff(SAMPLE_DIFF).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn from_json_file_defaults_optional_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prs.json");
        std::fs::write(
            &path,
            r#"[
                {"title": "first", "description": "body", "diff": ""},
                {"title": "second", "description": "", "comments": ["c"], "status_checks": ["s"], "diff": ""}
            ]"#,
        )
        .unwrap();

        let mut queue = PullRequestQueue::from_json_file(&path).unwrap();
        let first = queue.next().unwrap();
        assert_eq!(first.title, "first");
        assert!(first.comments.is_empty());
        let second = queue.next().unwrap();
        assert_eq!(second.comments, vec!["c"]);
        assert_eq!(second.status_checks, vec!["s"]);
    }

    #[test]
    fn from_json_file_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prs.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = PullRequestQueue::from_json_file(&path).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
