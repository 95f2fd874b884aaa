use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised for diff text that does not follow the unified format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("line {line}: malformed hunk header: {header}")]
    MalformedHunkHeader { line: usize, header: String },
    #[error("line {line}: unexpected content inside hunk: {content}")]
    UnexpectedLine { line: usize, content: String },
    #[error("diff ends inside a hunk ({old} old / {new} new lines missing)")]
    Truncated { old: u32, new: u32 },
}

pub type Result<T> = std::result::Result<T, DiffError>;

/// Parsed `@@ -old_start,old_count +new_start,new_count @@ context` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub context: String,
}

/// Role of a single line within a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `diff --git a/.. b/..`
    FileHeader,
    /// `index`, mode, rename and binary notices.
    Meta,
    OldPath,
    NewPath,
    HunkHeader(HunkHeader),
    Added,
    Removed,
    Context,
    /// `\ No newline at end of file`
    NoNewline,
    /// Anything outside a hunk that is not a recognised header.
    Other,
}

/// A classified diff line, tagged with the file it belongs to (if known yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine<'a> {
    pub kind: LineKind,
    pub text: &'a str,
    pub path: Option<PathBuf>,
}

/// A single diff hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub header: HunkHeader,
    pub additions: usize,
    pub deletions: usize,
}

/// A file containing diff hunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFile {
    pub path: PathBuf,
    pub hunks: Vec<DiffHunk>,
}

/// Totals across a whole diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files: usize,
    pub additions: usize,
    pub deletions: usize,
}

const META_PREFIXES: &[&str] = &[
    "index ",
    "new file mode",
    "deleted file mode",
    "old mode",
    "new mode",
    "similarity index",
    "dissimilarity index",
    "rename from",
    "rename to",
    "copy from",
    "copy to",
    "Binary files ",
];

/// Classify every line of a unified diff.
///
/// Hunk bodies are bounded by the counts in their header, so a removed line
/// that happens to start with `--- ` is never mistaken for a file header.
pub fn classify(input: &str) -> Result<Vec<DiffLine<'_>>> {
    let mut out = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut old_path: Option<PathBuf> = None;
    // Lines still expected in the current hunk: (old, new).
    let mut remaining: Option<(u32, u32)> = None;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;

        if let Some((old, new)) = remaining {
            let (kind, old, new) = match line.as_bytes().first() {
                Some(b'+') if new > 0 => (LineKind::Added, old, new - 1),
                Some(b'-') if old > 0 => (LineKind::Removed, old - 1, new),
                Some(b' ') | None if old > 0 && new > 0 => (LineKind::Context, old - 1, new - 1),
                Some(b'\\') => (LineKind::NoNewline, old, new),
                _ => {
                    return Err(DiffError::UnexpectedLine {
                        line: line_no,
                        content: line.to_string(),
                    });
                }
            };
            remaining = if old == 0 && new == 0 {
                None
            } else {
                Some((old, new))
            };
            out.push(DiffLine {
                kind,
                text: line,
                path: path.clone(),
            });
            continue;
        }

        let kind = if let Some(rest) = line.strip_prefix("diff --git ") {
            path = rest
                .rsplit_once(" b/")
                .map(|(_, new)| PathBuf::from(new));
            old_path = None;
            LineKind::FileHeader
        } else if META_PREFIXES.iter().any(|p| line.starts_with(p)) {
            LineKind::Meta
        } else if let Some(rest) = line.strip_prefix("--- ") {
            old_path = strip_path(rest, "a/");
            LineKind::OldPath
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            // Deleted files report /dev/null here, fall back to the old path.
            if let Some(new) = strip_path(rest, "b/").or_else(|| old_path.clone()) {
                path = Some(new);
            }
            LineKind::NewPath
        } else if line.starts_with("@@") {
            let header = parse_hunk_header(line).ok_or_else(|| DiffError::MalformedHunkHeader {
                line: line_no,
                header: line.to_string(),
            })?;
            if header.old_count > 0 || header.new_count > 0 {
                remaining = Some((header.old_count, header.new_count));
            }
            LineKind::HunkHeader(header)
        } else if line.starts_with('\\') {
            LineKind::NoNewline
        } else {
            LineKind::Other
        };

        out.push(DiffLine {
            kind,
            text: line,
            path: path.clone(),
        });
    }

    if let Some((old, new)) = remaining {
        return Err(DiffError::Truncated { old, new });
    }

    Ok(out)
}

fn strip_path(raw: &str, prefix: &str) -> Option<PathBuf> {
    // Some tools append a timestamp after a tab.
    let raw = raw.split('\t').next().unwrap_or(raw).trim_end();
    if raw == "/dev/null" {
        return None;
    }
    Some(PathBuf::from(raw.strip_prefix(prefix).unwrap_or(raw)))
}

/// Parse a unified diff into files and hunks. Files without hunks (binary
/// files, pure renames) are skipped.
pub fn parse_diff(input: &str) -> Result<Vec<DiffFile>> {
    let mut files: Vec<DiffFile> = Vec::new();

    for line in classify(input)? {
        match line.kind {
            LineKind::HunkHeader(header) => {
                let path = line.path.unwrap_or_default();
                let hunk = DiffHunk {
                    header,
                    additions: 0,
                    deletions: 0,
                };
                match files.last_mut() {
                    Some(file) if file.path == path => file.hunks.push(hunk),
                    _ => files.push(DiffFile {
                        path,
                        hunks: vec![hunk],
                    }),
                }
            }
            LineKind::Added => {
                if let Some(hunk) = files.last_mut().and_then(|f| f.hunks.last_mut()) {
                    hunk.additions += 1;
                }
            }
            LineKind::Removed => {
                if let Some(hunk) = files.last_mut().and_then(|f| f.hunks.last_mut()) {
                    hunk.deletions += 1;
                }
            }
            _ => {}
        }
    }

    Ok(files)
}

/// Parse a hunk header: `@@ -old_start[,old_count] +new_start[,new_count] @@ [context]`.
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let header = line.strip_prefix("@@ ")?;
    // Find the closing @@, everything after it is optional context
    let pos = header.find(" @@")?;
    let (ranges, rest) = header.split_at(pos);
    let context = rest[" @@".len()..].trim_start().to_string();

    let mut parts = ranges.split(' ');
    let (old_start, old_count) = parse_range(parts.next()?.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts.next()?.strip_prefix('+')?)?;
    if parts.next().is_some() {
        return None;
    }

    Some(HunkHeader {
        old_start,
        old_count,
        new_start,
        new_count,
        context,
    })
}

/// Parse a range like "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    match s.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((s.parse().ok()?, 1)),
    }
}

pub fn stats(files: &[DiffFile]) -> DiffStats {
    files.iter().flat_map(|f| &f.hunks).fold(
        DiffStats {
            files: files.len(),
            ..DiffStats::default()
        },
        |acc, hunk| DiffStats {
            additions: acc.additions + hunk.additions,
            deletions: acc.deletions + hunk.deletions,
            ..acc
        },
    )
}

/// Extension used to pick a syntax for a file's hunk lines.
pub fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_diff_returns_empty() {
        assert!(parse_diff("").unwrap().is_empty());
    }

    #[test]
    fn parse_single_file_single_hunk() {
        let diff = r#"diff --git a/file.txt b/file.txt
index 1234567..abcdefg 100644
--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,3 @@
 line1
-line2
+line2_modified
 line3
"#;
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("file.txt"));
        assert_eq!(files[0].hunks.len(), 1);

        let hunk = &files[0].hunks[0];
        assert_eq!(hunk.header.old_start, 1);
        assert_eq!(hunk.header.old_count, 3);
        assert_eq!(hunk.header.new_start, 1);
        assert_eq!(hunk.header.new_count, 3);
        assert_eq!(hunk.additions, 1);
        assert_eq!(hunk.deletions, 1);
    }

    #[test]
    fn parse_multiple_files_and_stats() {
        let diff = r#"diff --git a/file1.txt b/file1.txt
--- a/file1.txt
+++ b/file1.txt
@@ -1,2 +1,2 @@
-old
+new
 same
diff --git a/file2.rs b/file2.rs
--- a/file2.rs
+++ b/file2.rs
@@ -1 +1,2 @@
 fn main() {}
+fn other() {}
"#;
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].path, PathBuf::from("file2.rs"));
        assert_eq!(extension(&files[1].path), "rs");

        let totals = stats(&files);
        assert_eq!(
            totals,
            DiffStats {
                files: 2,
                additions: 2,
                deletions: 1
            }
        );
    }

    #[test]
    fn binary_file_has_no_hunks() {
        let diff = r#"diff --git a/image.png b/image.png
index 1234567..abcdefg 100644
Binary files a/image.png and b/image.png differ
diff --git a/file.txt b/file.txt
--- a/file.txt
+++ b/file.txt
@@ -1 +1 @@
-old
+new
"#;
        let files = parse_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("file.txt"));
    }

    #[test]
    fn deleted_file_uses_old_path() {
        let diff = r#"diff --git a/deleted.txt b/deleted.txt
deleted file mode 100644
--- a/deleted.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-line1
-line2
"#;
        let files = parse_diff(diff).unwrap();
        assert_eq!(files[0].path, PathBuf::from("deleted.txt"));
        assert_eq!(files[0].hunks[0].deletions, 2);
    }

    #[test]
    fn removed_line_starting_with_dashes_stays_in_hunk() {
        let diff = "--- a/notes.md\n+++ b/notes.md\n@@ -1,2 +1,1 @@\n--- heading rule\n keep\n";
        let lines = classify(diff).unwrap();
        assert_eq!(lines[3].kind, LineKind::Removed);
        assert_eq!(lines[4].kind, LineKind::Context);
    }

    #[test]
    fn no_newline_marker_after_hunk() {
        let diff = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+b\n\\ No newline at end of file\n";
        let lines = classify(diff).unwrap();
        assert_eq!(lines.last().unwrap().kind, LineKind::NoNewline);
    }

    #[test]
    fn hunk_header_edge_cases() {
        let header = parse_hunk_header("@@ -5 +5 @@").unwrap();
        assert_eq!((header.old_start, header.old_count), (5, 1));
        assert_eq!((header.new_start, header.new_count), (5, 1));
        assert!(header.context.is_empty());

        let header = parse_hunk_header("@@ -0,0 +1,2 @@ fn main() {").unwrap();
        assert_eq!((header.old_start, header.old_count), (0, 0));
        assert_eq!((header.new_start, header.new_count), (1, 2));
        assert_eq!(header.context, "fn main() {");

        assert!(parse_hunk_header("@@ -x,1 +1 @@").is_none());
        assert!(parse_hunk_header("@@ -1 +1").is_none());
        assert!(parse_hunk_header("@@ 1 1 @@").is_none());
    }

    #[test]
    fn malformed_header_is_an_error() {
        let err = parse_diff("--- a/f\n+++ b/f\n@@ nonsense @@\n").unwrap_err();
        assert_eq!(
            err,
            DiffError::MalformedHunkHeader {
                line: 3,
                header: "@@ nonsense @@".to_string()
            }
        );
    }

    #[test]
    fn garbage_inside_hunk_is_an_error() {
        let err = parse_diff("--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n a\n?b\n").unwrap_err();
        assert!(matches!(err, DiffError::UnexpectedLine { line: 5, .. }));
    }

    #[test]
    fn truncated_hunk_is_an_error() {
        let err = parse_diff("--- a/f\n+++ b/f\n@@ -1,3 +1,3 @@\n a\n").unwrap_err();
        assert_eq!(err, DiffError::Truncated { old: 2, new: 2 });
    }

    #[test]
    fn text_without_hunks_is_not_an_error() {
        let lines = classify("just some words\nand more").unwrap();
        assert!(lines.iter().all(|l| l.kind == LineKind::Other));
    }
}
