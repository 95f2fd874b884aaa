use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::path::PathBuf;
use syntect::{
    easy::HighlightLines,
    highlighting::{Color as SyntectColor, Theme, ThemeSet},
    parsing::SyntaxSet,
};
use thiserror::Error;

use crate::diff::{self, DiffError, LineKind};

/// Maximum line length for syntax highlighting (skip longer lines for performance).
const MAX_LINE_LENGTH: usize = 10_000;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("unknown syntax theme: {0}")]
    UnknownTheme(String),
    #[error("malformed diff: {0}")]
    Diff(#[from] DiffError),
}

pub type Result<T> = std::result::Result<T, HighlightError>;

/// Syntax highlighter for diff content.
///
/// This struct is immutable and can be shared. Use `for_file()` to create
/// a stateful highlighter session for a specific file.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Create a new Highlighter with the default theme.
    ///
    /// This loads all bundled syntaxes and themes, which takes ~250ms.
    /// The cost is paid once at initialization.
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get(DEFAULT_THEME)
            .or_else(|| theme_set.themes.values().next())
            .cloned()
            .unwrap_or_default();

        Self { syntax_set, theme }
    }

    /// Create a Highlighter using one of the bundled syntect themes.
    pub fn with_theme(name: &str) -> Result<Self> {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .remove(name)
            .ok_or_else(|| HighlightError::UnknownTheme(name.to_string()))?;

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Create a file-scoped highlighter session that maintains state across lines.
    ///
    /// This is necessary for multi-line constructs like multi-line strings,
    /// multi-line comments, and nested blocks to be highlighted correctly.
    pub fn for_file(&self, file_ext: &str) -> FileHighlighter<'_> {
        FileHighlighter::new(&self.syntax_set, &self.theme, file_ext)
    }

    /// Highlight a complete unified diff.
    ///
    /// Headers get fixed diff colors; hunk lines are highlighted with the
    /// syntax of the file they belong to. Fails if the diff structure is
    /// malformed (bad hunk header, stray line inside a hunk, truncated hunk).
    pub fn highlight_diff(&self, text: &str) -> Result<Vec<Line<'static>>> {
        let classified = diff::classify(text)?;
        let mut lines = Vec::with_capacity(classified.len());
        let mut session: Option<(Option<PathBuf>, FileHighlighter<'_>)> = None;

        for line in classified {
            let styled = match line.kind {
                LineKind::FileHeader => Line::from(Span::styled(
                    line.text.to_string(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                LineKind::Meta | LineKind::NoNewline => Line::from(Span::styled(
                    line.text.to_string(),
                    Style::default().fg(Color::DarkGray),
                )),
                LineKind::OldPath => Line::from(Span::styled(
                    line.text.to_string(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                LineKind::NewPath => Line::from(Span::styled(
                    line.text.to_string(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )),
                LineKind::HunkHeader(_) => Line::from(Span::styled(
                    line.text.to_string(),
                    Style::default().fg(Color::Cyan),
                )),
                LineKind::Added | LineKind::Removed | LineKind::Context => {
                    let stale = session
                        .as_ref()
                        .is_none_or(|(path, _)| *path != line.path);
                    if stale {
                        let ext = line.path.as_deref().map(diff::extension).unwrap_or("");
                        session = Some((line.path.clone(), self.for_file(ext)));
                    }
                    match session.as_mut() {
                        Some((_, fh)) => Line::from(fh.highlight_diff_line(line.text)),
                        None => Line::from(line.text.to_string()),
                    }
                }
                LineKind::Other => Line::from(line.text.to_string()),
            };
            lines.push(styled);
        }

        Ok(lines)
    }

    /// Convert syntect Color to ratatui Color.
    fn syntect_to_ratatui(color: SyntectColor) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Maintains HighlightLines state across lines within a single file.
///
/// This struct is created per-file and maintains parse state for multi-line
/// constructs. It must be used sequentially for all lines in a file.
pub struct FileHighlighter<'a> {
    highlighter: Option<HighlightLines<'a>>,
    syntax_set: &'a SyntaxSet,
}

impl<'a> FileHighlighter<'a> {
    fn new(syntax_set: &'a SyntaxSet, theme: &'a Theme, file_ext: &str) -> Self {
        let syntax = syntax_set
            .find_syntax_by_extension(file_ext)
            .or_else(|| syntax_set.find_syntax_by_name(file_ext));

        let highlighter = syntax.map(|s| HighlightLines::new(s, theme));

        Self {
            highlighter,
            syntax_set,
        }
    }

    /// Highlight a single hunk line. Maintains state for multi-line constructs.
    ///
    /// The `+`/`-` prefix keeps its diff color; the rest is syntax highlighted.
    /// Falls back to plain diff coloring if highlighting fails or the file
    /// type is unknown.
    pub fn highlight_diff_line(&mut self, line: &str) -> Vec<Span<'static>> {
        if line.is_empty() {
            return vec![Span::raw(String::new())];
        }

        let (prefix, prefix_color) = if line.starts_with('+') {
            ("+", Color::Green)
        } else if line.starts_with('-') {
            ("-", Color::Red)
        } else if line.starts_with(' ') {
            (" ", Color::Reset)
        } else {
            return vec![Span::raw(line.to_string())];
        };

        if line.len() > MAX_LINE_LENGTH {
            return vec![Span::styled(
                line.to_string(),
                Style::default().fg(prefix_color),
            )];
        }

        let content = &line[1..];

        let Some(ref mut highlighter) = self.highlighter else {
            return vec![Span::styled(
                line.to_string(),
                Style::default().fg(prefix_color),
            )];
        };

        match highlighter.highlight_line(content, self.syntax_set) {
            Ok(regions) => {
                let mut spans = Vec::with_capacity(regions.len() + 1);
                spans.push(Span::styled(
                    prefix.to_string(),
                    Style::default().fg(prefix_color),
                ));
                for (style, text) in regions {
                    let fg_color = Highlighter::syntect_to_ratatui(style.foreground);
                    spans.push(Span::styled(
                        text.to_string(),
                        Style::default().fg(fg_color),
                    ));
                }
                spans
            }
            Err(e) => {
                tracing::debug!("syntax highlighting failed, using plain diff colors: {}", e);
                vec![Span::styled(
                    line.to_string(),
                    Style::default().fg(prefix_color),
                )]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlighter_finds_syntaxes() {
        let highlighter = Highlighter::new();

        let fh = highlighter.for_file("rs");
        assert!(fh.highlighter.is_some(), "Rust syntax should be found");

        let fh = highlighter.for_file("unknown_ext_xyz");
        assert!(
            fh.highlighter.is_none(),
            "Unknown extension should have no highlighter"
        );
    }

    #[test]
    fn test_with_theme() {
        assert!(Highlighter::with_theme("InspiredGitHub").is_ok());
        assert!(matches!(
            Highlighter::with_theme("no-such-theme"),
            Err(HighlightError::UnknownTheme(_))
        ));
    }

    #[test]
    fn test_highlight_added_line() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("rs");
        let spans = fh.highlight_diff_line("+fn main() { println!(\"test\"); }");

        assert_eq!(spans[0].content.as_ref(), "+");
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert!(spans.len() > 1, "Should have syntax highlighted content");
    }

    #[test]
    fn test_highlight_removed_line() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("rs");
        let spans = fh.highlight_diff_line("-fn old_function() {}");

        assert_eq!(spans[0].content.as_ref(), "-");
        assert_eq!(spans[0].style.fg, Some(Color::Red));
        assert!(spans.len() > 1);
    }

    #[test]
    fn test_fallback_for_unknown_extension() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("unknown_xyz");
        let line = "+some text in unknown format";
        let spans = fh.highlight_diff_line(line);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[0].content.as_ref(), line);
    }

    #[test]
    fn test_line_with_only_prefix() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("rs");
        let spans = fh.highlight_diff_line("+");
        assert_eq!(spans[0].content.as_ref(), "+");
    }

    #[test]
    fn test_long_line_skips_highlighting() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("rs");
        let long_line = "+".to_string() + &"x".repeat(15_000);
        let spans = fh.highlight_diff_line(&long_line);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_highlight_diff_keeps_every_line() {
        let highlighter = Highlighter::new();
        let text = "diff --git a/src/lib.rs b/src/lib.rs\nindex 1..2 100644\n--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1,2 +1,2 @@\n fn keep() {}\n-fn old() {}\n+fn new() {}\n";
        let lines = highlighter.highlight_diff(text).unwrap();

        assert_eq!(lines.len(), text.lines().count());
        for (line, raw) in lines.iter().zip(text.lines()) {
            assert_eq!(line_text(line), raw);
        }
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Yellow));
        assert_eq!(lines[4].spans[0].style.fg, Some(Color::Cyan));
        assert_eq!(lines[7].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn test_highlight_diff_rejects_malformed_diff() {
        let highlighter = Highlighter::new();
        let err = highlighter
            .highlight_diff("--- a/f\n+++ b/f\n@@ broken @@\n")
            .unwrap_err();
        assert!(matches!(err, HighlightError::Diff(_)));
    }

    #[test]
    fn test_syntect_to_ratatui_conversion() {
        let syntect_color = SyntectColor {
            r: 255,
            g: 128,
            b: 64,
            a: 255,
        };
        assert_eq!(
            Highlighter::syntect_to_ratatui(syntect_color),
            Color::Rgb(255, 128, 64)
        );
    }
}
