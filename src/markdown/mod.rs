use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use thiserror::Error;
use textwrap::core::display_width;

/// Narrowest wrap width the renderer accepts.
pub const MIN_WRAP_WIDTH: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("wrap width {width} is below the minimum of {MIN_WRAP_WIDTH}")]
    WidthTooSmall { width: usize },
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render markdown into styled lines no wider than `width` display columns.
pub fn render_markdown(text: &str, width: usize) -> Result<Vec<Line<'static>>> {
    if width < MIN_WRAP_WIDTH {
        return Err(RenderError::WidthTooSmall { width });
    }

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let mut renderer = MarkdownRenderer::new(width);
    for event in Parser::new_ext(text, options) {
        match event {
            Event::Start(tag) => renderer.start_tag(tag),
            Event::End(tag) => renderer.end_tag(tag),
            Event::Text(text) => renderer.text(&text),
            Event::Code(text) => renderer.inline_code(&text),
            Event::Html(html) => renderer.html(&html),
            Event::SoftBreak => renderer.soft_break(),
            Event::HardBreak => renderer.flush_line(),
            Event::Rule => renderer.rule(),
            Event::TaskListMarker(checked) => renderer.task_marker(checked),
            _ => {}
        }
    }
    Ok(renderer.finish())
}

/// Plain-text rendering used when markdown rendering is unavailable.
pub fn plain_lines(text: &str) -> Vec<Line<'static>> {
    text.lines().map(|l| Line::from(l.to_string())).collect()
}

struct MarkdownRenderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    current_width: usize,
    width: usize,
    style_stack: Vec<Style>,
    /// Next ordinal for ordered lists, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    /// Marker and indentation for the first line of the current list item.
    item_prefix: Option<String>,
    /// Display width of each open list item's prefix, innermost last.
    item_indents: Vec<usize>,
    quote_depth: usize,
    in_code_block: bool,
    table_cell: usize,
    pending_space: bool,
    line_started: bool,
}

impl MarkdownRenderer {
    fn new(width: usize) -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
            width,
            style_stack: vec![Style::default()],
            lists: Vec::new(),
            item_prefix: None,
            item_indents: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            table_cell: 0,
            pending_space: false,
            line_started: false,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let color = match level {
                    HeadingLevel::H1 | HeadingLevel::H2 => Color::Cyan,
                    _ => Color::Blue,
                };
                self.push_style(Style::new().fg(color).add_modifier(Modifier::BOLD));
            }
            Tag::Emphasis => self.push_style(Style::new().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::new().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(Style::new().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } => self.push_style(
                Style::new()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Tag::BlockQuote => {
                self.flush_line();
                self.quote_depth += 1;
                self.push_style(Style::new().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.in_code_block = true;
                self.push_style(Style::new().fg(Color::Yellow));
            }
            Tag::List(start) => {
                self.flush_line();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let parent = self.item_indents.last().copied().unwrap_or(0);
                let prefix = format!("{}{:<3}", " ".repeat(parent), marker);
                self.item_indents.push(display_width(&prefix));
                self.item_prefix = Some(prefix);
            }
            Tag::TableHead => {
                self.table_cell = 0;
                self.push_style(Style::new().add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => self.table_cell = 0,
            Tag::TableCell => {
                if self.table_cell > 0 {
                    let style = self.style().fg(Color::DarkGray);
                    self.pending_space = true;
                    self.push_word("│", style);
                    self.pending_space = true;
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.pop_style();
                self.flush_line();
                self.blank_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            TagEnd::Paragraph => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::BlockQuote => {
                self.flush_line();
                self.pop_style();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                self.flush_line();
                self.in_code_block = false;
                self.pop_style();
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => {
                self.flush_line();
                self.item_prefix = None;
                self.item_indents.pop();
            }
            TagEnd::TableHead => {
                self.flush_line();
                self.pop_style();
                let rule = "─".repeat(self.width.saturating_sub(self.prefix_width()));
                self.push_raw_line(rule, Style::new().fg(Color::DarkGray));
            }
            TagEnd::TableRow => self.flush_line(),
            TagEnd::Table => {
                self.flush_line();
                self.blank_line();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        if self.in_code_block {
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    // Blank code lines still produce a line.
                    self.start_line();
                    self.flush_line();
                }
                if !line.is_empty() {
                    self.push_code_line(line, style);
                }
            }
            return;
        }
        self.push_text(text, style);
    }

    fn inline_code(&mut self, text: &str) {
        let style = self.style().fg(Color::Yellow);
        self.push_text(text, style);
    }

    fn html(&mut self, html: &str) {
        let style = self.style().fg(Color::DarkGray);
        for line in html.lines() {
            self.push_text(line, style);
            self.flush_line();
        }
    }

    fn soft_break(&mut self) {
        if self.in_code_block {
            self.flush_line();
        } else {
            self.pending_space = true;
        }
    }

    fn rule(&mut self) {
        self.flush_line();
        let rule = "─".repeat(self.width.saturating_sub(self.prefix_width()));
        self.push_raw_line(rule, Style::new().fg(Color::DarkGray));
        self.blank_line();
    }

    fn task_marker(&mut self, checked: bool) {
        let marker = if checked { "[x]" } else { "[ ]" };
        let style = self.style().fg(Color::Green);
        self.push_word(marker, style);
        self.pending_space = true;
    }

    /// Width of the quote bars and list indentation for continuation lines.
    fn prefix_width(&self) -> usize {
        self.quote_depth * 2 + self.item_indents.last().copied().unwrap_or(0)
    }

    /// Columns left for content once the line prefix is in place.
    fn available(&self) -> usize {
        self.width.saturating_sub(self.prefix_width()).max(1)
    }

    fn start_line(&mut self) {
        if self.line_started {
            return;
        }
        self.line_started = true;
        let bar_style = Style::new().fg(Color::DarkGray);
        for _ in 0..self.quote_depth {
            self.current.push(Span::styled("│ ", bar_style));
        }
        if let Some(prefix) = self.item_prefix.take() {
            self.current.push(Span::raw(prefix));
        } else if let Some(&indent) = self.item_indents.last() {
            self.current.push(Span::raw(" ".repeat(indent)));
        }
        self.current_width = self.prefix_width();
    }

    fn push_text(&mut self, text: &str, style: Style) {
        for (i, word) in text.split(' ').enumerate() {
            if i > 0 {
                self.pending_space = true;
            }
            if !word.is_empty() {
                self.push_word(word, style);
            }
        }
    }

    fn push_word(&mut self, word: &str, style: Style) {
        self.start_line();
        let word_width = display_width(word);
        if word_width > self.available() {
            self.push_long_word(word, style);
            self.pending_space = false;
            return;
        }

        let line_start = self.prefix_width();
        let space = usize::from(self.pending_space && self.current_width > line_start);
        self.pending_space = false;

        if self.current_width + space + word_width > self.width && self.current_width > line_start
        {
            self.flush_line();
            self.start_line();
        } else if space == 1 {
            self.current.push(Span::styled(" ", style));
            self.current_width += 1;
        }

        self.current.push(Span::styled(word.to_string(), style));
        self.current_width += word_width;
    }

    /// Split a word wider than a whole line across as many lines as needed.
    fn push_long_word(&mut self, word: &str, style: Style) {
        if self.current_width > self.prefix_width() {
            self.flush_line();
            self.start_line();
        }
        let options = textwrap::Options::new(self.available()).break_words(true);
        for (i, part) in textwrap::wrap(word, options).iter().enumerate() {
            if i > 0 {
                self.flush_line();
                self.start_line();
            }
            self.current.push(Span::styled(part.to_string(), style));
            self.current_width += display_width(part);
        }
    }

    /// Code keeps its leading indentation; overlong lines wrap at spaces,
    /// or mid-token when a token is wider than the line.
    fn push_code_line(&mut self, line: &str, style: Style) {
        let options = textwrap::Options::new(self.available())
            .break_words(true)
            .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit);
        for (i, part) in textwrap::wrap(line, options).iter().enumerate() {
            if i > 0 {
                self.flush_line();
            }
            self.start_line();
            self.current.push(Span::styled(part.to_string(), style));
            self.current_width += display_width(part);
        }
    }

    fn push_raw_line(&mut self, text: String, style: Style) {
        self.start_line();
        self.current.push(Span::styled(text, style));
        self.flush_line();
    }

    fn flush_line(&mut self) {
        if self.line_started {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
            self.line_started = false;
        }
        self.current_width = 0;
        self.pending_space = false;
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn rejects_tiny_width() {
        assert_eq!(
            render_markdown("hello", 3),
            Err(RenderError::WidthTooSmall { width: 3 })
        );
    }

    #[test]
    fn wraps_paragraphs_to_width() {
        let lines = render_markdown("one two three four five six seven eight", 12).unwrap();
        for line in &lines {
            assert!(line.width() <= 12, "line too wide: {:?}", line);
        }
        assert_eq!(
            text_of(&lines).join(" "),
            "one two three four five six seven eight"
        );
    }

    #[test]
    fn heading_is_bold_and_followed_by_blank_line() {
        let lines = render_markdown("# Title\n\nbody", 40).unwrap();
        let text = text_of(&lines);
        assert_eq!(text, vec!["Title", "", "body"]);
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn lists_get_markers() {
        let lines = render_markdown("- a\n- b\n\n1. first\n2. second", 40).unwrap();
        let text = text_of(&lines);
        assert!(text.contains(&"•  a".to_string()));
        assert!(text.contains(&"1. first".to_string()));
        assert!(text.contains(&"2. second".to_string()));
    }

    #[test]
    fn two_digit_ordinals_stay_within_width() {
        let items: Vec<String> = (1..=12)
            .map(|n| format!("{}. alpha beta gamma delta epsilon", n))
            .collect();
        let lines = render_markdown(&items.join("\n"), 19).unwrap();
        for line in &lines {
            assert!(line.width() <= 19, "line too wide: {:?}", line);
        }

        let text = text_of(&lines);
        let tenth = text.iter().position(|l| l.starts_with("10. ")).unwrap();
        assert_eq!(text[tenth], "10. alpha beta");
        assert!(text[tenth + 1].starts_with("    gamma"));
    }

    #[test]
    fn nested_list_indents_under_parent() {
        let lines = render_markdown("- outer\n  - inner", 40).unwrap();
        assert_eq!(text_of(&lines), vec!["•  outer", "   •  inner"]);
    }

    #[test]
    fn code_block_keeps_indentation() {
        let lines = render_markdown("```\n    indented();\n```", 40).unwrap();
        assert_eq!(text_of(&lines), vec!["    indented();"]);
    }

    #[test]
    fn task_list_markers() {
        let lines = render_markdown("- [x] done\n- [ ] todo", 40).unwrap();
        let text = text_of(&lines);
        assert!(text[0].contains("[x] done"));
        assert!(text[1].contains("[ ] todo"));
    }

    #[test]
    fn code_block_keeps_lines() {
        let lines = render_markdown("```\nlet a = 1;\nlet b = 2;\n```", 40).unwrap();
        assert_eq!(text_of(&lines), vec!["let a = 1;", "let b = 2;"]);
    }

    #[test]
    fn long_word_is_split() {
        let word = "x".repeat(30);
        let lines = render_markdown(&word, 10).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.width() <= 10));
    }

    #[test]
    fn quote_has_bar_prefix() {
        let lines = render_markdown("> quoted", 40).unwrap();
        assert_eq!(text_of(&lines), vec!["│ quoted"]);
    }

    #[test]
    fn sample_description_renders_within_width() {
        let text = include_str!("../../assets/sample_description.md");
        let lines = render_markdown(text, 40).unwrap();
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|l| l.width() <= 40));
    }

    #[test]
    fn plain_lines_keeps_raw_text() {
        assert_eq!(text_of(&plain_lines("# a\n*b*")), vec!["# a", "*b*"]);
    }
}
