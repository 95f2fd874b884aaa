use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};
use std::time::{Duration, Instant};

use crate::PullRequest;
use crate::config::Chrome;
use crate::diff::{self, DiffStats};
use crate::highlight::Highlighter;
use crate::markdown;
use crate::source::PullRequestSource;
use crate::tui::event::Action;
use crate::tui::help::{Binding, HelpBar};
use crate::tui::viewport::Viewport;

const NOTICE_TTL: Duration = Duration::from_secs(3);
const TITLE_HEIGHT: u16 = 1;
/// Blank rows below the title and above the help bar.
const VERTICAL_PADDING: u16 = 2;

/// Which scrollable pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Description,
    Diff,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Description => Focus::Diff,
            Focus::Diff => Focus::Description,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Focus::Description => 0,
            Focus::Diff => 1,
        }
    }
}

/// Regions of the review page for a given area.
struct ReviewLayout {
    title: Rect,
    description: Rect,
    comments: Rect,
    checks: Rect,
    diff: Rect,
    help: Rect,
}

impl ReviewLayout {
    fn new(area: Rect, help_height: u16, check_count: usize) -> Self {
        let content_height = content_height(area.height, help_height);
        let [title, _, body, _, help] = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(content_height),
            Constraint::Length(1),
            Constraint::Length(help_height),
        ])
        .areas(area);

        let [description, right] =
            Layout::horizontal([Constraint::Length(body.width / 2), Constraint::Min(0)])
                .areas(body);

        let diff_height = (content_height / 2 + 2).min(content_height);
        let [top, diff] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(diff_height)]).areas(right);
        let checks_height = u16::try_from(check_count)
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        let [comments, checks] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(checks_height)]).areas(top);

        Self {
            title,
            description,
            comments,
            checks,
            diff,
            help,
        }
    }
}

/// Rows left for the two-column body once title, padding and help are placed.
fn content_height(height: u16, help_height: u16) -> u16 {
    height.saturating_sub(TITLE_HEIGHT + help_height + VERTICAL_PADDING)
}

/// Shows one pull request across description, comments, status checks and
/// diff, with focus cycling between the description and diff panes.
pub struct ReviewPage {
    source: Box<dyn PullRequestSource>,
    highlighter: Highlighter,
    chrome: Chrome,
    record: Option<PullRequest>,
    stats: DiffStats,
    focus: Focus,
    help: HelpBar,
    width: u16,
    height: u16,
    content_ready: bool,
    description: Viewport,
    diff: Viewport,
    notice: Option<(String, Instant)>,
    layout_passes: usize,
    activations: usize,
}

impl ReviewPage {
    pub fn new(
        source: Box<dyn PullRequestSource>,
        highlighter: Highlighter,
        chrome: Chrome,
    ) -> Self {
        Self {
            source,
            highlighter,
            chrome,
            record: None,
            stats: DiffStats::default(),
            focus: Focus::Description,
            help: help_bar(),
            width: 0,
            height: 0,
            content_ready: false,
            description: Viewport::default(),
            diff: Viewport::default(),
            notice: None,
            layout_passes: 0,
            activations: 0,
        }
    }

    /// Fetch the first record if none is held yet.
    pub fn init(&mut self) {
        self.activations += 1;
        if self.record.is_none() {
            self.fetch_next();
        }
    }

    pub fn activations(&self) -> usize {
        self.activations
    }

    pub fn record(&self) -> Option<&PullRequest> {
        self.record.as_ref()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn content_ready(&self) -> bool {
        self.content_ready
    }

    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn description_viewport(&self) -> &Viewport {
        &self.description
    }

    pub fn diff_viewport(&self) -> &Viewport {
        &self.diff
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.content_ready = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('s') => {
                if !self.fetch_next() {
                    self.set_notice("no more pull requests");
                }
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Char('?') => {
                self.help.toggle();
                self.content_ready = false;
            }
            _ => {
                let pane = match self.focus {
                    Focus::Description => &mut self.description,
                    Focus::Diff => &mut self.diff,
                };
                pane.handle_key(key);
            }
        }
        Vec::new()
    }

    /// Replace the held record with the next one from the source. Returns
    /// false, leaving the current record in place, once the source is empty.
    fn fetch_next(&mut self) -> bool {
        let Some(pr) = self.source.next() else {
            return false;
        };
        self.stats = match diff::parse_diff(&pr.diff) {
            Ok(files) => diff::stats(&files),
            Err(e) => {
                tracing::debug!("diff statistics unavailable: {}", e);
                DiffStats::default()
            }
        };
        self.record = Some(pr);
        self.content_ready = false;
        true
    }

    fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some((message.into(), Instant::now()));
    }

    /// Rebuild both panes from the held record for the given area.
    fn relayout(&mut self, area: Rect) {
        let layout = ReviewLayout::new(area, self.help.height(), self.check_count());

        // Borders plus one column of left padding.
        let desc_width = layout.description.width.saturating_sub(3);
        let desc_height = layout.description.height.saturating_sub(2);
        let diff_width = layout.diff.width.saturating_sub(2);
        let diff_height = content_height(area.height, self.help.height()) / 2;

        let (desc_lines, diff_lines) = match &self.record {
            Some(pr) => {
                let desc = match markdown::render_markdown(&pr.description, desc_width as usize) {
                    Ok(lines) => lines,
                    Err(e) => {
                        tracing::warn!("markdown rendering failed, showing plain text: {}", e);
                        self.notice =
                            Some(("description shown as plain text".to_string(), Instant::now()));
                        markdown::plain_lines(&pr.description)
                    }
                };
                let diff = match self.highlighter.highlight_diff(&pr.diff) {
                    Ok(lines) => lines,
                    Err(e) => {
                        tracing::warn!("diff highlighting failed, showing plain text: {}", e);
                        self.notice =
                            Some(("diff shown without highlighting".to_string(), Instant::now()));
                        markdown::plain_lines(&pr.diff)
                    }
                };
                (desc, diff)
            }
            None => (Vec::new(), Vec::new()),
        };

        self.description = Viewport::new(desc_lines, desc_width, desc_height);
        self.diff = Viewport::new(diff_lines, diff_width, diff_height);
        self.layout_passes += 1;
        self.content_ready = true;
        tracing::debug!(
            passes = self.layout_passes,
            width = area.width,
            height = area.height,
            "review page relayout"
        );
    }

    fn check_count(&self) -> usize {
        self.record.as_ref().map_or(0, |pr| pr.status_checks.len())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let expired = self
            .notice
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= NOTICE_TTL);
        if expired {
            self.notice = None;
        }

        if (area.width, area.height) != (self.width, self.height) {
            self.set_size(area.width, area.height);
        }
        if !self.content_ready {
            self.relayout(area);
        }

        let layout = ReviewLayout::new(area, self.help.height(), self.check_count());
        self.render_title(frame, layout.title);

        match &self.record {
            Some(pr) => {
                let desc_block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(
                        Style::default()
                            .fg(self.chrome.border(self.focus == Focus::Description)),
                    )
                    .padding(Padding::left(1))
                    .title(format!(" Description {}% ", self.description.scroll_percent()));
                self.description.render(frame, layout.description, desc_block);

                let comments: Vec<Line> =
                    pr.comments.iter().map(|c| Line::from(c.as_str())).collect();
                let comments = Paragraph::new(comments)
                    .block(self.static_block(format!(" Comments ({}) ", pr.comments.len())))
                    .wrap(Wrap { trim: false });
                frame.render_widget(comments, layout.comments);

                let checks: Vec<Line> = pr
                    .status_checks
                    .iter()
                    .map(|c| Line::from(c.as_str()))
                    .collect();
                let checks =
                    Paragraph::new(checks).block(self.static_block(" Status checks ".to_string()));
                frame.render_widget(checks, layout.checks);

                let diff_block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(
                        Style::default().fg(self.chrome.border(self.focus == Focus::Diff)),
                    )
                    .title(format!(" Diff {}% ", self.diff.scroll_percent()));
                self.diff.render(frame, layout.diff, diff_block);
            }
            None => {
                let body = layout.description.union(layout.diff);
                let placeholder = Paragraph::new("Loading pull request…")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(placeholder, body);
            }
        }

        self.help.render(frame, layout.help);
    }

    fn static_block(&self, title: String) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.chrome.unfocused_border))
            .title(title)
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            self.record.as_ref().map_or("Review", |pr| pr.title.as_str()).to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.record.is_some() {
            spans.push(Span::styled(
                format!(
                    "  {} files +{} -{}",
                    self.stats.files, self.stats.additions, self.stats.deletions
                ),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        if let Some((msg, _)) = &self.notice {
            let notice = Paragraph::new(msg.as_str())
                .alignment(Alignment::Right)
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(notice, area);
        }
    }
}

fn help_bar() -> HelpBar {
    HelpBar::new(
        vec![
            Binding::new("s", "skip"),
            Binding::new("tab", "switch panel"),
            Binding::new("?", "more"),
            Binding::new("q", "quit"),
        ],
        vec![
            vec![Binding::new("s", "skip"), Binding::new("tab", "switch panel")],
            vec![
                Binding::new("↑/k", "up"),
                Binding::new("↓/j", "down"),
                Binding::new("pgup/b", "page up"),
                Binding::new("pgdn/f", "page down"),
                Binding::new("g/G", "top/bottom"),
            ],
            vec![Binding::new("?", "close help"), Binding::new("q", "quit")],
        ],
    )
}
