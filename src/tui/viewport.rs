use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Paragraph},
};

/// Scrollable region over pre-rendered lines.
///
/// Lines are hard-wrapped to `width` on construction so the offset always
/// counts visual rows.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    lines: Vec<Line<'static>>,
    width: u16,
    height: u16,
    offset: usize,
}

impl Viewport {
    pub fn new(lines: Vec<Line<'static>>, width: u16, height: u16) -> Self {
        let lines = lines
            .into_iter()
            .flat_map(|line| wrap_line(line, width as usize))
            .collect();
        Self {
            lines,
            width,
            height,
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height as usize)
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Percentage of the content scrolled past, 100 when everything fits.
    pub fn scroll_percent(&self) -> u16 {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        ((self.offset * 100) / max) as u16
    }

    /// Apply a navigation key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let page = (self.height as usize).max(1);
        let half = (page / 2).max(1);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('d') if ctrl => self.scroll_down(half),
            KeyCode::Char('u') if ctrl => self.scroll_up(half),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1),
            KeyCode::PageDown | KeyCode::Char('f') | KeyCode::Char(' ') => self.scroll_down(page),
            KeyCode::PageUp | KeyCode::Char('b') => self.scroll_up(page),
            KeyCode::Home | KeyCode::Char('g') => self.goto_top(),
            KeyCode::End | KeyCode::Char('G') => self.goto_bottom(),
            _ => return false,
        }
        true
    }

    /// The currently visible slice of lines.
    pub fn visible(&self) -> &[Line<'static>] {
        let end = (self.offset + self.height as usize).min(self.lines.len());
        &self.lines[self.offset..end]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, block: Block<'static>) {
        let text = Text::from(self.visible().to_vec());
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

/// Split a styled line into rows of at most `width` display columns,
/// carrying each span's style onto the rows it lands in.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line];
    }

    let plain: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    let options = textwrap::Options::new(width)
        .break_words(true)
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit);
    let rows = textwrap::wrap(&plain, options);
    if rows.len() <= 1 {
        return vec![line];
    }

    // Byte range of every span within `plain`.
    let mut spans = Vec::with_capacity(line.spans.len());
    let mut offset = 0;
    for span in &line.spans {
        let len = span.content.len();
        spans.push((offset, offset + len, span.style));
        offset += len;
    }

    let mut out = Vec::with_capacity(rows.len());
    let mut cursor = 0;
    for row in &rows {
        let start = cursor + plain[cursor..].find(&row[..]).unwrap_or(0);
        let end = start + row.len();
        cursor = end;

        let row_spans: Vec<Span<'static>> = spans
            .iter()
            .filter(|(s, e, _)| *s < end && *e > start)
            .map(|&(s, e, style)| {
                Span::styled(plain[s.max(start)..e.min(end)].to_string(), style)
            })
            .collect();
        out.push(Line::from(row_spans).style(line.style));
    }
    out
}
