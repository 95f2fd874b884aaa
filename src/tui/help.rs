use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const SEPARATOR: &str = " • ";

/// A key and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: &'static str,
    pub description: &'static str,
}

impl Binding {
    pub const fn new(key: &'static str, description: &'static str) -> Self {
        Self { key, description }
    }
}

/// Key-binding help with a one-line short mode and a columned full mode.
#[derive(Debug, Clone)]
pub struct HelpBar {
    short: Vec<Binding>,
    full: Vec<Vec<Binding>>,
    show_all: bool,
}

impl HelpBar {
    pub fn new(short: Vec<Binding>, full: Vec<Vec<Binding>>) -> Self {
        Self {
            short,
            full,
            show_all: false,
        }
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn toggle(&mut self) {
        self.show_all = !self.show_all;
    }

    /// Rows the help bar occupies in its current mode.
    pub fn height(&self) -> u16 {
        if self.show_all {
            self.full.iter().map(Vec::len).max().unwrap_or(0).max(1) as u16
        } else {
            1
        }
    }

    pub fn short_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, binding) in self.short.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(SEPARATOR, Style::default().fg(Color::DarkGray)));
            }
            spans.extend(binding_spans(binding));
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.show_all {
            frame.render_widget(Paragraph::new(self.short_line()), area);
            return;
        }

        let columns = Layout::horizontal(
            self.full
                .iter()
                .map(|col| Constraint::Length(column_width(col) + 4)),
        )
        .split(area);

        for (col, rect) in self.full.iter().zip(columns.iter()) {
            let lines: Vec<Line> = col.iter().map(|b| Line::from(binding_spans(b))).collect();
            frame.render_widget(Paragraph::new(lines), *rect);
        }
    }
}

fn binding_spans(binding: &Binding) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("{} ", binding.key), Style::default().fg(Color::Gray)),
        Span::styled(binding.description, Style::default().fg(Color::DarkGray)),
    ]
}

fn column_width(column: &[Binding]) -> u16 {
    column
        .iter()
        .map(|b| b.key.chars().count() + 1 + b.description.chars().count())
        .max()
        .unwrap_or(0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> HelpBar {
        HelpBar::new(
            vec![Binding::new("s", "skip"), Binding::new("q", "quit")],
            vec![
                vec![Binding::new("s", "skip"), Binding::new("tab", "switch")],
                vec![Binding::new("↑/k", "up"), Binding::new("↓/j", "down"), Binding::new("g", "top")],
            ],
        )
    }

    #[test]
    fn short_line_joins_bindings() {
        let text: String = bar()
            .short_line()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "s skip • q quit");
    }

    #[test]
    fn height_follows_mode() {
        let mut help = bar();
        assert_eq!(help.height(), 1);
        help.toggle();
        assert!(help.show_all());
        assert_eq!(help.height(), 3);
        help.toggle();
        assert_eq!(help.height(), 1);
    }

    #[test]
    fn full_mode_renders_columns() {
        use ratatui::{Terminal, backend::TestBackend};

        let mut help = bar();
        help.toggle();
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal.draw(|f| help.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..3)
            .map(|y| (0..60).map(|x| buffer[(x, y)].symbol()).collect())
            .collect();
        assert!(rows[0].contains("s skip"));
        assert!(rows[0].contains("↑/k up"));
        assert!(rows[1].contains("tab switch"));
        assert!(rows[2].contains("g top"));
    }
}
