use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::config::Chrome;
use crate::tui::event::{Action, PageId};
use crate::tui::help::{Binding, HelpBar};

/// Pending pull requests, with a key to start reviewing them.
pub struct ListPage {
    titles: Vec<String>,
    state: ListState,
    help: HelpBar,
    chrome: Chrome,
    width: u16,
    height: u16,
    activations: usize,
}

impl ListPage {
    pub fn new(titles: Vec<String>, chrome: Chrome) -> Self {
        let mut state = ListState::default();
        if !titles.is_empty() {
            state.select(Some(0));
        }
        Self {
            titles,
            state,
            help: help_bar(),
            chrome,
            width: 0,
            height: 0,
            activations: 0,
        }
    }

    pub fn init(&mut self) {
        self.activations += 1;
    }

    pub fn activations(&self) -> usize {
        self.activations
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn show_full_help(&self) -> bool {
        self.help.show_all()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Rows available to the list, borders included.
    pub fn list_height(&self) -> u16 {
        self.height.saturating_sub(self.help.height())
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('b') => return vec![Action::ChangePage(PageId::Review)],
            KeyCode::Char('?') => self.help.toggle(),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::PageDown => self.move_by(self.page_rows()),
            KeyCode::PageUp => self.move_by(-self.page_rows()),
            KeyCode::Home | KeyCode::Char('g') => self.select_clamped(0),
            KeyCode::End | KeyCode::Char('G') => self.select_clamped(isize::MAX),
            _ => {}
        }
        Vec::new()
    }

    fn page_rows(&self) -> isize {
        self.list_height().saturating_sub(2).max(1) as isize
    }

    fn move_by(&mut self, delta: isize) {
        let current = self.state.selected().unwrap_or(0) as isize;
        self.select_clamped(current.saturating_add(delta));
    }

    fn select_clamped(&mut self, index: isize) {
        if self.titles.is_empty() {
            self.state.select(None);
            return;
        }
        let last = self.titles.len() as isize - 1;
        self.state.select(Some(index.clamp(0, last) as usize));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [list_area, help_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(self.help.height())])
                .areas(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.chrome.focused_border))
            .title(format!(" Pull requests ({}) ", self.titles.len()));

        if self.titles.is_empty() {
            let empty = Paragraph::new(Line::styled(
                "No pull requests pending",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(empty, list_area);
        } else {
            let items: Vec<ListItem> = self
                .titles
                .iter()
                .map(|t| ListItem::new(t.as_str()))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, list_area, &mut self.state);
        }

        self.help.render(frame, help_area);
    }
}

fn help_bar() -> HelpBar {
    HelpBar::new(
        vec![
            Binding::new("b", "begin review"),
            Binding::new("↑/↓", "navigate"),
            Binding::new("?", "more"),
            Binding::new("q", "quit"),
        ],
        vec![
            vec![Binding::new("b", "begin review")],
            vec![
                Binding::new("↑/k", "up"),
                Binding::new("↓/j", "down"),
                Binding::new("g/home", "first"),
                Binding::new("G/end", "last"),
            ],
            vec![Binding::new("?", "close help"), Binding::new("q", "quit")],
        ],
    )
}
