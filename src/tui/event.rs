use crossterm::event::{self as ct, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fmt;

/// Identifies one of the application's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum PageId {
    List,
    Review,
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageId::List => write!(f, "list"),
            PageId::Review => write!(f, "review"),
        }
    }
}

/// Input delivered to the router, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    ChangePage(PageId),
}

impl Event {
    /// Convert a terminal event. Key releases and events the application
    /// does not react to (mouse, focus, paste) are dropped.
    pub fn from_terminal(event: ct::Event) -> Option<Self> {
        match event {
            ct::Event::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            ct::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            _ => None,
        }
    }

    /// `q`, `Esc` and `Ctrl+C` quit from any page.
    pub fn is_quit(&self) -> bool {
        let Event::Key(key) = self else {
            return false;
        };
        match key.code {
            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
            KeyCode::Char('q') => !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT),
            KeyCode::Esc => true,
            _ => false,
        }
    }
}

/// Follow-up requested by a page, run by the router after the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ChangePage(PageId),
}

impl From<Action> for Event {
    fn from(action: Action) -> Self {
        match action {
            Action::ChangePage(id) => Event::ChangePage(id),
        }
    }
}
