mod list;
mod review;

pub use list::ListPage;
pub use review::{Focus, ReviewPage};

use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use super::event::{Action, PageId};

/// The closed set of pages the router can switch between.
pub enum Page {
    List(ListPage),
    Review(ReviewPage),
}

impl Page {
    pub fn id(&self) -> PageId {
        match self {
            Page::List(_) => PageId::List,
            Page::Review(_) => PageId::Review,
        }
    }

    /// Called each time the page becomes active.
    pub fn init(&mut self) {
        match self {
            Page::List(page) => page.init(),
            Page::Review(page) => page.init(),
        }
    }

    /// Handle a key the router did not intercept. Returned actions are
    /// queued by the router and run before the next terminal event.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match self {
            Page::List(page) => page.handle_key(key),
            Page::Review(page) => page.handle_key(key),
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        match self {
            Page::List(page) => page.set_size(width, height),
            Page::Review(page) => page.set_size(width, height),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self {
            Page::List(page) => page.render(frame, area),
            Page::Review(page) => page.render(frame, area),
        }
    }

    /// Number of times `init` has run.
    pub fn activations(&self) -> usize {
        match self {
            Page::List(page) => page.activations(),
            Page::Review(page) => page.activations(),
        }
    }

    pub fn as_list(&self) -> Option<&ListPage> {
        match self {
            Page::List(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_review(&self) -> Option<&ReviewPage> {
        match self {
            Page::Review(page) => Some(page),
            _ => None,
        }
    }
}

impl From<ListPage> for Page {
    fn from(page: ListPage) -> Self {
        Page::List(page)
    }
}

impl From<ReviewPage> for Page {
    fn from(page: ReviewPage) -> Self {
        Page::Review(page)
    }
}
