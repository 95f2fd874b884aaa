use ratatui::{Frame, layout::Margin};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

use super::event::{Action, Event, PageId};
use super::pages::Page;
use crate::config::Chrome;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("no page registered for `{0}`")]
    UnknownPage(PageId),
}

pub type Result<T> = std::result::Result<T, RouterError>;

/// Root controller: owns every page, tracks the active one and the terminal
/// size, and intercepts quit, resize and page changes.
pub struct Router {
    chrome: Chrome,
    pages: BTreeMap<PageId, Page>,
    active: PageId,
    width: u16,
    height: u16,
    pending: VecDeque<Action>,
    should_quit: bool,
}

impl Router {
    /// Build a router over `pages` and activate `start`.
    pub fn new(
        chrome: Chrome,
        pages: impl IntoIterator<Item = Page>,
        start: PageId,
    ) -> Result<Self> {
        let pages = pages.into_iter().map(|p| (p.id(), p)).collect();
        let mut router = Self {
            chrome,
            pages,
            active: start,
            width: 0,
            height: 0,
            pending: VecDeque::new(),
            should_quit: false,
        };
        router.activate(start)?;
        Ok(router)
    }

    pub fn active(&self) -> PageId {
        self.active
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }

    /// Actions queued by pages and not yet run.
    pub fn pending(&self) -> &VecDeque<Action> {
        &self.pending
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Last terminal size seen, before margins.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Process one event.
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        if event.is_quit() {
            tracing::debug!(page = %self.active, "quit requested");
            self.should_quit = true;
            self.pending.clear();
            return Ok(());
        }

        match event {
            Event::ChangePage(id) => self.activate(id),
            Event::Resize { width, height } => {
                self.width = width;
                self.height = height;
                let (w, h) = self.chrome.content_size(width, height);
                if let Some(page) = self.pages.get_mut(&self.active) {
                    page.set_size(w, h);
                }
                Ok(())
            }
            Event::Key(key) => {
                if let Some(page) = self.pages.get_mut(&self.active) {
                    let actions = page.handle_key(key);
                    self.pending.extend(actions);
                }
                Ok(())
            }
        }
    }

    /// Run queued actions in order until none remain.
    pub fn drain(&mut self) -> Result<()> {
        while let Some(action) = self.pending.pop_front() {
            if self.should_quit {
                break;
            }
            self.dispatch(action.into())?;
        }
        Ok(())
    }

    fn activate(&mut self, id: PageId) -> Result<()> {
        let (w, h) = self.chrome.content_size(self.width, self.height);
        let page = self.pages.get_mut(&id).ok_or(RouterError::UnknownPage(id))?;
        tracing::info!(from = %self.active, to = %id, "changing page");
        self.active = id;
        page.init();
        page.set_size(w, h);
        Ok(())
    }

    /// Draw the active page inside the outer margin.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area().inner(Margin::new(
            self.chrome.margin_horizontal,
            self.chrome.margin_vertical,
        ));
        if let Some(page) = self.pages.get_mut(&self.active) {
            page.render(frame, area);
        }
    }
}
