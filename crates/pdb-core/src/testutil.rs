//! Test utilities: an in-memory browser session and element tree.
//!
//! Handwritten mocks for the browser traits. Shared state lives behind
//! `Arc<Mutex<_>>` so tests can keep a clone of the browser and inspect what
//! the session did after it has been consumed.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::extract::{RATING_SUMMARY, REPORTS_EXPANDER, TITLE_SLICE};
use crate::session::{
    CELL_LAYOUT_BUTTON, DOCUMENT_ROOT, LAYOUT_SWITCHER, READY_MARKER, RECORD_CONTAINER,
};
use crate::traits::{BrowserSession, Key, PageElement};

// ---------------------------------------------------------------------------
// MockElement
// ---------------------------------------------------------------------------

/// Element with fixed text, attributes and one child per selector.
///
/// Clicks and key presses are appended to an event log shared with the
/// [`MockBrowser`] the element was found through.
#[derive(Clone, Default)]
pub struct MockElement {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<String, MockElement>,
    events: Arc<Mutex<Vec<String>>>,
}

impl MockElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, selector: &str, child: MockElement) -> Self {
        self.children.insert(selector.to_string(), child);
        self
    }

    fn attach(mut self, events: &Arc<Mutex<Vec<String>>>) -> Self {
        self.events = Arc::clone(events);
        self
    }
}

impl PageElement for MockElement {
    async fn find_element(&self, selector: &str) -> Result<Self, AppError> {
        self.children
            .get(selector)
            .cloned()
            .map(|child| child.attach(&self.events))
            .ok_or_else(|| AppError::ElementNotFound(selector.to_string()))
    }

    async fn text(&self) -> Result<String, AppError> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, AppError> {
        Ok(self.attributes.get(name).cloned())
    }

    async fn click(&self) -> Result<(), AppError> {
        self.events.lock().unwrap().push("click".to_string());
        Ok(())
    }

    async fn send_key(&self, key: Key) -> Result<(), AppError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("key:{}", key.name()));
        Ok(())
    }
}

/// A well-formed record container.
pub fn game_container(appid: &str, title: &str, rating: &str, reports: &str) -> MockElement {
    MockElement::new()
        .with_child(
            TITLE_SLICE,
            MockElement::new().with_child(
                "a",
                MockElement::new()
                    .with_text(title)
                    .with_attribute("href", &format!("https://www.protondb.com/app/{appid}")),
            ),
        )
        .with_child(RATING_SUMMARY, MockElement::new().with_text(rating))
        .with_child(
            REPORTS_EXPANDER,
            MockElement::new().with_child("span", MockElement::new().with_text(reports)),
        )
}

// ---------------------------------------------------------------------------
// MockBrowser
// ---------------------------------------------------------------------------

/// What the mock browser renders for one URL.
#[derive(Clone, Default)]
pub struct MockPage {
    /// Number of ready polls before the marker shows up; `None` = never.
    pub ready_after: Option<usize>,
    pub has_layout_switcher: bool,
    pub containers: Vec<MockElement>,
}

impl MockPage {
    /// Page that is ready on the first poll and offers the layout switcher.
    pub fn ready(containers: Vec<MockElement>) -> Self {
        Self {
            ready_after: Some(1),
            has_layout_switcher: true,
            containers,
        }
    }
}

/// Scripted browser session. Unknown URLs render as an empty page.
#[derive(Clone, Default)]
pub struct MockBrowser {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    panicking: Arc<Mutex<HashSet<String>>>,
    current: Arc<Mutex<Option<String>>>,
    polls: Arc<Mutex<usize>>,
    pub navigations: Arc<Mutex<Vec<String>>>,
    pub events: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<Mutex<bool>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, page: MockPage) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), page);
        self
    }

    /// Navigation to `url` fails with [`AppError::NavigationError`].
    pub fn with_failing_url(self, url: &str) -> Self {
        self.failing.lock().unwrap().insert(url.to_string());
        self
    }

    /// Navigation to `url` panics, standing in for a bug in the driver.
    pub fn with_panicking_url(self, url: &str) -> Self {
        self.panicking.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn count_events(&self, event: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == event)
            .count()
    }

    fn current_page(&self) -> MockPage {
        let current = self.current.lock().unwrap();
        current
            .as_ref()
            .and_then(|url| self.pages.lock().unwrap().get(url).cloned())
            .unwrap_or_default()
    }
}

impl BrowserSession for MockBrowser {
    type Element = MockElement;

    async fn navigate(&mut self, url: &str) -> Result<(), AppError> {
        self.navigations.lock().unwrap().push(url.to_string());
        if self.panicking.lock().unwrap().contains(url) {
            panic!("renderer crashed on {url}");
        }
        if self.failing.lock().unwrap().contains(url) {
            return Err(AppError::NavigationError(format!("connection reset: {url}")));
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        *self.polls.lock().unwrap() = 0;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<MockElement, AppError> {
        let page = self.current_page();
        let not_found = || AppError::ElementNotFound(selector.to_string());

        match selector {
            READY_MARKER => {
                let mut polls = self.polls.lock().unwrap();
                *polls += 1;
                match page.ready_after {
                    Some(n) if *polls >= n => Ok(MockElement::new().attach(&self.events)),
                    _ => Err(not_found()),
                }
            }
            LAYOUT_SWITCHER if page.has_layout_switcher => Ok(MockElement::new()
                .with_child(CELL_LAYOUT_BUTTON, MockElement::new())
                .attach(&self.events)),
            DOCUMENT_ROOT => Ok(MockElement::new().attach(&self.events)),
            _ => Err(not_found()),
        }
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<MockElement>, AppError> {
        if selector != RECORD_CONTAINER {
            return Ok(Vec::new());
        }
        Ok(self
            .current_page()
            .containers
            .into_iter()
            .map(|c| c.attach(&self.events))
            .collect())
    }

    async fn close(self) -> Result<(), AppError> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}
