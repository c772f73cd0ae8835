use std::future::Future;

use crate::error::AppError;

/// Keyboard keys the session sends to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    PageDown,
}

impl Key {
    /// DOM `KeyboardEvent.key` name.
    pub fn name(self) -> &'static str {
        match self {
            Key::PageDown => "PageDown",
        }
    }
}

/// A handle to one element of the rendered document.
pub trait PageElement: Sized + Send + Sync {
    /// First descendant matching a CSS selector.
    ///
    /// Returns [`AppError::ElementNotFound`] when nothing matches.
    fn find_element(&self, selector: &str) -> impl Future<Output = Result<Self, AppError>> + Send;

    /// Rendered text of the element.
    fn text(&self) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Value of an attribute, `None` if the element does not carry it.
    fn attribute(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    fn click(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    fn send_key(&self, key: Key) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// One live browser session, driven page by page.
///
/// The session is opened by the implementation's constructor and released by
/// [`close`](Self::close), which consumes it.
pub trait BrowserSession: Send {
    type Element: PageElement;

    /// Load a URL in the session's tab.
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// First element of the current document matching a CSS selector.
    ///
    /// Returns [`AppError::ElementNotFound`] when nothing matches, so callers
    /// can tell "not rendered yet" apart from a broken session.
    fn find_element(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Self::Element, AppError>> + Send;

    /// Every element of the current document matching a CSS selector, in
    /// document order.
    fn find_elements(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Self::Element>, AppError>> + Send;

    /// Tear the session down.
    fn close(self) -> impl Future<Output = Result<(), AppError>> + Send;
}
