use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use pdb_core::error::AppError;
use pdb_core::traits::{BrowserSession, Key, PageElement};
use tokio::task::JoinHandle;

use crate::launch::LaunchOptions;

/// Headless Chromium session driven over the Chrome DevTools Protocol.
///
/// One browser process with a single tab lives as long as the session.
/// [`BrowserSession::close`] shuts the process down.
///
/// # Example
///
/// ```rust,no_run
/// use pdb_client::{ChromiumSession, LaunchOptions};
/// use pdb_core::traits::BrowserSession;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = ChromiumSession::launch(&LaunchOptions::default()).await?;
/// session.navigate("https://www.protondb.com/explore").await?;
/// let games = session.find_elements(r#"div[class*="GameCell__Container-"]"#).await?;
/// println!("{} games rendered", games.len());
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    /// Launch the browser and open a blank tab.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .disable_default_args()
            .request_timeout(options.request_timeout);

        if let Some(bin) = &options.executable {
            tracing::info!("Using browser binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }
        for arg in options.args() {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to open tab: {e}")))?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

impl BrowserSession for ChromiumSession {
    type Element = ChromiumElement;

    async fn navigate(&mut self, url: &str) -> Result<(), AppError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::NavigationError(format!("Failed to navigate to {url}: {e}")))?;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<ChromiumElement, AppError> {
        self.find_elements(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ElementNotFound(selector.to_string()))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ChromiumElement>, AppError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| AppError::BrowserError(format!("Query '{selector}' failed: {e}")))?;
        Ok(elements
            .into_iter()
            .map(|element| ChromiumElement {
                element,
                page: self.page.clone(),
            })
            .collect())
    }

    async fn close(mut self) -> Result<(), AppError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| AppError::BrowserError(format!("Failed to close browser: {e}")));
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Browser process did not exit cleanly: {e}");
        }
        self.handler.abort();
        closed
    }
}

/// One element of the session's tab.
pub struct ChromiumElement {
    element: Element,
    page: Page,
}

impl PageElement for ChromiumElement {
    async fn find_element(&self, selector: &str) -> Result<Self, AppError> {
        let element = self
            .element
            .find_elements(selector)
            .await
            .map_err(|e| AppError::BrowserError(format!("Query '{selector}' failed: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ElementNotFound(selector.to_string()))?;
        Ok(Self {
            element,
            page: self.page.clone(),
        })
    }

    async fn text(&self) -> Result<String, AppError> {
        let text = self
            .element
            .inner_text()
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to read text: {e}")))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, AppError> {
        self.element
            .attribute(name)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to read '{name}': {e}")))
    }

    async fn click(&self) -> Result<(), AppError> {
        self.element
            .click()
            .await
            .map_err(|e| AppError::BrowserError(format!("Click failed: {e}")))?;
        Ok(())
    }

    /// Dispatched to the tab, which routes it to the focused part of the
    /// document. The root element cannot take focus itself.
    async fn send_key(&self, key: Key) -> Result<(), AppError> {
        for event_type in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let params = key_event(key, event_type)?;
            self.page
                .execute(params)
                .await
                .map_err(|e| AppError::BrowserError(format!("Key {} failed: {e}", key.name())))?;
        }
        Ok(())
    }
}

fn key_event(key: Key, event_type: DispatchKeyEventType) -> Result<DispatchKeyEventParams, AppError> {
    let code = match key {
        Key::PageDown => 34,
    };
    DispatchKeyEventParams::builder()
        .r#type(event_type)
        .key(key.name())
        .code(key.name())
        .windows_virtual_key_code(code)
        .native_virtual_key_code(code)
        .build()
        .map_err(|e| AppError::BrowserError(format!("Invalid key event: {e}")))
}
