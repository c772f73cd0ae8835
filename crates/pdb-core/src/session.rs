//! Page session driver.
//!
//! Walks one browser session through every [`PageTarget`] in order. Each page
//! goes through a small state machine:
//!
//! ```text
//! Requested → Loading → ReadyCheck → Scrolling → Extracting → Done
//!                            └──── (not ready) ───────┘
//! ```
//!
//! A page whose ready marker never shows up is still extracted from, so no
//! page is skipped. Pages are processed strictly one after another.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::sleep;

use crate::error::AppError;
use crate::extract::extract_record;
use crate::models::Record;
use crate::pages::PageTarget;
use crate::settings::Settings;
use crate::traits::{BrowserSession, Key, PageElement};

/// Shown once the catalog's game list has been mounted.
pub(crate) const READY_MARKER: &str = r#"div[class*="GameLayout__Container"]"#;
/// Layout buttons in the upper right of the catalog.
pub(crate) const LAYOUT_SWITCHER: &str = r#"div[class*="Explore__EndJustified"]"#;
/// Icon path of the "cell" layout button (the "card" layout starts with `M4 `).
pub(crate) const CELL_LAYOUT_BUTTON: &str = r#"path[d^="M3 "]"#;
pub(crate) const DOCUMENT_ROOT: &str = "html";
/// One game entry in cell layout.
pub(crate) const RECORD_CONTAINER: &str = r#"div[class*="GameCell__Container-"]"#;

/// Fixed delay after every navigation.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Ready polls per page before extracting anyway.
pub const READY_ATTEMPTS: usize = 5;

/// Per-page progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Requested,
    Loading,
    ReadyCheck,
    Scrolling,
    Extracting,
    Done,
}

/// Timing and behavior knobs taken from [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    pub wait: Duration,
    pub pagedown: u32,
    pub ready_attempts: usize,
    /// Skip the extra settle wait, layout selection and scrolling.
    pub fast: bool,
}

impl Pacing {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            wait: settings.wait_duration(),
            pagedown: settings.pagedown,
            ready_attempts: READY_ATTEMPTS,
            fast: settings.fast,
        }
    }

    fn settle_delay(&self) -> Duration {
        if self.fast {
            SETTLE_DELAY
        } else {
            SETTLE_DELAY + self.wait
        }
    }
}

/// Owns one browser session for the whole run.
pub struct PageSession<B: BrowserSession> {
    browser: B,
    pacing: Pacing,
}

impl<B: BrowserSession> PageSession<B> {
    pub fn new(browser: B, settings: &Settings) -> Self {
        Self::with_pacing(browser, Pacing::from_settings(settings))
    }

    pub fn with_pacing(browser: B, pacing: Pacing) -> Self {
        Self { browser, pacing }
    }

    /// Harvest every target in order, then close the browser.
    ///
    /// The browser is closed whether harvesting succeeded, returned an error
    /// or panicked. A panic is re-raised once the browser has been closed. A
    /// failure to close after a successful harvest is logged and the records
    /// are still returned.
    pub async fn run(mut self, targets: &[PageTarget]) -> Result<Vec<Record>, AppError> {
        let result = match AssertUnwindSafe(self.harvest(targets)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                tracing::error!("Scraping panicked, closing browser");
                if let Err(e) = self.browser.close().await {
                    tracing::warn!("Failed to close browser: {e}");
                }
                std::panic::resume_unwind(panic);
            }
        };

        match (result, self.browser.close().await) {
            (Ok(records), Ok(())) => Ok(records),
            (Ok(records), Err(e)) => {
                tracing::warn!("Failed to close browser: {e}");
                Ok(records)
            }
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!("Failed to close browser: {close_err}");
                }
                Err(e)
            }
        }
    }

    async fn harvest(&mut self, targets: &[PageTarget]) -> Result<Vec<Record>, AppError> {
        let mut records = Vec::new();
        for target in targets {
            tracing::info!(page = target.index, "Loading {}", target.url);
            let page_records = self.harvest_page(target).await?;
            tracing::info!(
                page = target.index,
                "Extracted {} games ({} total)",
                page_records.len(),
                records.len() + page_records.len()
            );
            records.extend(page_records);
        }
        Ok(records)
    }

    async fn harvest_page(&mut self, target: &PageTarget) -> Result<Vec<Record>, AppError> {
        let mut state = PageState::Requested;
        let mut records = Vec::new();

        loop {
            tracing::debug!(page = target.index, ?state, "Page state");
            state = match state {
                PageState::Requested => {
                    self.browser.navigate(&target.url).await?;
                    PageState::Loading
                }
                PageState::Loading => {
                    sleep(self.pacing.settle_delay()).await;
                    PageState::ReadyCheck
                }
                PageState::ReadyCheck => {
                    if !self.wait_until_ready().await? {
                        tracing::warn!(
                            page = target.index,
                            "Page not ready after {} attempts, extracting what is rendered",
                            self.pacing.ready_attempts
                        );
                        PageState::Extracting
                    } else if self.pacing.fast {
                        PageState::Extracting
                    } else {
                        PageState::Scrolling
                    }
                }
                PageState::Scrolling => {
                    self.select_cell_layout().await?;
                    self.scroll_down().await?;
                    PageState::Extracting
                }
                PageState::Extracting => {
                    records = self.extract_all().await.inspect_err(|e| {
                        tracing::error!(page = target.index, "Extraction failed: {e}");
                    })?;
                    PageState::Done
                }
                PageState::Done => return Ok(records),
            };
        }
    }

    /// Poll for the ready marker. `Ok(false)` when every attempt came up empty.
    async fn wait_until_ready(&self) -> Result<bool, AppError> {
        for attempt in 1..=self.pacing.ready_attempts {
            sleep(self.pacing.wait).await;
            match self.browser.find_element(READY_MARKER).await {
                Ok(_) => return Ok(true),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(attempt, "Ready marker not rendered yet");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Switch the catalog to cell layout, which [`RECORD_CONTAINER`] matches.
    async fn select_cell_layout(&self) -> Result<(), AppError> {
        let button = match self.browser.find_element(LAYOUT_SWITCHER).await {
            Ok(layout) => layout.find_element(CELL_LAYOUT_BUTTON).await,
            Err(e) => Err(e),
        };

        match button {
            Ok(button) => {
                button.click().await?;
                sleep(self.pacing.wait).await;
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("Layout switcher not found, keeping current layout");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Press PageDown repeatedly so lazily loaded entries get rendered.
    async fn scroll_down(&self) -> Result<(), AppError> {
        let root = self.browser.find_element(DOCUMENT_ROOT).await?;
        for _ in 0..self.pacing.pagedown {
            root.send_key(Key::PageDown).await?;
            sleep(self.pacing.wait).await;
        }
        Ok(())
    }

    async fn extract_all(&self) -> Result<Vec<Record>, AppError> {
        let containers = self.browser.find_elements(RECORD_CONTAINER).await?;
        let mut records = Vec::with_capacity(containers.len());
        for container in &containers {
            records.push(extract_record(container).await?);
        }
        Ok(records)
    }
}
