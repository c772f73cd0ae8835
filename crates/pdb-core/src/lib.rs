pub mod database;
pub mod error;
pub mod extract;
pub mod models;
pub mod pages;
pub mod session;
pub mod settings;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use database::{Database, Header, assemble, to_json_pretty, write_database};
pub use error::AppError;
pub use models::Record;
pub use pages::{PageTarget, build_page_targets};
pub use session::PageSession;
pub use settings::{Settings, SettingsOverrides, resolve};
pub use traits::{BrowserSession, Key, PageElement};
