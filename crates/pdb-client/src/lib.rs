pub mod browser;
pub mod launch;

pub use browser::{ChromiumElement, ChromiumSession};
pub use launch::LaunchOptions;
