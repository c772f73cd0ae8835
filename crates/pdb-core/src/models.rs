use serde::{Deserialize, Serialize};

/// One game harvested from a catalog page.
///
/// Serialized with the keys used by existing database files:
/// `appid`, `title`, `rating`, `reports`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Steam app id, taken from the game's link target.
    #[serde(rename = "appid")]
    pub identifier: String,
    pub title: String,
    /// Compatibility rating as shown by the catalog (e.g. "Platinum").
    pub rating: String,
    /// Number of reports as published.
    #[serde(rename = "reports")]
    pub report_count: String,
}
