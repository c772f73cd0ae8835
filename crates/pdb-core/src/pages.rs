use crate::settings::Settings;

/// One catalog page to harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    /// Position in the run, starting at 0 regardless of `initpage`.
    pub index: usize,
    pub url: String,
}

/// Build the ordered list of page URLs for a run.
///
/// Page numbers start at `initpage`; the order of the returned targets is
/// the order records appear in the database.
pub fn build_page_targets(settings: &Settings) -> Vec<PageTarget> {
    let mut options = format!("&sort={}", settings.sort);
    if settings.native {
        options.push_str("&selectedFilters=includeNative");
    }

    (0..settings.maxpages)
        .enumerate()
        .map(|(index, offset)| PageTarget {
            index,
            url: format!(
                "{}?page={}{}",
                settings.source,
                u64::from(offset) + u64::from(settings.initpage),
                options
            ),
        })
        .collect()
}
