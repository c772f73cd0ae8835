use std::path::{Path, PathBuf};
use std::time::Duration;

use pdb_core::Settings;

/// Extra Chromium flags used when `optimize` is set: skip images, web fonts
/// and background services so catalog pages render faster.
const OPTIMIZE_ARGS: &[&str] = &[
    "--blink-settings=imagesEnabled=false",
    "--disable-remote-fonts",
    "--disable-background-networking",
    "--disable-component-update",
    "--disable-sync",
    "--disable-default-apps",
    "--no-default-browser-check",
    "--disk-cache-size=67108864",
];

/// Checked in order when the configured `driver` does not exist. The snap
/// entry is the browser itself; `/snap/bin/chromium` is a wrapper that drops
/// the headless flags.
const FALLBACK_DRIVERS: &[&str] = &[
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/snap/chromium/current/usr/lib/chromium-browser/chrome",
    "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
];

/// How to start the browser for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    /// Browser binary; `None` lets the launcher search for one.
    pub executable: Option<PathBuf>,
    pub optimize: bool,
    /// Timeout for a single DevTools request.
    pub request_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            executable: None,
            optimize: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl LaunchOptions {
    /// Launch options for the resolved settings.
    ///
    /// `settings.driver` is used when it exists. Otherwise `CHROME_BIN` and
    /// then common install locations are tried. If none of them exists the
    /// executable is left to `chromiumoxide`'s own lookup.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            executable: resolve_driver(Path::new(&settings.driver)),
            optimize: settings.optimize,
            ..Self::default()
        }
    }

    /// Command-line flags passed to the browser.
    pub fn args(&self) -> Vec<&'static str> {
        let mut args = vec![
            "--headless=new",
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--disable-extensions",
            "--disable-popup-blocking",
            "--disable-translate",
            "--no-first-run",
        ];
        if self.optimize {
            args.extend_from_slice(OPTIMIZE_ARGS);
        }
        args
    }
}

fn resolve_driver(driver: &Path) -> Option<PathBuf> {
    if driver.exists() {
        return Some(driver.to_path_buf());
    }

    let found = std::env::var_os("CHROME_BIN")
        .map(PathBuf::from)
        .into_iter()
        .chain(FALLBACK_DRIVERS.iter().map(PathBuf::from))
        .find(|candidate| candidate.exists());

    match &found {
        Some(path) => tracing::warn!(
            "Browser not found at {}, using {}",
            driver.display(),
            path.display()
        ),
        None => tracing::warn!(
            "Browser not found at {}, letting the launcher search for one",
            driver.display()
        ),
    }
    found
}
