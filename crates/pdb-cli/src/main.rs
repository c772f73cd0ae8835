use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use pdb_client::{ChromiumSession, LaunchOptions};
use pdb_core::settings::SORT_KEYS;
use pdb_core::{
    PageSession, Settings, SettingsOverrides, assemble, build_page_targets, resolve,
    to_json_pretty, write_database,
};

/// Scrape data from the ProtonDB explore pages and save the results to a
/// JSON database file.
///
/// Settings are taken from built-in defaults, then the config file, then the
/// flags given here, then the --test and --fast presets.
#[derive(Parser)]
#[command(name = "pdbscraper", version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Read additional settings from a JSON file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database file to create [default: protondb-{sort}-{date}.json]
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Chromium / Chrome executable
    #[arg(long, value_name = "FILE", env = "PDB_DRIVER")]
    driver: Option<String>,

    /// Launch the browser with lean settings (no images, no web fonts)
    #[arg(short = 'z', long)]
    optimize: bool,

    /// Catalog page to scrape
    #[arg(short = 'u', long, value_name = "URL")]
    source: Option<String>,

    /// Sort order of the catalog
    #[arg(short, long, value_name = "TYPE", value_parser = SORT_KEYS)]
    sort: Option<String>,

    /// Include Linux-native games
    #[arg(short, long)]
    native: bool,

    /// Number of pages to scrape (50 games per page)
    #[arg(short, long, value_name = "NUM")]
    maxpages: Option<u32>,

    /// First page number to scrape, starting at 0
    #[arg(short, long, value_name = "NUM")]
    initpage: Option<u32>,

    /// PageDown presses per page so every game gets rendered
    #[arg(short = 'd', long, value_name = "NUM")]
    pagedown: Option<u32>,

    /// Seconds to wait before processing a page and after each PageDown
    #[arg(short, long, value_name = "SECONDS")]
    wait: Option<f64>,

    /// Print the resolved settings as JSON before scraping
    #[arg(short, long)]
    printconfig: bool,

    /// Preset: 2 pages, wait 1 s, print settings, write no file
    #[arg(long)]
    test: bool,

    /// Preset: optimized browser and wait 0.1 s, skipping extra checks
    #[arg(long)]
    fast: bool,
}

impl Cli {
    /// Flags that were not passed stay unset so they never mask the config file.
    fn into_overrides(self) -> SettingsOverrides {
        SettingsOverrides {
            config: self.config,
            output: self.output,
            driver: self.driver,
            optimize: self.optimize.then_some(true),
            source: self.source,
            sort: self.sort,
            native: self.native.then_some(true),
            maxpages: self.maxpages,
            initpage: self.initpage,
            pagedown: self.pagedown,
            wait: self.wait,
            printconfig: self.printconfig.then_some(true),
            test: self.test.then_some(true),
            fast: self.fast.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Progress logs go to stderr. Warnings and errors share stdout with
    // --printconfig output and the summary line.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pdb=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr.with_min_level(Level::INFO).or_else(std::io::stdout))
        .init();

    let cli = Cli::parse();
    let settings = resolve(&cli.into_overrides()).context("Failed to resolve settings")?;

    if settings.printconfig {
        println!("{}", to_json_pretty(&settings)?);
    }

    let (count, path) = cmd_scrape(&settings).await?;

    println!(
        "{count} games processed in: {}",
        path.map(|p| p.display().to_string()).unwrap_or_default()
    );

    Ok(())
}

/// Harvest every page, then write the database unless in test mode.
async fn cmd_scrape(settings: &Settings) -> Result<(usize, Option<PathBuf>)> {
    let targets = build_page_targets(settings);
    tracing::info!("Scraping {} pages", targets.len());

    let records = if targets.is_empty() {
        Vec::new()
    } else {
        let browser = ChromiumSession::launch(&LaunchOptions::from_settings(settings))
            .await
            .context("Failed to start browser")?;

        PageSession::new(browser, settings)
            .run(&targets)
            .await
            .context("Scraping aborted")?
    };

    let database = assemble(records, settings, None)?;
    let path = if settings.test {
        None
    } else {
        write_database(&database, settings.output.as_deref())
    };

    Ok((database.record_count(), path))
}
