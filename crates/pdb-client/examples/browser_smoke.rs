/// Smoke-test for `ChromiumSession`.
///
/// Launches a headless Chromium, loads the first catalog page, and prints
/// the number of game entries rendered without scrolling.
///
/// Run with:
///   cargo run -p pdb-client --example browser_smoke
use pdb_client::{ChromiumSession, LaunchOptions};
use pdb_core::traits::BrowserSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Launching headless browser…");
    let mut session = ChromiumSession::launch(&LaunchOptions::default()).await?;

    let url = "https://www.protondb.com/explore?page=0&sort=wilsonRating";
    println!("Loading {url} …");
    session.navigate(url).await?;
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let games = session
        .find_elements(r#"div[class*="GameCell__Container-"]"#)
        .await?;
    println!("OK — {} game entries rendered", games.len());

    session.close().await?;
    Ok(())
}
