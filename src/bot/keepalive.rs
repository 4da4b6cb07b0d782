//! Periodic self-ping so hosting platforms that idle quiet web services keep
//! the bot process alive.

use crate::error::Result;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Timeout for a single ping.
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Spawn a background task that pings `url` every `interval`.
pub fn spawn(url: String, interval: Duration) -> JoinHandle<()> {
    info!("Keep-alive enabled: pinging {} every {:?}", url, interval);

    tokio::spawn(async move {
        let client = match Client::builder().timeout(PING_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Keep-alive disabled, could not build HTTP client: {}", e);
                return;
            }
        };

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; wait a full interval before pinging.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match ping_once(&client, &url).await {
                Ok(status) => info!("Pinged server with response: {}", status),
                Err(e) if is_timeout(&e) => warn!("Couldn't connect to {}: timed out", url),
                Err(e) => warn!("Keep-alive ping to {} failed: {}", url, e),
            }
        }
    })
}

/// Issue a single `GET` and return the status code.
pub async fn ping_once(client: &Client, url: &str) -> Result<StatusCode> {
    let response = client.get(url).send().await?;
    Ok(response.status())
}

fn is_timeout(err: &crate::SubbotError) -> bool {
    matches!(err, crate::SubbotError::Http(e) if e.is_timeout())
}
