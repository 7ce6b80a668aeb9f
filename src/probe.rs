use crate::types::{Site, SiteResult, SiteStatus};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{redirect, Client};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Per-probe timeout. A site that has not answered within this window is DOWN.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Failures that resolve at or under this many milliseconds report no latency:
/// they never made a meaningful network attempt (bad DNS, pre-flight rejects).
pub const FAILURE_NOISE_FLOOR_MS: u64 = 100;

// Institutional sites routinely reject requests without browser-looking
// headers, so the probe presents as a desktop browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Build the HTTP client shared by all probes of one scan.
///
/// The timeout covers the whole request including redirects, so a single
/// probe can never outlive it.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(redirect::Policy::limited(10))
        .default_headers(headers)
        .build()
}

/// Issue one GET against a site and classify the outcome.
///
/// Any received HTTP response is UP, error statuses included: UP means "the
/// server answered", not "the server is healthy". Only transport-level
/// failures (timeout, DNS, TLS, reset) are DOWN. Never fails; one attempt,
/// one outcome.
pub async fn check_site(client: &Client, site: &Site) -> SiteResult {
    let start = Instant::now();
    match client.get(&site.url).send().await {
        Ok(response) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            SiteResult {
                name: site.name.clone(),
                url: site.url.clone(),
                status: SiteStatus::Up,
                status_code: Some(response.status().as_u16()),
                response_time: Some(elapsed_ms),
            }
        }
        Err(err) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            debug!(site = %site.name, error = %err, "probe failed");
            SiteResult {
                name: site.name.clone(),
                url: site.url.clone(),
                status: SiteStatus::Down,
                status_code: None,
                response_time: (elapsed_ms > FAILURE_NOISE_FLOOR_MS).then_some(elapsed_ms),
            }
        }
    }
}
