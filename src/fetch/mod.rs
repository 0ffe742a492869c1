mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Result, bail};

/// Fetches a URL and returns the full response body, failing on non-2xx
/// status codes.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        bail!("request failed with status {}", status);
    }
    Ok(resp.bytes().await?.to_vec())
}
