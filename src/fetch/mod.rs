//! HTTP fetching for the crawler.

mod basic;
mod client;
#[cfg(test)]
pub(crate) mod fake;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use reqwest::Url;
use tracing::debug;

/// A fetched HTML page and the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

/// Fetches `url` as text. Non-2xx responses are errors.
pub async fn fetch_page<C: HttpClient>(client: &C, url: &Url) -> Result<Page> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await?.error_for_status()?;
    let final_url = resp.url().clone();
    let body = resp.text().await?;
    debug!(url = %final_url, bytes = body.len(), "Page fetched");

    Ok(Page {
        url: final_url,
        body,
    })
}
