//! Station extractor: crawls the lines index of each transport mode, then every
//! line page, then every station page those link to.

pub mod pages;

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Url;
use tracing::{info, warn};

use crate::config::Config;
use crate::fetch::{HttpClient, Page, fetch_page};
use crate::output::write_records;
use crate::records::{ExtractedRecord, TransportMode};
use pages::{ModePatterns, parse_index_page, parse_line_page, parse_station_page};

/// Anything that can serve a page for a URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Page>;
}

/// [`PageSource`] backed by a live [`HttpClient`].
pub struct HttpPageSource<C>(pub C);

#[async_trait]
impl<C: HttpClient> PageSource for HttpPageSource<C> {
    async fn get(&self, url: &Url) -> Result<Page> {
        fetch_page(&self.0, url).await
    }
}

/// Fetch failures are logged and the page is skipped.
async fn fetch_or_skip<S: PageSource>(source: &S, url: &Url) -> Option<Page> {
    match source.get(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            warn!(url = %url, error = %e, "Page fetch failed, skipping");
            None
        }
    }
}

/// Keeps the URLs not requested before in this crawl, in order.
fn unseen(seen: &mut HashSet<Url>, urls: impl IntoIterator<Item = Url>) -> Vec<Url> {
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

/// Crawls one transport mode and returns its records: line records in index
/// order, followed by one accessibility record per station page.
#[tracing::instrument(skip(source, mode), fields(mode = mode.name()))]
pub async fn crawl_mode<S: PageSource>(
    source: &S,
    mode: TransportMode,
    base_url: &str,
    concurrency: usize,
) -> Result<Vec<ExtractedRecord>> {
    let concurrency = concurrency.max(1);
    let patterns = &ModePatterns::new(mode);
    let index_url = Url::parse(&mode.lines_index_url(base_url))
        .with_context(|| format!("invalid base URL {base_url}"))?;

    let mut seen = HashSet::from([index_url.clone()]);
    let Some(index) = fetch_or_skip(source, &index_url).await else {
        return Ok(Vec::new());
    };

    let line_urls = unseen(&mut seen, parse_index_page(&index, patterns));
    info!(lines = line_urls.len(), "Line pages discovered");

    let line_pages: Vec<_> = stream::iter(line_urls)
        .map(|url| async move {
            fetch_or_skip(source, &url)
                .await
                .map(|page| parse_line_page(&page, patterns))
        })
        .buffered(concurrency)
        .filter_map(|line_page| async move { line_page })
        .collect()
        .await;

    let mut records = Vec::new();
    let mut station_links = Vec::new();
    for line_page in line_pages {
        records.extend(line_page.record.map(ExtractedRecord::Line));
        station_links.extend(line_page.station_links);
    }
    let line_count = records.len();

    let station_urls = unseen(&mut seen, station_links);
    info!(stations = station_urls.len(), "Station pages discovered");

    let stations: Vec<_> = stream::iter(station_urls)
        .map(|url| async move {
            fetch_or_skip(source, &url)
                .await
                .map(|page| ExtractedRecord::Accessibility(parse_station_page(&page)))
        })
        .buffered(concurrency)
        .filter_map(|record| async move { record })
        .collect()
        .await;
    records.extend(stations);

    info!(
        line_records = line_count,
        accessibility_records = records.len() - line_count,
        "Crawl finished"
    );
    Ok(records)
}

/// Crawls every mode one after another and writes each mode's records to its
/// intermediate file.
pub async fn crawl_to_files<S: PageSource>(source: &S, config: &Config) -> Result<()> {
    for mode in TransportMode::ALL {
        let records = crawl_mode(source, mode, &config.base_url, config.concurrency).await?;
        write_records(config.records_path(mode), &records)?;
    }
    Ok(())
}
