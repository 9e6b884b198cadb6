pub mod config;
pub mod extract;
pub mod fetch;
pub mod merge;
pub mod output;
pub mod records;
pub mod stops;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::extract::{HttpPageSource, crawl_to_files};
use crate::fetch::BasicClient;
use crate::merge::{merge_files, table::MergedTable};
use crate::output::remove_stale;

/// Deletes the intermediate record files of a previous run.
pub fn clean_intermediates(config: &Config) {
    let stale = config.intermediate_paths().map(|path| path.as_path());
    remove_stale(&stale);
}

/// Crawls both transport modes over HTTP into the intermediate files.
pub async fn crawl(config: &Config) -> Result<()> {
    clean_intermediates(config);
    let source = HttpPageSource(BasicClient::new(&config.user_agent)?);
    crawl_to_files(&source, config).await
}

/// Full pipeline: crawl, then merge into the output table.
pub async fn run(config: &Config) -> Result<MergedTable> {
    crawl(config).await?;
    info!("Extraction finished, merging");
    merge_files(config)
}
