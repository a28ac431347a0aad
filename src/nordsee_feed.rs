use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::FeedConfig;
use crate::feed::FeedWriter;
use crate::fetcher::PageFetcher;
use crate::harvester::Harvester;
use crate::models::RunSummary;
use crate::parser::{DetailParser, ListingParser};
use crate::traits::{PageSource, SiteSelectors};

/// One full scrape of the careers site followed by a fresh feed file
pub struct NordseeFeed<S = PageFetcher> {
    harvester: Harvester<S>,
    writer: FeedWriter,
}

impl NordseeFeed<PageFetcher> {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let fetcher = PageFetcher::new(config.fetch.clone())?;
        Self::with_source(fetcher, config)
    }
}

impl<S: PageSource> NordseeFeed<S> {
    pub fn with_source(source: S, config: &FeedConfig) -> Result<Self> {
        let selectors = SiteSelectors::default();
        let harvester = Harvester::new(
            source,
            ListingParser::new(&selectors)?,
            DetailParser::new(&selectors)?,
            config.listing_url.clone(),
            config.page_size,
            config.detail_concurrency,
        );

        Ok(Self {
            harvester,
            writer: FeedWriter::new(config.output_dir.clone()),
        })
    }

    /// Scrapes everything and replaces the feed.
    ///
    /// When the page count cannot be determined nothing is written.
    pub async fn refresh(&self) -> Result<RunSummary> {
        let harvest = self.harvester.run().await?;
        let mut summary = harvest.summary;

        let path = self.writer.write(&harvest.records).await?;
        summary.records_written = harvest.records.len();
        summary.feed_path = Some(path);
        summary.finished_at = Some(Utc::now());

        if summary.is_complete() {
            info!(
                "Feed complete: {} vacancies from {} pages",
                summary.records_written, summary.pages_fetched
            );
        } else {
            warn!(
                "Feed written with gaps: {} listing pages skipped {:?}, {} descriptions missing",
                summary.pages_skipped.len(),
                summary.pages_skipped,
                summary.details_skipped.len()
            );
        }

        if let Err(e) = self.writer.write_summary(&summary).await {
            warn!("Could not store run summary: {}", e);
        }

        Ok(summary)
    }
}
