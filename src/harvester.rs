//! Pagination driver: listing pages, then one detail page per discovered vacancy

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::FeedError;
use crate::models::{RunSummary, VacancyDetail, VacancyRecord, VacancySummary};
use crate::parser::{DetailParser, ListingParser};
use crate::traits::PageSource;

/// Records produced by one run plus what had to be skipped on the way
#[derive(Debug)]
pub struct Harvest {
    pub records: Vec<VacancyRecord>,
    pub summary: RunSummary,
}

pub struct Harvester<S> {
    source: S,
    listing: ListingParser,
    detail: DetailParser,
    listing_url: String,
    page_size: u32,
    detail_concurrency: usize,
}

impl<S: PageSource> Harvester<S> {
    pub fn new(
        source: S,
        listing: ListingParser,
        detail: DetailParser,
        listing_url: impl Into<String>,
        page_size: u32,
        detail_concurrency: usize,
    ) -> Self {
        Self {
            source,
            listing,
            detail,
            listing_url: listing_url.into(),
            page_size,
            detail_concurrency: detail_concurrency.max(1),
        }
    }

    /// Walks every listing page and every vacancy detail page.
    ///
    /// Only the initial page-count lookup can fail the run; a bad listing page
    /// is skipped and a bad detail page leaves an empty description.
    pub async fn run(&self) -> Result<Harvest, FeedError> {
        let mut summary = RunSummary::start();

        let first_page = self.source.fetch(&self.listing_url, &[]).await?;
        let page_count = self.listing.page_count(&first_page)?;
        summary.pages_discovered = page_count;

        let summaries = self.collect_summaries(page_count, &mut summary).await;
        summary.vacancies_discovered = summaries.len();
        info!(
            "Discovered {} vacancies on {}/{} listing pages",
            summaries.len(),
            summary.pages_fetched,
            page_count
        );

        let records = self.collect_records(summaries, &mut summary).await;

        Ok(Harvest { records, summary })
    }

    async fn collect_summaries(&self, page_count: u32, summary: &mut RunSummary) -> Vec<VacancySummary> {
        let mut summaries = Vec::new();

        for page in 0..page_count {
            let Some(start) = page.checked_mul(self.page_size) else {
                warn!("Skipping listing page {}: offset exceeds u32 range", page);
                summary.pages_skipped.push(page);
                continue;
            };
            let params = [("start", start.to_string())];

            match self.source.fetch(&self.listing_url, &params).await {
                Ok(html) => {
                    let rows = self.listing.summaries(&html, &self.listing_url);
                    if rows.is_empty() {
                        warn!("Listing page {} contained no vacancies", page);
                    }
                    summary.pages_fetched += 1;
                    summaries.extend(rows);
                }
                Err(e) => {
                    warn!("Skipping listing page {}: {}", page, e);
                    summary.pages_skipped.push(page);
                }
            }
        }

        summaries
    }

    /// Detail pages are fetched concurrently up to the configured limit;
    /// `buffered` yields them back in discovery order.
    async fn collect_records(
        &self,
        summaries: Vec<VacancySummary>,
        summary: &mut RunSummary,
    ) -> Vec<VacancyRecord> {
        let fetched: Vec<_> = stream::iter(summaries)
            .map(|vacancy| async move {
                let page = self.source.fetch(&vacancy.url, &[]).await;
                (vacancy, page)
            })
            .buffered(self.detail_concurrency)
            .collect()
            .await;

        fetched
            .into_iter()
            .map(|(vacancy, page)| {
                let detail = match page {
                    Ok(html) => self.detail.detail(&html),
                    Err(e) => {
                        warn!("No description for {}: {}", vacancy.url, e);
                        summary.details_skipped.push(vacancy.url.clone());
                        VacancyDetail::default()
                    }
                };
                VacancyRecord::merge(vacancy, &detail)
            })
            .collect()
    }
}
