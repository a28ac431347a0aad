//! Listing page parsing: page count and per-row vacancy summaries

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::{compile, squashed_text};
use crate::error::ParseError;
use crate::models::VacancySummary;
use crate::traits::SiteSelectors;

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*-j(\d+)\.html").expect("identifier pattern is valid")
});

/// Numeric vacancy id from a `...-j<digits>.html` url
pub fn identifier_from_url(url: &str) -> Option<String> {
    IDENTIFIER_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Absolute hrefs are kept exactly as the site lists them; only relative ones are joined
fn resolve_href(href: &str, base: Option<&Url>) -> String {
    let href = href.trim();
    match (Url::parse(href), base) {
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base
            .join(href)
            .map_or_else(|_| href.to_string(), |resolved| resolved.to_string()),
        _ => href.to_string(),
    }
}

pub struct ListingParser {
    pagination_item: Selector,
    pagination_link: Selector,
    row: Selector,
    row_link: Selector,
    row_location: Selector,
    row_position: Selector,
}

impl ListingParser {
    pub fn new(selectors: &SiteSelectors) -> Result<Self, ParseError> {
        Ok(Self {
            pagination_item: compile(&selectors.pagination_item)?,
            pagination_link: compile(&selectors.pagination_link)?,
            row: compile(&selectors.listing_row)?,
            row_link: compile(&selectors.row_link)?,
            row_location: compile(&selectors.row_location)?,
            row_position: compile(&selectors.row_position)?,
        })
    }

    /// Number of listing pages, read from the label of the last pagination entry
    pub fn page_count(&self, html: &str) -> Result<u32, ParseError> {
        let document = Html::parse_document(html);

        let last_item = document
            .select(&self.pagination_item)
            .last()
            .ok_or(ParseError::MissingPagination)?;
        let link = last_item
            .select(&self.pagination_link)
            .next()
            .ok_or(ParseError::MissingPagination)?;

        let label = squashed_text(&link);
        match label.parse::<u32>() {
            Ok(count) if count > 0 => {
                info!("Count of vacancy pages is {}", count);
                Ok(count)
            }
            _ => Err(ParseError::InvalidPageCount(label)),
        }
    }

    /// One summary per table row with a link, in page order.
    ///
    /// Relative links are resolved against `base_url`; absolute ones are kept verbatim.
    pub fn summaries(&self, html: &str, base_url: &str) -> Vec<VacancySummary> {
        let document = Html::parse_document(html);
        let base = Url::parse(base_url).ok();

        let mut summaries = Vec::new();
        for (index, row) in document.select(&self.row).enumerate() {
            let link = row.select(&self.row_link).next();
            let Some(href) = link.and_then(|a| a.value().attr("href")) else {
                warn!("Listing row {} has no vacancy link, skipping", index);
                continue;
            };

            let url = resolve_href(href, base.as_ref());

            let identifier = identifier_from_url(&url);
            if identifier.is_none() {
                info!("Can not get identifier from url {}", url);
            }

            let title = link.map(|a| squashed_text(&a)).unwrap_or_default();
            let location = row
                .select(&self.row_location)
                .next()
                .map(|el| squashed_text(&el))
                .unwrap_or_default();
            let position = row
                .select(&self.row_position)
                .next()
                .map(|el| squashed_text(&el))
                .unwrap_or_default();

            summaries.push(VacancySummary {
                url,
                identifier,
                title,
                location,
                position,
            });
        }

        debug!("Parsed {} vacancy rows", summaries.len());
        summaries
    }
}
