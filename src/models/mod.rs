//! Data models for vacancies scraped from the NORDSEE careers site

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancySummary {
    pub url: String,
    /// Numeric id taken from the `-j<digits>.html` url suffix, `None` when absent
    pub identifier: Option<String>,
    pub title: String,
    pub location: String,
    pub position: String,
}

/// Text blocks extracted from a vacancy detail page.
///
/// Every block is an empty string when the page does not contain it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyDetail {
    pub introduction: String,
    pub short_description: String,
    pub details: String,
    pub conclusion: String,
}

impl VacancyDetail {
    /// Blocks concatenated in page order with no separator.
    ///
    /// Feed consumers depend on exactly this layout.
    pub fn description(&self) -> String {
        [
            self.introduction.as_str(),
            self.short_description.as_str(),
            self.details.as_str(),
            self.conclusion.as_str(),
        ]
        .concat()
    }
}

/// A listing row merged with its detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyRecord {
    pub url: String,
    pub identifier: Option<String>,
    pub title: String,
    pub location: String,
    pub position: String,
    pub description: String,
}

impl VacancyRecord {
    pub fn merge(summary: VacancySummary, detail: &VacancyDetail) -> Self {
        Self {
            url: summary.url,
            identifier: summary.identifier,
            title: summary.title,
            location: summary.location,
            position: summary.position,
            description: detail.description(),
        }
    }
}

/// Counters describing what a single run did and what it had to skip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pages_discovered: u32,
    pub pages_fetched: u32,
    pub pages_skipped: Vec<u32>,
    pub vacancies_discovered: usize,
    pub details_skipped: Vec<String>,
    pub records_written: usize,
    pub feed_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_discovered: 0,
            pages_fetched: 0,
            pages_skipped: Vec::new(),
            vacancies_discovered: 0,
            details_skipped: Vec::new(),
            records_written: 0,
            feed_path: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pages_skipped.is_empty() && self.details_skipped.is_empty()
    }
}
