//! Traits and selector layout shared by the fetch and parse stages

use async_trait::async_trait;

use crate::error::FetchError;

/// CSS selectors describing the careers site markup
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Pagination entries; the label of the last one is the page count
    pub pagination_item: String,
    /// Link inside a pagination entry
    pub pagination_link: String,
    /// Rows of the vacancy table
    pub listing_row: String,
    /// Column 1 link carrying both url and title
    pub row_link: String,
    pub row_location: String,
    pub row_position: String,
    /// Content frame of a detail page
    pub detail_container: String,
    pub introduction: String,
    pub short_description: String,
    pub conclusion: String,
    /// Divider after which the free-form detail text starts
    pub divider: String,
    /// Class (without the dot) excluded from the divider siblings
    pub conclusion_class: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            pagination_item: ".nav_item".to_string(),
            pagination_link: "a".to_string(),
            listing_row: "#joboffers tbody tr".to_string(),
            row_link: ".real_table_col1 a".to_string(),
            row_location: ".real_table_col2".to_string(),
            row_position: ".real_table_col4".to_string(),
            detail_container: ".emp_nr_innerframe".to_string(),
            introduction: ".einleitungstext".to_string(),
            short_description: ".mitteltext".to_string(),
            conclusion: ".abschluss".to_string(),
            divider: ".trenner".to_string(),
            conclusion_class: "abschluss".to_string(),
        }
    }
}

/// Anything that can hand back the body of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `url` with the given query parameters appended
    ///
    /// # Returns
    /// * `Result<String, FetchError>` - The page body or the failure that prevented it
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<String, FetchError>;
}
