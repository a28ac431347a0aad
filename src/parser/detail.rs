//! Vacancy detail page parsing

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{compile, joined_text};
use crate::error::ParseError;
use crate::models::VacancyDetail;
use crate::traits::SiteSelectors;

pub struct DetailParser {
    container: Selector,
    introduction: Selector,
    short_description: Selector,
    conclusion: Selector,
    divider: Selector,
    conclusion_class: String,
}

impl DetailParser {
    pub fn new(selectors: &SiteSelectors) -> Result<Self, ParseError> {
        Ok(Self {
            container: compile(&selectors.detail_container)?,
            introduction: compile(&selectors.introduction)?,
            short_description: compile(&selectors.short_description)?,
            conclusion: compile(&selectors.conclusion)?,
            divider: compile(&selectors.divider)?,
            conclusion_class: selectors.conclusion_class.clone(),
        })
    }

    /// Extracts the four description blocks. Missing blocks are empty strings.
    pub fn detail(&self, html: &str) -> VacancyDetail {
        let document = Html::parse_document(html);
        let containers: Vec<ElementRef<'_>> = document.select(&self.container).collect();

        let within = |selector: &Selector| {
            joined_text(containers.iter().flat_map(|container| container.select(selector)))
        };

        let detail = VacancyDetail {
            introduction: within(&self.introduction),
            short_description: within(&self.short_description),
            details: self.details(&document),
            conclusion: within(&self.conclusion),
        };

        if containers.is_empty() {
            debug!("Detail page has no content container");
        }
        detail
    }

    /// Every element following a divider, except the conclusion block.
    ///
    /// Anything the site appends after the divider ends up here as well.
    fn details(&self, document: &Html) -> String {
        let mut seen = HashSet::new();
        let siblings = document
            .select(&self.divider)
            .flat_map(|divider| divider.next_siblings().filter_map(ElementRef::wrap))
            .filter(|el| !el.value().classes().any(|class| class == self.conclusion_class))
            .filter(|el| seen.insert(el.id()));

        joined_text(siblings)
    }
}
