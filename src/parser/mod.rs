//! HTML extraction for listing and detail pages

pub mod detail;
pub mod listing;

use scraper::{ElementRef, Selector};

use crate::error::ParseError;

pub use detail::DetailParser;
pub use listing::ListingParser;

pub(crate) fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Text of an element with whitespace runs collapsed to single spaces.
///
/// Text nodes are concatenated before splitting, so inline markup inside a
/// word (`Köch<b>in</b>`) does not introduce a space.
pub(crate) fn squashed_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of several elements, joined with a single space; empty when there are none
pub(crate) fn joined_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .map(|el| squashed_text(&el))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
