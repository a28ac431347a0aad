//! Scrapes the NORDSEE careers site into an XML vacancy feed

pub mod application;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod harvester;
pub mod models;
pub mod nordsee_feed;
pub mod parser;
pub mod traits;

pub use nordsee_feed::NordseeFeed;
