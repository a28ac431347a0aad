//! Run configuration loaded from the environment (and `.env` via dotenvy)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_LISTING_URL: &str = "https://karriere.nordsee.com/de/stellenangebote.html";
pub const FEED_FILENAME: &str = "nordsee.xml";
pub const SUMMARY_FILENAME: &str = "nordsee.summary.json";
pub const PAGE_SIZE: u32 = 20;

/// Browser strings the fetcher picks from for every request
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// HTTP policy handed to the page fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    /// Pool of browser user agents, one is picked per request
    pub user_agents: Vec<String>,
    /// Appended to the chosen user agent so the site can identify us
    pub user_agent_suffix: String,
    /// The careers site serves a certificate chain that fails verification
    pub verify_tls: bool,
    /// Extra attempts after the first failed one
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            user_agents: USER_AGENTS.iter().map(|ua| (*ua).to_string()).collect(),
            user_agent_suffix: "JobUFO GmbH".to_string(),
            verify_tls: false,
            retries: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub listing_url: String,
    pub output_dir: PathBuf,
    pub page_size: u32,
    pub detail_concurrency: usize,
    /// Cron expression; `None` means a single run
    pub schedule: Option<String>,
    pub fetch: FetchConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            output_dir: PathBuf::from("parsed_xml"),
            page_size: PAGE_SIZE,
            detail_concurrency: 4,
            schedule: None,
            fetch: FetchConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Builds the configuration from `NORDSEE_*` environment variables.
    ///
    /// Unset variables keep their defaults; malformed ones are an error
    /// naming the variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("NORDSEE_LISTING_URL") {
            config.listing_url = url;
        }
        if let Some(dir) = lookup("NORDSEE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "NORDSEE_TIMEOUT_SECS")? {
            config.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(suffix) = lookup("NORDSEE_UA_SUFFIX") {
            config.fetch.user_agent_suffix = suffix;
        }
        if let Some(verify) = parse_var::<bool>(&lookup, "NORDSEE_VERIFY_TLS")? {
            config.fetch.verify_tls = verify;
        }
        if let Some(retries) = parse_var::<u32>(&lookup, "NORDSEE_RETRIES")? {
            config.fetch.retries = retries;
        }
        if let Some(limit) = parse_var::<usize>(&lookup, "NORDSEE_DETAIL_CONCURRENCY")? {
            anyhow::ensure!(limit > 0, "NORDSEE_DETAIL_CONCURRENCY must be at least 1");
            config.detail_concurrency = limit;
        }
        config.schedule = lookup("NORDSEE_SCHEDULE").filter(|s| !s.trim().is_empty());

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: `{raw}`"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<FeedConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        FeedConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_match_site_policy() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.fetch.timeout, Duration::from_secs(60));
        assert_eq!(config.fetch.user_agent_suffix, "JobUFO GmbH");
        assert!(!config.fetch.verify_tls);
        assert_eq!(config.fetch.retries, 1);
        assert!(config.schedule.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("NORDSEE_OUTPUT_DIR", "/tmp/feeds"),
            ("NORDSEE_TIMEOUT_SECS", "5"),
            ("NORDSEE_VERIFY_TLS", "true"),
            ("NORDSEE_DETAIL_CONCURRENCY", "2"),
            ("NORDSEE_SCHEDULE", "0 0 */6 * * *"),
        ])
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/feeds"));
        assert_eq!(config.fetch.timeout, Duration::from_secs(5));
        assert!(config.fetch.verify_tls);
        assert_eq!(config.detail_concurrency, 2);
        assert_eq!(config.schedule.as_deref(), Some("0 0 */6 * * *"));
    }

    #[test]
    fn test_malformed_value_names_the_variable() {
        let err = config_from(&[("NORDSEE_RETRIES", "many")]).unwrap_err();
        assert!(err.to_string().contains("NORDSEE_RETRIES"));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        assert!(config_from(&[("NORDSEE_DETAIL_CONCURRENCY", "0")]).is_err());
    }
}
