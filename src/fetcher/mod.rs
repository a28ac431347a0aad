use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::traits::PageSource;

/// HTTP fetcher applying the site's timeout, user agent and TLS policy
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, config })
    }

    /// A random pool entry followed by the fixed suffix
    fn user_agent(&self) -> String {
        let base = self
            .config
            .user_agents
            .choose(&mut rand::thread_rng())
            .map_or("Mozilla/5.0", String::as_str);
        format!("{base} {}", self.config.user_agent_suffix)
    }

    async fn get_once(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header(USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response)
    }

    async fn get_with_retry(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, FetchError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url, params).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.config.retries => {
                    attempt += 1;
                    warn!("Fetch of {} failed ({}), retry {}/{}", url, e, attempt, self.config.retries);
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        debug!("Fetching {} {:?}", url, params);

        let response = self.get_with_retry(url, params).await?;
        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}
