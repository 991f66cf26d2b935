use crate::config::ScrapeConfig;
use crate::types::{RankerError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use url::Url;

/// Minimum spacing between two requests to the same host.
const MIN_HOST_INTERVAL: Duration = Duration::from_secs(1);

/// HTTP page loader with retries and per-host rate limiting. Cheap to clone;
/// clones share the client and the rate limiter.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    config: ScrapeConfig,
    rate_limiter: Arc<RwLock<HashMap<String, Instant>>>,
}

impl PageFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.navigation_timeout())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            rate_limiter: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Fetches a page body, retrying transport errors and non-success statuses
    /// with exponential backoff.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching page: {}", url);

        self.apply_rate_limit(url).await?;

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.get(url).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(content) => {
                                info!(
                                    "Successfully fetched page: {} ({} bytes in {}ms)",
                                    url,
                                    content.len(),
                                    start_time.elapsed().as_millis()
                                );
                                return Ok(content);
                            }
                            Err(e) => last_error = Some(RankerError::Http(e)),
                        }
                    } else {
                        last_error = Some(RankerError::Browser(format!(
                            "HTTP {}: {}",
                            status,
                            status.canonical_reason().unwrap_or("Unknown")
                        )));
                    }
                }
                Err(e) => last_error = Some(e),
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            break;
        }

        error!(
            "Failed to fetch page after {} attempts: {}",
            self.config.max_retries + 1,
            url
        );
        Err(last_error.unwrap_or_else(|| RankerError::Browser(format!("no response from {}", url))))
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "fr-FR,fr;q=0.9,en;q=0.8")
            .send()
            .await?;
        Ok(response)
    }

    async fn apply_rate_limit(&self, url: &str) -> Result<()> {
        let parsed_url = Url::parse(url)?;
        let host = parsed_url.host_str().unwrap_or("").to_string();

        let wait_time = {
            let mut rate_limiter = self.rate_limiter.write().await;
            reserve_slot(&mut rate_limiter, host.clone(), Instant::now())
        };

        if !wait_time.is_zero() {
            debug!("Rate limiting {}: waiting {:?}", host, wait_time);
            tokio::time::sleep(wait_time).await;
        }

        Ok(())
    }
}

/// Books the next request slot for `host` and returns how long the caller must
/// wait for it. The lock is released before anyone sleeps.
fn reserve_slot(slots: &mut HashMap<String, Instant>, host: String, now: Instant) -> Duration {
    let slot = match slots.get(&host) {
        Some(last) => (*last + MIN_HOST_INTERVAL).max(now),
        None => now,
    };
    slots.insert(host, slot);
    slot.saturating_duration_since(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_booked_per_host() {
        let mut slots = HashMap::new();
        let now = Instant::now();

        assert_eq!(reserve_slot(&mut slots, "www.fnac.com".into(), now), Duration::ZERO);
        assert_eq!(reserve_slot(&mut slots, "www.fnac.com".into(), now), MIN_HOST_INTERVAL);
        assert_eq!(reserve_slot(&mut slots, "www.fnac.com".into(), now), MIN_HOST_INTERVAL * 2);
        assert_eq!(reserve_slot(&mut slots, "www.darty.com".into(), now), Duration::ZERO);

        let later = now + MIN_HOST_INTERVAL * 5;
        assert_eq!(reserve_slot(&mut slots, "www.fnac.com".into(), later), Duration::ZERO);
    }

    #[tokio::test]
    async fn waiting_host_does_not_block_others() {
        let fetcher = PageFetcher::new(&ScrapeConfig::instant()).unwrap();
        fetcher.apply_rate_limit("https://www.fnac.com/a").await.unwrap();

        let busy = fetcher.clone();
        let waiting = tokio::spawn(async move {
            busy.apply_rate_limit("https://www.fnac.com/b").await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        fetcher.apply_rate_limit("https://www.darty.com/c").await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));

        waiting.await.unwrap();
    }
}
