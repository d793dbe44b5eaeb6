use crate::error::{FetchError, Result};
use crate::model::RouterLocationData;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str =
    "https://my-json-server.typicode.com/marcuzh/router_location_test_api/db";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Client for the router location data API.
///
/// Transport errors, 5xx responses and `429 Too Many Requests` are retried up to
/// `max_retries` times. Server errors back off exponentially between
/// `backoff_min` and `backoff_max`; rate limiting waits `rate_limit_wait`.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    max_retries: u32,
    backoff_min: Duration,
    backoff_max: Duration,
    rate_limit_wait: Duration,
}

/// What a single request attempt asks the retry loop to do next.
enum Attempt {
    Body(String),
    Retry { wait: Duration, cause: String },
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("router-location-connector/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            http,
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_min: Duration::from_secs(1),
            backoff_max: Duration::from_secs(30),
            rate_limit_wait: Duration::from_secs(60),
        })
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_backoff(mut self, min: Duration, max: Duration) -> Self {
        self.backoff_min = min;
        self.backoff_max = max.max(min);
        self
    }

    pub fn with_rate_limit_wait(mut self, wait: Duration) -> Self {
        self.rate_limit_wait = wait;
        self
    }

    /// Fetch and decode the full router and location dataset.
    pub async fn fetch(&self) -> Result<RouterLocationData> {
        let attempts = self.max_retries + 1;
        let mut last_error = String::new();
        info!("Fetching router location data from {}", self.base_url);

        for attempt in 0..attempts {
            match self.attempt(attempt).await? {
                Attempt::Body(body) => {
                    let data = RouterLocationData::from_json(&body)?;
                    info!(
                        "Fetched {} routers and {} locations",
                        data.routers.len(),
                        data.locations.len()
                    );
                    return Ok(data);
                }
                Attempt::Retry { wait, cause } => {
                    last_error = cause;
                    if attempt + 1 < attempts {
                        debug!("Retrying in {:?} ({}/{})", wait, attempt + 1, self.max_retries);
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: self.base_url.to_string(),
            attempts,
            last_error,
        })
    }

    async fn attempt(&self, attempt: u32) -> Result<Attempt> {
        let response = self
            .http
            .get(self.base_url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", self.base_url, e);
                return Ok(Attempt::Retry {
                    wait: self.backoff(attempt),
                    cause: e.to_string(),
                });
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limited by {}", self.base_url);
            return Ok(Attempt::Retry {
                wait: self.rate_limit_wait,
                cause: format!("response status {}", status),
            });
        }
        if status.is_server_error() {
            warn!("Server error from {}: {}", self.base_url, status);
            return Ok(Attempt::Retry {
                wait: self.backoff(attempt),
                cause: format!("response status {}", status),
            });
        }
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        Ok(Attempt::Body(response.text().await?))
    }

    /// `backoff_min * 2^attempt`, capped at `backoff_max`.
    fn backoff(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.backoff_min.checked_mul(factor))
            .map_or(self.backoff_max, |wait| wait.min(self.backoff_max))
    }
}
