//! API-Football client with timeout, retry and backoff.
//!
//! One `fetch` call is a bounded loop: at most `max_attempts` requests, with an
//! exponential backoff after transient failures and a longer fixed cool-down
//! after a rate-limit response. The payload is returned as decoded JSON; the
//! mapper decides what it means.

use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::ApiConfig;
use crate::data::transport::{
    HttpRequest, HttpTransport, Sleeper, ThreadSleeper, Transport, TransportError,
};
use crate::domain::{Dataset, Season};
use crate::error::{AppError, FetchCause, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://v3.football.api-sports.io";

/// Premier League.
pub const DEFAULT_LEAGUE_ID: u32 = 39;

/// How hard a fetch tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait after the first failed attempt; doubles after each further one.
    pub base_delay: Duration,
    /// Wait after an HTTP 429, instead of the backoff.
    pub rate_limit_cooldown: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            rate_limit_cooldown: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based): 1s, 2s, 4s, ...
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exp)
    }

    fn delay_after(&self, cause: &FetchCause, attempt: u32) -> Duration {
        match cause {
            FetchCause::RateLimited => self.rate_limit_cooldown,
            _ => self.backoff_delay(attempt),
        }
    }
}

/// Query parameters shared by all three endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchParams {
    pub league: u32,
    pub season: Season,
}

pub struct ApiClient<T = HttpTransport, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    base_url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl ApiClient {
    /// Production client: reqwest transport, real sleeps, default policy.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AppError> {
        let policy = RetryPolicy::default();
        let transport = HttpTransport::new(policy.timeout)
            .map_err(|e| AppError::new(1, format!("Failed to build HTTP client: {e}")))?;
        Ok(ApiClient::with_transport(
            transport,
            ThreadSleeper,
            &config.base_url,
            &config.api_key,
            policy,
        ))
    }
}

impl<T: Transport, S: Sleeper> ApiClient<T, S> {
    pub fn with_transport(
        transport: T,
        sleeper: S,
        base_url: &str,
        api_key: &str,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            policy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Fetch one endpoint, retrying transient failures per the policy.
    pub fn fetch(&self, endpoint: Dataset, params: &FetchParams) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let query = [
            ("league", params.league.to_string()),
            ("season", params.season.year().to_string()),
        ];
        let request = HttpRequest {
            url: &url,
            query: &query,
            api_key: &self.api_key,
        };
        let max_attempts = self.policy.max_attempts.max(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            info!(
                endpoint = endpoint.path(),
                attempt,
                max_attempts,
                season = %params.season,
                "API request"
            );

            let cause = match self.attempt(&request) {
                Ok(payload) => {
                    let results = payload
                        .get("response")
                        .and_then(Value::as_array)
                        .map(Vec::len)
                        .unwrap_or(0);
                    info!(endpoint = endpoint.path(), attempt, results, "API request succeeded");
                    return Ok(payload);
                }
                Err(cause) => cause,
            };

            warn!(
                endpoint = endpoint.path(),
                attempt,
                max_attempts,
                cause = %cause,
                "API request failed"
            );

            if !cause.is_retryable() {
                return Err(FetchError {
                    endpoint,
                    attempts: attempt,
                    cause,
                });
            }
            if attempt >= max_attempts {
                error!(endpoint = endpoint.path(), attempts = attempt, "All retry attempts failed");
                return Err(FetchError {
                    endpoint,
                    attempts: attempt,
                    cause,
                });
            }

            let delay = self.policy.delay_after(&cause, attempt);
            info!(
                endpoint = endpoint.path(),
                delay_secs = delay.as_secs_f64(),
                "Waiting before next attempt"
            );
            self.sleeper.sleep(delay);
        }
    }

    fn attempt(&self, request: &HttpRequest<'_>) -> Result<Value, FetchCause> {
        let resp = self.transport.get(request).map_err(|e| match e {
            TransportError::Timeout => FetchCause::Timeout,
            TransportError::Connection(msg) => FetchCause::Connection(msg),
        })?;

        match resp.status {
            200..=299 => {}
            429 => return Err(FetchCause::RateLimited),
            code => return Err(FetchCause::Status(code)),
        }

        let payload: Value =
            serde_json::from_str(&resp.body).map_err(|e| FetchCause::Decode(e.to_string()))?;

        if let Some(errors) = reported_errors(&payload) {
            return Err(FetchCause::Api(errors));
        }
        Ok(payload)
    }
}

/// API-Football answers 200 with a non-empty `errors` array/object for bad
/// keys, exhausted quotas and bad parameters.
fn reported_errors(payload: &Value) -> Option<String> {
    let errors = payload.get("errors")?;
    let empty = match errors {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty { None } else { Some(errors.to_string()) }
}
