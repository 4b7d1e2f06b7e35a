//! HTTP plumbing shared by every NHL API call: client construction and a
//! bounded-concurrency JSON GET with retry/backoff.

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::{NhlError, Result};

/// Retry schedule for transient failures.
///
/// Delays double per attempt and are capped at `max_delay`. Rate-limited
/// responses (429) start from the longer `rate_limit_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub rate_limit_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            rate_limit_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// No sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32, rate_limited: bool) -> Duration {
        let base = if rate_limited {
            self.rate_limit_delay
        } else {
            self.base_delay
        };
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        base.saturating_mul(factor).min(self.max_delay)
    }
}

/// Build the shared HTTP client with a fixed per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .user_agent(concat!("nhl-fpts/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GET `url` and decode the body as JSON.
///
/// Each attempt holds one `limiter` permit for the duration of the request,
/// so the limiter caps in-flight requests across every caller sharing it.
/// Timeouts, connection errors, 5xx and 429 are retried per `policy`; other
/// 4xx responses and undecodable bodies fail immediately.
pub async fn get_json_with_retry<T: DeserializeOwned>(
    client: &Client,
    limiter: &Semaphore,
    policy: &RetryPolicy,
    url: &str,
) -> Result<T> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = {
            let _permit = limiter.acquire().await.map_err(|_| NhlError::LimiterClosed)?;
            get_json_once(client, url).await
        };
        match result {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && e.is_transient() => {
                let delay = policy.delay_after(attempt, e.is_rate_limited());
                warn!(
                    url,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "request failed: {e}; retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn get_json_once<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    debug!(url, "GET");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NhlError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn fast_client() -> Client {
        build_client(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_default_policy_backoff_is_capped() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_after(1, false), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2, false), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3, false), Duration::from_secs(8));
        assert_eq!(policy.delay_after(4, false), Duration::from_secs(10));
        assert_eq!(policy.delay_after(1, true), Duration::from_secs(5));
        assert_eq!(policy.delay_after(2, true), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": 1})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let limiter = Semaphore::new(4);
        let value: Value = get_json_with_retry(
            &fast_client(),
            &limiter,
            &RetryPolicy::immediate(3),
            &format!("{}/ok", mock_server.uri()),
        )
        .await
        .unwrap();

        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn test_server_error_retried_until_attempts_exhausted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let limiter = Semaphore::new(4);
        let result: Result<Value> = get_json_with_retry(
            &fast_client(),
            &limiter,
            &RetryPolicy::immediate(3),
            &format!("{}/flaky", mock_server.uri()),
        )
        .await;

        assert_eq!(result.unwrap_err().status(), Some(503));
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
            .mount(&mock_server)
            .await;

        let limiter = Semaphore::new(1);
        let value: Vec<u32> = get_json_with_retry(
            &fast_client(),
            &limiter,
            &RetryPolicy::immediate(3),
            &format!("{}/limited", mock_server.uri()),
        )
        .await
        .unwrap();

        assert_eq!(value, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let limiter = Semaphore::new(1);
        let result: Result<Value> = get_json_with_retry(
            &fast_client(),
            &limiter,
            &RetryPolicy::immediate(3),
            &format!("{}/missing", mock_server.uri()),
        )
        .await;

        assert_eq!(result.unwrap_err().status(), Some(404));
    }

    #[tokio::test]
    async fn test_malformed_body_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let limiter = Semaphore::new(1);
        let result: Result<Value> = get_json_with_retry(
            &fast_client(),
            &limiter,
            &RetryPolicy::immediate(3),
            &format!("{}/garbage", mock_server.uri()),
        )
        .await;

        match result {
            Err(NhlError::Json(_)) => (),
            other => panic!("Expected Json error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_millis(100)).unwrap();
        let limiter = Semaphore::new(1);
        let result: Result<Value> = get_json_with_retry(
            &client,
            &limiter,
            &RetryPolicy::immediate(2),
            &format!("{}/slow", mock_server.uri()),
        )
        .await;

        match result {
            Err(NhlError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("Expected timeout, got {:?}", other),
        }
    }
}
