/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The standard retry policy: a cross-request token bucket plus per-request
//! exponential backoff with full jitter.
//!
//! Every attempt that may be retried must first acquire tokens from a quota
//! shared by all requests made through one client. Failures that never get
//! refunded drain the quota, so a downstream outage stops generating retry
//! traffic instead of amplifying it.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use weft_http::operation::Operation;
use weft_http::result::{SdkError, SdkSuccess};
use weft_http::retry::ClassifyResponse;
use weft_types::retry::{ErrorKind, RetryKind};

/// A policy instantiator. The policy it produces tracks one request (and its
/// retries) while sharing cross-request state with its siblings.
pub trait NewRequestPolicy
where
    Self::Policy: Clone,
{
    type Policy;

    fn new_request_policy(&self) -> Self::Policy;
}

const INITIAL_RETRY_TOKENS: usize = 500;
const RETRY_COST: usize = 5;
const NO_RETRY_INCREMENT: usize = 1;
const TIMEOUT_RETRY_COST: usize = 10;
const MAX_BACKOFF: Duration = Duration::from_secs(20);
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Retry configuration.
#[derive(Clone)]
pub struct Config {
    initial_retry_tokens: usize,
    retry_cost: usize,
    no_retry_increment: usize,
    timeout_retry_cost: usize,
    max_retries: u32,
    max_backoff: Duration,
    base: fn() -> f64,
}

impl Config {
    /// Override `b` in the backoff computation `b * 2^attempts`.
    ///
    /// The default is a random jitter in `[0, 1)`; tests override it with a
    /// constant to get deterministic backoff.
    pub fn with_base(mut self, base: fn() -> f64) -> Self {
        self.base = base;
        self
    }

    /// Override the maximum number of attempts (including the initial one).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the ceiling applied to computed backoff durations.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            initial_retry_tokens: INITIAL_RETRY_TOKENS,
            retry_cost: RETRY_COST,
            no_retry_increment: NO_RETRY_INCREMENT,
            timeout_retry_cost: TIMEOUT_RETRY_COST,
            max_retries: DEFAULT_MAX_RETRIES,
            max_backoff: MAX_BACKOFF,
            base: fastrand::f64,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("initial_retry_tokens", &self.initial_retry_tokens)
            .field("retry_cost", &self.retry_cost)
            .field("no_retry_increment", &self.no_retry_increment)
            .field("timeout_retry_cost", &self.timeout_retry_cost)
            .field("max_retries", &self.max_retries)
            .field("max_backoff", &self.max_backoff)
            .finish()
    }
}

/// The cross-request token bucket.
#[derive(Clone, Debug)]
struct CrossRequestRetryState {
    quota_available: Arc<Mutex<usize>>,
}

impl CrossRequestRetryState {
    fn new(initial_quota: usize) -> Self {
        CrossRequestRetryState {
            quota_available: Arc::new(Mutex::new(initial_quota)),
        }
    }

    fn quota_release(&self, value: Option<usize>, config: &Config) {
        let mut quota = self.quota_available.lock().unwrap();
        *quota = (*quota + value.unwrap_or(config.no_retry_increment)).min(config.initial_retry_tokens);
    }

    /// Attempt to acquire quota for a retry of `err`.
    ///
    /// `None` means the bucket is exhausted and the retry must not occur.
    fn quota_acquire(&self, err: &ErrorKind, config: &Config) -> Option<usize> {
        let mut quota = self.quota_available.lock().unwrap();
        let retry_cost = if err == &ErrorKind::TransientError {
            config.timeout_retry_cost
        } else {
            config.retry_cost
        };
        if retry_cost > *quota {
            tracing::warn!("retry quota exhausted, no further retries will be attempted");
            None
        } else {
            *quota -= retry_cost;
            Some(retry_cost)
        }
    }
}

/// The standard retry policy. One per client; hand it to `Client` via
/// [`crate::Builder`] or the default.
#[derive(Clone, Debug)]
pub struct Standard {
    config: Config,
    shared_state: CrossRequestRetryState,
}

impl Standard {
    pub fn new(config: Config) -> Self {
        Standard {
            shared_state: CrossRequestRetryState::new(config.initial_retry_tokens),
            config,
        }
    }

    fn policy(&self) -> RetryHandler {
        RetryHandler {
            local: RequestLocalRetryState::new(),
            shared: self.shared_state.clone(),
            config: self.config.clone(),
        }
    }
}

impl Default for Standard {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl NewRequestPolicy for Standard {
    type Policy = RetryHandler;

    fn new_request_policy(&self) -> Self::Policy {
        self.policy()
    }
}

#[derive(Clone, Debug, Default)]
struct RequestLocalRetryState {
    attempts: u32,
    last_quota_usage: Option<usize>,
}

impl RequestLocalRetryState {
    fn new() -> Self {
        Self::default()
    }
}

/// The request-scoped policy handed to `tower::retry::Retry`.
///
/// Implements `Policy` by classifying the attempt's result with the
/// operation's classifier, then consulting the shared quota and computing
/// backoff.
#[derive(Clone, Debug)]
pub struct RetryHandler {
    local: RequestLocalRetryState,
    shared: CrossRequestRetryState,
    config: Config,
}

/// b * 2^attempts, in seconds
fn calculate_exponential_backoff(base: f64, retry_attempts: u32) -> f64 {
    base * 2_u32.pow(retry_attempts) as f64
}

impl RetryHandler {
    /// Compute the next policy state and backoff for a retryable error.
    ///
    /// `None` when no further retries should occur, either because the
    /// attempt limit was reached or the quota is exhausted.
    fn should_retry_error(&self, error_kind: &ErrorKind) -> Option<(RetryHandler, Duration)> {
        if self.local.attempts + 1 >= self.config.max_retries {
            return None;
        }
        let quota_used = self.shared.quota_acquire(error_kind, &self.config)?;
        let backoff = calculate_exponential_backoff((self.config.base)(), self.local.attempts);
        let backoff = Duration::from_secs_f64(backoff).min(self.config.max_backoff);
        let next = RetryHandler {
            local: RequestLocalRetryState {
                attempts: self.local.attempts + 1,
                last_quota_usage: Some(quota_used),
            },
            shared: self.shared.clone(),
            config: self.config.clone(),
        };
        Some((next, backoff))
    }
}

impl<Handler, R, T, E> tower::retry::Policy<Operation<Handler, R>, SdkSuccess<T>, SdkError<E>>
    for RetryHandler
where
    Handler: Clone,
    R: ClassifyResponse<SdkSuccess<T>, SdkError<E>>,
{
    type Future = Pin<Box<dyn Future<Output = Self> + Send>>;

    fn retry(
        &self,
        req: &Operation<Handler, R>,
        result: Result<&SdkSuccess<T>, &SdkError<E>>,
    ) -> Option<Self::Future> {
        let policy = req.retry_policy();
        let retry_kind = policy.classify(result);
        let (next, backoff) = match retry_kind {
            RetryKind::Explicit(dur) => (self.clone(), dur),
            RetryKind::NotRetryable => {
                if result.is_ok() {
                    // refund the cost of the last failed attempt, or pay the
                    // no-retry increment back into the bucket
                    self.shared
                        .quota_release(self.local.last_quota_usage, &self.config);
                }
                return None;
            }
            RetryKind::Error(err) => self.should_retry_error(&err)?,
            _ => return None,
        };
        tracing::info!(attempts = next.local.attempts, backoff = ?backoff, "retrying after error");
        let fut = async move {
            tokio::time::sleep(backoff).await;
            next
        };
        Some(Box::pin(fut))
    }

    fn clone_request(&self, req: &Operation<Handler, R>) -> Option<Operation<Handler, R>> {
        req.try_clone()
    }
}

#[cfg(test)]
mod test {
    use super::{Config, NewRequestPolicy, RetryHandler, Standard};
    use std::time::Duration;
    use weft_types::retry::ErrorKind;

    fn test_config() -> Config {
        Config::default().with_base(|| 1.0)
    }

    fn quota(policy: &RetryHandler) -> usize {
        *policy.shared.quota_available.lock().unwrap()
    }

    #[test]
    fn eventual_success() {
        let policy = Standard::new(test_config()).new_request_policy();
        let (policy, dur) = policy
            .should_retry_error(&ErrorKind::ServerError)
            .expect("should retry");
        assert_eq!(dur, Duration::from_secs(1));
        assert_eq!(quota(&policy), 495);

        let (policy, dur) = policy
            .should_retry_error(&ErrorKind::ServerError)
            .expect("should retry");
        assert_eq!(dur, Duration::from_secs(2));
        assert_eq!(quota(&policy), 490);

        // the second retry succeeded; its cost is refunded
        policy
            .shared
            .quota_release(policy.local.last_quota_usage, &policy.config);
        assert_eq!(quota(&policy), 495);
    }

    #[test]
    fn no_more_attempts() {
        let policy = Standard::new(test_config()).new_request_policy();
        let (policy, _) = policy
            .should_retry_error(&ErrorKind::ServerError)
            .expect("should retry");
        let (policy, _) = policy
            .should_retry_error(&ErrorKind::ServerError)
            .expect("should retry");
        assert_eq!(policy.local.attempts, 2);
        assert!(policy.should_retry_error(&ErrorKind::ServerError).is_none());
    }

    #[test]
    fn zero_max_retries_never_retries() {
        let policy = Standard::new(test_config().with_max_retries(0)).new_request_policy();
        assert!(policy.should_retry_error(&ErrorKind::ServerError).is_none());
        // no attempt was made, so no quota was spent
        assert_eq!(quota(&policy), 500);
    }

    #[test]
    fn backoff_timing() {
        let config = test_config().with_max_retries(5);
        let policy = Standard::new(config).new_request_policy();
        let mut policy = policy;
        for (expected_quota, expected_backoff) in &[(495, 1), (490, 2), (485, 4), (480, 8)] {
            let (next, dur) = policy
                .should_retry_error(&ErrorKind::ServerError)
                .expect("should retry");
            assert_eq!(dur, Duration::from_secs(*expected_backoff));
            assert_eq!(quota(&next), *expected_quota);
            policy = next;
        }
    }

    #[test]
    fn max_backoff_time() {
        let config = test_config()
            .with_max_retries(5)
            .with_max_backoff(Duration::from_secs(3));
        let mut policy = Standard::new(config).new_request_policy();
        for expected_backoff in &[1, 2, 3, 3] {
            let (next, dur) = policy
                .should_retry_error(&ErrorKind::ServerError)
                .expect("should retry");
            assert_eq!(dur, Duration::from_secs(*expected_backoff));
            policy = next;
        }
    }

    #[test]
    fn transient_errors_cost_more() {
        let policy = Standard::new(test_config()).new_request_policy();
        let (policy, _) = policy
            .should_retry_error(&ErrorKind::TransientError)
            .expect("should retry");
        assert_eq!(quota(&policy), 490);
        policy
            .shared
            .quota_release(policy.local.last_quota_usage, &policy.config);
        assert_eq!(quota(&policy), 500);
    }

    #[test]
    fn quota_exhaustion_stops_retries() {
        let policy = Standard::new(test_config()).new_request_policy();
        *policy.shared.quota_available.lock().unwrap() = 4;
        assert!(policy.should_retry_error(&ErrorKind::ServerError).is_none());
    }

    #[test]
    fn release_is_capped_at_the_initial_quota() {
        let policy = Standard::new(test_config()).new_request_policy();
        policy.shared.quota_release(Some(100), &policy.config);
        assert_eq!(quota(&policy), 500);
    }
}
