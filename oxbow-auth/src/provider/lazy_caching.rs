/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! A caching wrapper around another credentials provider. Credentials are
//! loaded lazily on first use, cached until they expire, and refreshed by
//! whichever request observes the expiration first.

use crate::provider::{AsyncProvideCredentials, CredentialsError, CredentialsResult};
use crate::Credentials;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::Instrument;

const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CREDENTIAL_EXPIRATION: Duration = Duration::from_secs(15 * 60);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// `LazyCachingCredentialsProvider` wraps a loader and caches its output.
///
/// Loaded credentials without an expiration are given a default one so the
/// cache never holds credentials forever.
pub struct LazyCachingCredentialsProvider(Provider<SystemTimeProvider>);

impl LazyCachingCredentialsProvider {
    pub fn builder() -> builder::Builder {
        builder::Builder::new()
    }
}

impl AsyncProvideCredentials for LazyCachingCredentialsProvider {
    fn provide_credentials(&self) -> BoxFuture<'_, CredentialsResult> {
        self.0.provide_credentials()
    }
}

pub mod builder {
    use super::{
        LazyCachingCredentialsProvider, Provider, SystemTimeProvider,
        DEFAULT_CREDENTIAL_EXPIRATION, DEFAULT_LOAD_TIMEOUT,
    };
    use crate::provider::AsyncProvideCredentials;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    pub struct Builder {
        load: Option<Arc<dyn AsyncProvideCredentials>>,
        load_timeout: Option<Duration>,
        default_credential_expiration: Option<Duration>,
    }

    impl Builder {
        pub fn new() -> Self {
            Default::default()
        }

        /// The provider that actually loads credentials on a cache miss.
        pub fn load(mut self, loader: impl AsyncProvideCredentials + 'static) -> Self {
            self.load = Some(Arc::new(loader));
            self
        }

        /// How long a single load may take before it is abandoned
        /// (default: 5 seconds).
        pub fn load_timeout(mut self, timeout: Duration) -> Self {
            self.load_timeout = Some(timeout);
            self
        }

        /// The expiration assigned to credentials the loader returned
        /// without one (default: 15 minutes). Must be at least 15 minutes.
        pub fn default_credential_expiration(mut self, duration: Duration) -> Self {
            self.default_credential_expiration = Some(duration);
            self
        }

        pub fn build(self) -> LazyCachingCredentialsProvider {
            let default_credential_expiration = self
                .default_credential_expiration
                .unwrap_or(DEFAULT_CREDENTIAL_EXPIRATION);
            assert!(
                default_credential_expiration >= DEFAULT_CREDENTIAL_EXPIRATION,
                "default_credential_expiration must be at least 15 minutes"
            );
            LazyCachingCredentialsProvider(Provider::new(
                SystemTimeProvider,
                self.load.expect("a loader must be set on the builder"),
                self.load_timeout.unwrap_or(DEFAULT_LOAD_TIMEOUT),
                default_credential_expiration,
            ))
        }
    }
}

trait TimeProvider: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Clone, Copy, Debug)]
struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

fn expired(credentials: &Credentials, now: SystemTime) -> bool {
    match credentials.expiry() {
        Some(expiry) => now >= expiry,
        None => false,
    }
}

fn wrap_default_expiration(credentials: Credentials, default_expiry: SystemTime) -> Credentials {
    if credentials.expiry().is_none() {
        Credentials::new(
            credentials.access_key_id().to_string(),
            credentials.secret_access_key().to_string(),
            credentials.session_token().map(|t| t.to_string()),
            Some(default_expiry),
            "lazy_caching_default_credential_expiration",
        )
    } else {
        credentials
    }
}

struct Provider<T> {
    time: T,
    cache: Cache,
    load: Arc<dyn AsyncProvideCredentials>,
    load_timeout: Duration,
    default_credential_expiration: Duration,
}

impl<T: TimeProvider> Provider<T> {
    fn new(
        time: T,
        load: Arc<dyn AsyncProvideCredentials>,
        load_timeout: Duration,
        default_credential_expiration: Duration,
    ) -> Self {
        Provider {
            time,
            cache: Cache::new(),
            load,
            load_timeout,
            default_credential_expiration,
        }
    }

    async fn refresh(&self) -> CredentialsResult {
        let load = self.load.clone();
        let load_timeout = self.load_timeout;
        let default_expiry = self.time.now() + self.default_credential_expiration;
        self.cache
            .get_or_load(move || async move {
                let credentials =
                    match tokio::time::timeout(load_timeout, load.provide_credentials()).await {
                        Ok(result) => result?,
                        Err(_elapsed) => {
                            return Err(CredentialsError::ProviderError(
                                "the credentials loader timed out".into(),
                            ));
                        }
                    };
                Ok(wrap_default_expiration(credentials, default_expiry))
            })
            .await
    }
}

impl<T: TimeProvider> AsyncProvideCredentials for Provider<T> {
    fn provide_credentials(&self) -> BoxFuture<'_, CredentialsResult> {
        Box::pin(async move {
            let now = self.time.now();
            match self.cache.get_cleared_if_expired(now).await {
                Some(credentials) => Ok(credentials),
                None => {
                    let span = tracing::trace_span!("lazy_refresh_credentials");
                    self.refresh().instrument(span).await
                }
            }
        })
    }
}

#[derive(Clone)]
struct Cache {
    value: Arc<tokio::sync::RwLock<tokio::sync::OnceCell<Credentials>>>,
}

impl Cache {
    fn new() -> Self {
        Cache {
            value: Arc::new(tokio::sync::RwLock::new(tokio::sync::OnceCell::new())),
        }
    }

    /// Return valid cached credentials, clearing the cell if they expired.
    async fn get_cleared_if_expired(&self, now: SystemTime) -> Option<Credentials> {
        {
            let lock = self.value.read().await;
            match lock.get() {
                Some(credentials) if !expired(credentials, now) => {
                    return Some(credentials.clone());
                }
                None => return None,
                _ => {}
            }
        }
        let mut lock = self.value.write().await;
        // re-check under the write lock; another task may have refreshed
        match lock.get() {
            Some(credentials) if !expired(credentials, now) => Some(credentials.clone()),
            Some(_) => {
                *lock = tokio::sync::OnceCell::new();
                None
            }
            None => None,
        }
    }

    /// Single-flight load: concurrent callers share one invocation of `f`.
    async fn get_or_load<F, Fut>(&self, f: F) -> CredentialsResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CredentialsResult>,
    {
        let lock = self.value.read().await;
        lock.get_or_try_init(f).await.map(|creds| creds.clone())
    }
}

#[cfg(test)]
mod test {
    use super::{
        expired, Provider, TimeProvider, DEFAULT_CREDENTIAL_EXPIRATION, DEFAULT_LOAD_TIMEOUT,
    };
    use crate::provider::{
        async_provide_credentials_fn, AsyncProvideCredentials, CredentialsError, CredentialsResult,
    };
    use crate::Credentials;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    #[derive(Clone)]
    struct TestTime {
        time: Arc<Mutex<SystemTime>>,
    }

    impl TestTime {
        fn new(time: SystemTime) -> Self {
            TestTime {
                time: Arc::new(Mutex::new(time)),
            }
        }

        fn set(inner: &Arc<Mutex<SystemTime>>, time: SystemTime) {
            *inner.lock().unwrap() = time;
        }
    }

    impl TimeProvider for TestTime {
        fn now(&self) -> SystemTime {
            *self.time.lock().unwrap()
        }
    }

    fn epoch_secs(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn credentials(expiry_secs: u64) -> Credentials {
        Credentials::new("test", "test", None, Some(epoch_secs(expiry_secs)), "test")
    }

    fn test_provider(time: TestTime, load_list: Vec<CredentialsResult>) -> Provider<TestTime> {
        let load_list = Arc::new(Mutex::new(load_list));
        Provider::new(
            time,
            Arc::new(async_provide_credentials_fn(move || {
                let list = load_list.clone();
                async move {
                    let next = list.lock().unwrap().remove(0);
                    next
                }
            })),
            DEFAULT_LOAD_TIMEOUT,
            DEFAULT_CREDENTIAL_EXPIRATION,
        )
    }

    fn expect_creds(expiry_secs: u64, result: CredentialsResult) {
        let creds = result.expect("credentials should load");
        assert_eq!(Some(epoch_secs(expiry_secs)), creds.expiry());
    }

    #[test]
    fn expired_check() {
        let creds = credentials(100);
        assert!(expired(&creds, epoch_secs(1000)));
        assert!(expired(&creds, epoch_secs(100)));
        assert!(!expired(&creds, epoch_secs(99)));
    }

    #[tokio::test]
    async fn initial_populate_credentials() {
        let time = TestTime::new(epoch_secs(100));
        let loaded = Arc::new(Mutex::new(0_u32));
        let counter = loaded.clone();
        let provider = Provider::new(
            time,
            Arc::new(async_provide_credentials_fn(move || {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    Ok(Credentials::from_keys("test", "test", None))
                }
            })),
            DEFAULT_LOAD_TIMEOUT,
            DEFAULT_CREDENTIAL_EXPIRATION,
        );
        // default expiration gets applied to credentials without one
        expect_creds(100 + 15 * 60, provider.provide_credentials().await);
        assert_eq!(*loaded.lock().unwrap(), 1);
        // the second call hits the cache
        expect_creds(100 + 15 * 60, provider.provide_credentials().await);
        assert_eq!(*loaded.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn refresh_expired_credentials() {
        let time = TestTime::new(epoch_secs(100));
        let time_inner = time.time.clone();
        let provider = test_provider(
            time,
            vec![
                Ok(credentials(1000)),
                Ok(credentials(2000)),
                Ok(credentials(3000)),
            ],
        );

        expect_creds(1000, provider.provide_credentials().await);
        expect_creds(1000, provider.provide_credentials().await);
        TestTime::set(&time_inner, epoch_secs(1500));
        expect_creds(2000, provider.provide_credentials().await);
        expect_creds(2000, provider.provide_credentials().await);
        TestTime::set(&time_inner, epoch_secs(2500));
        expect_creds(3000, provider.provide_credentials().await);
        expect_creds(3000, provider.provide_credentials().await);
    }

    #[tokio::test]
    async fn refresh_failed_error() {
        let time = TestTime::new(epoch_secs(100));
        let provider = test_provider(
            time,
            vec![Err(CredentialsError::CredentialsNotLoaded)],
        );
        match provider.provide_credentials().await {
            Err(CredentialsError::CredentialsNotLoaded) => (),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn load_timeout() {
        let time = TestTime::new(epoch_secs(100));
        let provider = Provider::new(
            time,
            Arc::new(async_provide_credentials_fn(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(Credentials::from_keys("test", "test", None))
            })),
            DEFAULT_LOAD_TIMEOUT,
            DEFAULT_CREDENTIAL_EXPIRATION,
        );
        match provider.provide_credentials().await {
            Err(CredentialsError::ProviderError(_)) => (),
            other => panic!("expected a timeout error, got {:?}", other.map(|_| ())),
        }
    }
}
