/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials provider contracts and the bundled providers.

mod chain;
mod env;
pub mod lazy_caching;

pub use chain::ChainProvider;
pub use env::EnvironmentVariableCredentialsProvider;
pub use lazy_caching::LazyCachingCredentialsProvider;

use crate::Credentials;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// An opaque error returned by a credentials provider.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Debug)]
#[non_exhaustive]
pub enum CredentialsError {
    /// No provider in the configured chain produced credentials.
    CredentialsNotLoaded,

    /// A provider was asked for credentials and failed.
    ProviderError(BoxError),

    /// An unexpected error occurred during credentials resolution.
    Unhandled(BoxError),
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsError::CredentialsNotLoaded => {
                write!(f, "the provider could not provide credentials or required configuration was not set")
            }
            CredentialsError::ProviderError(err) => {
                write!(f, "an error occurred while loading credentials: {}", err)
            }
            CredentialsError::Unhandled(err) => {
                write!(f, "an unexpected error occurred: {}", err)
            }
        }
    }
}

impl Error for CredentialsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialsError::ProviderError(err) | CredentialsError::Unhandled(err) => {
                Some(err.as_ref())
            }
            _ => None,
        }
    }
}

pub type CredentialsResult = Result<Credentials, CredentialsError>;
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An asynchronous credentials provider.
///
/// This is the contract the request pipeline consumes. Synchronous providers
/// implement [`ProvideCredentials`] instead and are lifted by a blanket impl.
pub trait AsyncProvideCredentials: Send + Sync {
    fn provide_credentials(&self) -> BoxFuture<'_, CredentialsResult>;
}

/// A synchronous credentials provider.
pub trait ProvideCredentials: Send + Sync {
    fn provide_credentials(&self) -> CredentialsResult;
}

impl<T: ProvideCredentials> AsyncProvideCredentials for T {
    fn provide_credentials(&self) -> BoxFuture<'_, CredentialsResult> {
        let result = ProvideCredentials::provide_credentials(self);
        Box::pin(async move { result })
    }
}

/// Static credentials provide themselves.
impl ProvideCredentials for Credentials {
    fn provide_credentials(&self) -> CredentialsResult {
        Ok(self.clone())
    }
}

/// The shared provider handle stored in operation property bags.
pub type CredentialsProvider = Arc<dyn AsyncProvideCredentials>;

/// Build a provider from an async closure:
///
/// ```rust
/// use oxbow_auth::{async_provide_credentials_fn, Credentials};
/// let provider = async_provide_credentials_fn(|| async {
///     // async work to load credentials can happen here
///     Ok(Credentials::from_keys("access", "secret", None))
/// });
/// ```
pub fn async_provide_credentials_fn<T, F>(f: T) -> AsyncProvideCredentialsFn<T>
where
    T: Fn() -> F + Send + Sync,
    F: Future<Output = CredentialsResult> + Send + 'static,
{
    AsyncProvideCredentialsFn { f }
}

#[derive(Copy, Clone)]
pub struct AsyncProvideCredentialsFn<T> {
    f: T,
}

impl<T, F> AsyncProvideCredentials for AsyncProvideCredentialsFn<T>
where
    T: Fn() -> F + Send + Sync,
    F: Future<Output = CredentialsResult> + Send + 'static,
{
    fn provide_credentials(&self) -> BoxFuture<'_, CredentialsResult> {
        Box::pin((self.f)())
    }
}

/// The default provider chain: environment variables only, for now.
pub fn default_provider() -> impl AsyncProvideCredentials {
    // TODO: add profile-file and IMDS providers to the default chain
    EnvironmentVariableCredentialsProvider::new()
}
