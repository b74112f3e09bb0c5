/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! A tower-based client that drives Oxbow operations through a middleware
//! stack and a connector, with retry.
//!
//! The stack assembled by [`Client::call`], top to bottom:
//!
//! ```text
//! retry (token bucket + exponential backoff)
//!   └─ parse response
//!        └─ middleware (endpoint, auth, signing, ...)
//!             └─ dispatch
//!                  └─ connector (hyper, or a test connection)
//! ```

pub mod bounds;
pub mod builder;
pub mod hyper_impls;
pub mod retry;
#[cfg(feature = "test-util")]
pub mod test_connection;

mod static_tests;

pub use builder::Builder;
pub use weft_http::result::{SdkError, SdkSuccess};

use tower::{Service, ServiceBuilder, ServiceExt};
use weft_http::body::SdkBody;
use weft_http::operation::Operation;
use weft_http::response::ParseHttpResponse;
use weft_http_tower::dispatch::DispatchLayer;
use weft_http_tower::parse_response::ParseResponseLayer;

/// An HTTPS client using the default TLS stack.
#[cfg(feature = "native-tls")]
pub type Https = hyper_impls::HyperAdapter<hyper_tls::HttpsConnector<hyper::client::HttpConnector>>;

/// A generic service client.
///
/// `C` is the connector, `M` the middleware stack applied to every request,
/// and `R` the retry policy (the standard token-bucket policy by default).
#[derive(Debug)]
pub struct Client<C, M, R = retry::Standard> {
    pub(crate) connector: C,
    pub(crate) middleware: M,
    pub(crate) retry_policy: R,
}

impl<C, M> Client<C, M>
where
    M: Default,
{
    /// Create a client with a custom connector and default middleware and
    /// retry configuration.
    pub fn new(connector: C) -> Self {
        Builder::new()
            .connector(connector)
            .middleware(M::default())
            .build()
    }
}

#[cfg(feature = "native-tls")]
impl<M> Client<Https, M>
where
    M: Default,
{
    /// Create a client that dispatches over HTTPS.
    pub fn https() -> Self {
        let https = hyper_tls::HttpsConnector::new();
        let connector = hyper_impls::HyperAdapter::from(hyper::Client::builder().build(https));
        Self::new(connector)
    }
}

impl<C, M, R> Client<C, M, R> {
    /// Replace the retry configuration, keeping the connector and middleware.
    pub fn with_retry_config(self, config: retry::Config) -> Client<C, M>
    where
        R: Sized,
    {
        Client {
            connector: self.connector,
            middleware: self.middleware,
            retry_policy: retry::Standard::new(config),
        }
    }
}

impl<C, M, R> Client<C, M, R>
where
    C: bounds::WeftConnector,
    M: bounds::WeftMiddleware<C>,
    R: retry::NewRequestPolicy,
{
    /// Dispatch an operation and return its parsed output.
    ///
    /// Equivalent to [`Client::call_raw`] with the raw response discarded.
    pub async fn call<O, T, E, Retry>(&self, op: Operation<O, Retry>) -> Result<T, SdkError<E>>
    where
        O: ParseHttpResponse<SdkBody, Output = Result<T, E>> + Send + Sync + Clone + 'static,
        Retry: Send + Clone + 'static,
        R::Policy: bounds::WeftRetryPolicy<O, T, E, Retry>,
    {
        self.call_raw(op).await.map(|res| res.parsed)
    }

    /// Dispatch an operation and return both the parsed output and the raw
    /// HTTP response.
    pub async fn call_raw<O, T, E, Retry>(
        &self,
        op: Operation<O, Retry>,
    ) -> Result<SdkSuccess<T>, SdkError<E>>
    where
        O: ParseHttpResponse<SdkBody, Output = Result<T, E>> + Send + Sync + Clone + 'static,
        Retry: Send + Clone + 'static,
        R::Policy: bounds::WeftRetryPolicy<O, T, E, Retry>,
    {
        let connector = self.connector.clone();
        let mut svc = ServiceBuilder::new()
            // Create a new request-scoped policy
            .retry(self.retry_policy.new_request_policy())
            .layer(ParseResponseLayer::<O, Retry>::new())
            // These layers can be considered as occurring in order: the first
            // layer (closest to the connector) is the last to modify the
            // outgoing request.
            .layer(&self.middleware)
            .layer(DispatchLayer::new())
            .service(connector);
        svc.ready().await?.call(op).await
    }
}
