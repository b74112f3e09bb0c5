/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Connection types for dispatching signed requests.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use weft_http::body::SdkBody;

type BoxError = Box<dyn Error + Send + Sync>;
type BoxFuture = Pin<Box<dyn Future<Output = Result<http::Response<SdkBody>, BoxError>> + Send>>;

/// A good base connection type for most use cases. It supports:
/// 1. HTTPS over the default TLS stack
/// 2. A [`TestConnection`](weft_client::test_connection::TestConnection)
/// 3. Any boxed implementation of [`HttpService`]
pub enum Standard {
    #[cfg(feature = "native-tls")]
    Https(weft_client::Https),
    #[cfg(feature = "test-util")]
    Test(weft_client::test_connection::TestConnection<SdkBody>),
    Dyn(Box<dyn HttpService>),
}

impl Standard {
    /// Connect over HTTPS.
    #[cfg(feature = "native-tls")]
    pub fn https() -> Self {
        let https = hyper_tls::HttpsConnector::new();
        let client = hyper::Client::builder().build::<_, SdkBody>(https);
        Standard::Https(weft_client::hyper_impls::HyperAdapter::from(client))
    }

    /// Replay a scripted set of request/response pairs; test use only.
    #[cfg(feature = "test-util")]
    pub fn test(connection: weft_client::test_connection::TestConnection<SdkBody>) -> Self {
        Standard::Test(connection)
    }

    /// Dispatch through a custom connection.
    pub fn new(connection: impl HttpService + 'static) -> Self {
        Standard::Dyn(Box::new(connection))
    }
}

impl Clone for Standard {
    fn clone(&self) -> Self {
        match self {
            #[cfg(feature = "native-tls")]
            Standard::Https(client) => Standard::Https(client.clone()),
            #[cfg(feature = "test-util")]
            Standard::Test(test_conn) => Standard::Test(test_conn.clone()),
            Standard::Dyn(box_conn) => Standard::Dyn(box_conn.clone()),
        }
    }
}

impl Clone for Box<dyn HttpService> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An object-safe connection: anything that can take a request and
/// asynchronously produce a response.
pub trait HttpService: HttpServiceClone + Send + Sync {
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), BoxError>>;
    fn call(&mut self, req: http::Request<SdkBody>) -> BoxFuture;
}

pub trait HttpServiceClone {
    fn clone_box(&self) -> Box<dyn HttpService>;
}

impl<T> HttpServiceClone for T
where
    T: HttpService + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn HttpService> {
        Box::new(self.clone())
    }
}

impl tower::Service<http::Request<SdkBody>> for Standard {
    type Response = http::Response<SdkBody>;
    type Error = BoxError;
    type Future = StandardFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        match self {
            #[cfg(feature = "native-tls")]
            Standard::Https(https) => tower::Service::poll_ready(https, cx),
            #[cfg(feature = "test-util")]
            Standard::Test(_) => Poll::Ready(Ok(())),
            Standard::Dyn(conn) => conn.poll_ready(cx),
        }
    }

    fn call(&mut self, req: http::Request<SdkBody>) -> Self::Future {
        match self {
            #[cfg(feature = "native-tls")]
            Standard::Https(https) => StandardFuture::Https(tower::Service::call(https, req)),
            #[cfg(feature = "test-util")]
            Standard::Test(conn) => StandardFuture::TestConn(tower::Service::call(conn, req)),
            Standard::Dyn(conn) => StandardFuture::Dyn(conn.call(req)),
        }
    }
}

#[pin_project::pin_project(project = FutProj)]
pub enum StandardFuture {
    #[cfg(feature = "native-tls")]
    Https(#[pin] <weft_client::Https as tower::Service<http::Request<SdkBody>>>::Future),
    #[cfg(feature = "test-util")]
    TestConn(
        #[pin] std::future::Ready<Result<http::Response<SdkBody>, BoxError>>,
    ),
    Dyn(#[pin] BoxFuture),
}

impl Future for StandardFuture {
    type Output = Result<http::Response<SdkBody>, BoxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            #[cfg(feature = "native-tls")]
            FutProj::Https(fut) => fut.poll(cx),
            #[cfg(feature = "test-util")]
            FutProj::TestConn(ready_fut) => ready_fut.poll(cx),
            FutProj::Dyn(dyn_fut) => dyn_fut.poll(cx),
        }
    }
}
