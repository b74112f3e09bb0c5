/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The bottom of the middleware stack: detach the property bag and hand the
//! plain HTTP request to the connector.

use crate::SendOperationError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use weft_http::body::SdkBody;
use weft_http::operation;

#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct DispatchLayer;

impl DispatchLayer {
    pub fn new() -> Self {
        DispatchLayer
    }
}

impl<S> Layer<S> for DispatchLayer
where
    S: Service<http::Request<SdkBody>>,
{
    type Service = DispatchService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DispatchService { inner }
    }
}

#[derive(Clone, Debug)]
pub struct DispatchService<S> {
    inner: S,
}

impl<S> Service<operation::Request> for DispatchService<S>
where
    S: Service<http::Request<SdkBody>, Response = http::Response<SdkBody>>,
    S::Error: Into<crate::BoxError>,
    S::Future: Send + 'static,
{
    type Response = http::Response<SdkBody>;
    type Error = SendOperationError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|e| SendOperationError::RequestDispatchError(e.into()))
    }

    fn call(&mut self, req: operation::Request) -> Self::Future {
        // The property bag is dropped here; anything later stages need must
        // already have been recorded on the HTTP request itself.
        let (req, _property_bag) = req.into_parts();
        tracing::trace!(request = ?req, "dispatching request");
        let future = self.inner.call(req);
        Box::pin(async move {
            future
                .await
                .map_err(|e| SendOperationError::RequestDispatchError(e.into()))
        })
    }
}
