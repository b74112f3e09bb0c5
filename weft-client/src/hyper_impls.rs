/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Adapts a `hyper::Client` into a connector speaking `SdkBody` on both
//! sides.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::Service;
use weft_http::body::SdkBody;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Clone, Debug)]
pub struct HyperAdapter<C>(hyper::Client<C, SdkBody>);

impl<C> Service<http::Request<SdkBody>> for HyperAdapter<C>
where
    C: hyper::client::connect::Connect + Clone + Send + Sync + 'static,
{
    type Response = http::Response<SdkBody>;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Service::poll_ready(&mut self.0, cx).map_err(|e| e.into())
    }

    fn call(&mut self, req: http::Request<SdkBody>) -> Self::Future {
        let fut = Service::call(&mut self.0, req);
        Box::pin(async move { Ok(fut.await?.map(SdkBody::from)) })
    }
}

impl<C> From<hyper::Client<C, SdkBody>> for HyperAdapter<C> {
    fn from(hyper_client: hyper::Client<C, SdkBody>) -> Self {
        HyperAdapter(hyper_client)
    }
}
