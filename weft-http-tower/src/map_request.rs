/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Layers lifting [`MapRequest`] and [`AsyncMapRequest`] stages into tower
//! services.

use crate::SendOperationError;
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use weft_http::middleware::{AsyncMapRequest, MapRequest};
use weft_http::operation;

/// A [`Layer`] that applies a synchronous request-mapping stage.
#[derive(Debug)]
pub struct MapRequestLayer<M> {
    mapper: M,
}

impl<M> MapRequestLayer<M> {
    pub fn for_mapper(mapper: M) -> Self {
        MapRequestLayer { mapper }
    }
}

impl<S, M> Layer<S> for MapRequestLayer<M>
where
    M: Clone,
{
    type Service = MapRequestService<S, M>;

    fn layer(&self, inner: S) -> Self::Service {
        MapRequestService {
            inner,
            mapper: self.mapper.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MapRequestService<S, M> {
    inner: S,
    mapper: M,
}

#[pin_project(project = MapRequestFutureProj)]
pub enum MapRequestFuture<F, T, E> {
    /// The stage succeeded; poll the inner service's future.
    Inner(#[pin] F),
    /// The stage failed; the error is returned immediately.
    Ready(Option<Result<T, E>>),
}

impl<F, T, E> Future for MapRequestFuture<F, T, E>
where
    F: Future<Output = Result<T, E>>,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            MapRequestFutureProj::Inner(f) => f.poll(cx),
            MapRequestFutureProj::Ready(result) => {
                Poll::Ready(result.take().expect("polled after completion"))
            }
        }
    }
}

impl<S, M> Service<operation::Request> for MapRequestService<S, M>
where
    S: Service<operation::Request, Error = SendOperationError>,
    M: MapRequest,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = MapRequestFuture<S::Future, S::Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: operation::Request) -> Self::Future {
        let span = tracing::debug_span!("map_request", stage = %self.mapper.name());
        let _enter = span.enter();
        match self.mapper.apply(req) {
            Err(e) => MapRequestFuture::Ready(Some(Err(
                SendOperationError::RequestConstructionError(e.into()),
            ))),
            Ok(req) => MapRequestFuture::Inner(self.inner.call(req)),
        }
    }
}

/// A [`Layer`] that applies an asynchronous request-mapping stage.
#[derive(Debug)]
pub struct AsyncMapRequestLayer<M> {
    mapper: M,
}

impl<M> AsyncMapRequestLayer<M> {
    pub fn for_mapper(mapper: M) -> Self {
        AsyncMapRequestLayer { mapper }
    }
}

impl<S, M> Layer<S> for AsyncMapRequestLayer<M>
where
    M: Clone,
{
    type Service = AsyncMapRequestService<S, M>;

    fn layer(&self, inner: S) -> Self::Service {
        AsyncMapRequestService {
            inner,
            mapper: self.mapper.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AsyncMapRequestService<S, M> {
    inner: S,
    mapper: M,
}

impl<S, M> Service<operation::Request> for AsyncMapRequestService<S, M>
where
    S: Service<operation::Request, Error = SendOperationError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    M: AsyncMapRequest,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: operation::Request) -> Self::Future {
        // Clone the inner service to take ownership inside the future; the
        // clone takes the readiness we just observed (tower's documented
        // pattern for buffering a service into an owned future).
        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);
        let mapped = self.mapper.apply(req);
        Box::pin(async move {
            let req = mapped
                .await
                .map_err(|e| SendOperationError::RequestConstructionError(e.into()))?;
            inner.call(req).await
        })
    }
}

#[cfg(test)]
mod test {
    use super::{MapRequestLayer, MapRequestService};
    use crate::SendOperationError;
    use http::header::{HeaderName, HeaderValue};
    use std::convert::Infallible;
    use tower::{service_fn, Layer, Service, ServiceExt};
    use weft_http::body::SdkBody;
    use weft_http::middleware::MapRequest;
    use weft_http::operation;

    #[derive(Clone)]
    struct AddHeader;

    impl MapRequest for AddHeader {
        type Error = Infallible;

        fn name(&self) -> &'static str {
            "add_header"
        }

        fn apply(&self, request: operation::Request) -> Result<operation::Request, Self::Error> {
            request.augment(|mut req, _| {
                req.headers_mut().insert(
                    HeaderName::from_static("x-test"),
                    HeaderValue::from_static("injected"),
                );
                Ok(req)
            })
        }
    }

    #[tokio::test]
    async fn stage_runs_before_the_inner_service() {
        let inner = service_fn(|req: operation::Request| async move {
            assert!(req.http().headers().contains_key("x-test"));
            Result::<_, SendOperationError>::Ok(http::Response::new(SdkBody::empty()))
        });
        let mut svc: MapRequestService<_, AddHeader> =
            MapRequestLayer::for_mapper(AddHeader).layer(inner);
        let req = operation::Request::new(http::Request::new(SdkBody::empty()));
        svc.ready().await.unwrap().call(req).await.unwrap();
    }
}
