/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The top of the middleware stack: unwrap the operation envelope, send the
//! request downstream, then parse the response with the operation's handler.

use crate::SendOperationError;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use weft_http::body::SdkBody;
use weft_http::middleware::load_response;
use weft_http::operation::Operation;
use weft_http::response::ParseHttpResponse;
use weft_http::result::{SdkError, SdkSuccess};

/// A [`Layer`] that parses raw responses with the operation's response
/// handler.
///
/// `O` and `R` are phantom: the layer is generic so the output service has a
/// concrete `Service<Operation<O, R>>` impl.
#[derive(Debug)]
pub struct ParseResponseLayer<O, R> {
    _output_type: PhantomData<(O, R)>,
}

impl<O, R> ParseResponseLayer<O, R> {
    pub fn new() -> Self {
        ParseResponseLayer {
            _output_type: PhantomData,
        }
    }
}

impl<O, R> Default for ParseResponseLayer<O, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, O, R> Layer<S> for ParseResponseLayer<O, R>
where
    S: Service<weft_http::operation::Request>,
{
    type Service = ParseResponseService<S, O, R>;

    fn layer(&self, inner: S) -> Self::Service {
        ParseResponseService {
            inner,
            _output_type: PhantomData,
        }
    }
}

#[derive(Debug)]
pub struct ParseResponseService<S, O, R> {
    inner: S,
    _output_type: PhantomData<(O, R)>,
}

impl<S: Clone, O, R> Clone for ParseResponseService<S, O, R> {
    fn clone(&self) -> Self {
        ParseResponseService {
            inner: self.inner.clone(),
            _output_type: PhantomData,
        }
    }
}

impl<S, O, T, E, R> Service<Operation<O, R>> for ParseResponseService<S, O, R>
where
    S: Service<
        weft_http::operation::Request,
        Response = http::Response<SdkBody>,
        Error = SendOperationError,
    >,
    S::Future: Send + 'static,
    O: ParseHttpResponse<SdkBody, Output = Result<T, E>> + Send + Sync + 'static,
{
    type Response = SdkSuccess<T>;
    type Error = SdkError<E>;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(|e| e.into())
    }

    fn call(&mut self, req: Operation<O, R>) -> Self::Future {
        let (req, parts) = req.into_request_response();
        let handler = parts.response_handler;
        let resp = self.inner.call(req);
        Box::pin(async move {
            match resp.await {
                Err(e) => Err(e.into()),
                Ok(resp) => load_response(resp, &handler).await,
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::ParseResponseLayer;
    use crate::SendOperationError;
    use bytes::Bytes;
    use tower::{service_fn, Layer, Service, ServiceExt};
    use weft_http::body::SdkBody;
    use weft_http::operation::{Operation, Request};
    use weft_http::response::ParseStrictResponse;
    use weft_http::result::SdkError;

    #[derive(Clone)]
    struct UppercaseEcho;

    impl ParseStrictResponse for UppercaseEcho {
        type Output = Result<String, String>;

        fn parse(&self, response: &http::Response<Bytes>) -> Self::Output {
            Ok(String::from_utf8_lossy(response.body()).to_uppercase())
        }
    }

    #[tokio::test]
    async fn parses_the_loaded_body() {
        let inner = service_fn(|_req: Request| async {
            Result::<_, SendOperationError>::Ok(http::Response::new(SdkBody::from("quiet")))
        });
        let mut svc = ParseResponseLayer::<UppercaseEcho, ()>::new().layer(inner);
        let op = Operation::new(
            Request::new(http::Request::new(SdkBody::empty())),
            UppercaseEcho,
        );
        let out = svc.ready().await.unwrap().call(op).await.unwrap();
        assert_eq!(out.parsed, "QUIET");
    }

    #[tokio::test]
    async fn dispatch_errors_become_sdk_errors() {
        let inner = service_fn(|_req: Request| async {
            Result::<http::Response<SdkBody>, _>::Err(SendOperationError::RequestDispatchError(
                "connection refused".into(),
            ))
        });
        let mut svc = ParseResponseLayer::<UppercaseEcho, ()>::new().layer(inner);
        let op = Operation::new(
            Request::new(http::Request::new(SdkBody::empty())),
            UppercaseEcho,
        );
        match svc.ready().await.unwrap().call(op).await {
            Err(SdkError::DispatchFailure(err)) => {
                assert_eq!(format!("{}", err), "connection refused")
            }
            other => panic!("expected a dispatch failure, got {:?}", other.is_ok()),
        }
    }
}
