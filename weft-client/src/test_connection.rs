/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Scripted connectors for testing clients without a network.

use http::header::HeaderName;
use std::future::{ready, Ready};
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tower::Service;
use weft_http::body::SdkBody;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

type ConnectVec<B> = Vec<(http::Request<SdkBody>, http::Response<B>)>;

/// A recorded request paired with the request the test expected.
#[derive(Debug)]
pub struct ValidateRequest {
    pub expected: http::Request<SdkBody>,
    pub actual: http::Request<SdkBody>,
}

impl ValidateRequest {
    /// Assert that the actual request matches the expected one: URI, body,
    /// and every expected header not in `ignore_headers`.
    pub fn assert_matches(&self, ignore_headers: Vec<HeaderName>) {
        let (actual, expected) = (&self.actual, &self.expected);
        for (name, value) in expected.headers() {
            if !ignore_headers.contains(name) {
                let actual_header = actual
                    .headers()
                    .get(name)
                    .unwrap_or_else(|| panic!("header `{}` missing", name));
                assert_eq!(
                    actual_header, value,
                    "header mismatch for `{}` (uri: {})",
                    name,
                    actual.uri()
                );
            }
        }
        assert_eq!(
            actual.body().bytes(),
            expected.body().bytes(),
            "body mismatch (uri: {})",
            actual.uri()
        );
        assert_eq!(actual.uri(), expected.uri());
    }
}

/// A connector that replays a script of expected requests and canned
/// responses, recording what it actually received.
#[derive(Debug)]
pub struct TestConnection<B> {
    data: Arc<Mutex<ConnectVec<B>>>,
    requests: Arc<Mutex<Vec<ValidateRequest>>>,
}

// derive(Clone) would put a bound on B
impl<B> Clone for TestConnection<B> {
    fn clone(&self) -> Self {
        TestConnection {
            data: self.data.clone(),
            requests: self.requests.clone(),
        }
    }
}

impl<B> TestConnection<B> {
    pub fn new(mut data: ConnectVec<B>) -> Self {
        data.reverse();
        TestConnection {
            data: Arc::new(Mutex::new(data)),
            requests: Default::default(),
        }
    }

    pub fn requests(&self) -> impl Deref<Target = Vec<ValidateRequest>> + '_ {
        self.requests.lock().unwrap()
    }

    /// Panic unless every scripted event was consumed.
    pub fn assert_requests_match(&self, ignore_headers: Vec<HeaderName>) {
        for req in self.requests().iter() {
            req.assert_matches(ignore_headers.clone());
        }
        let remaining = self.data.lock().unwrap().len();
        assert_eq!(remaining, 0, "{} scripted responses were never used", remaining);
    }
}

impl<B> Service<http::Request<SdkBody>> for TestConnection<B>
where
    B: Into<SdkBody>,
{
    type Response = http::Response<SdkBody>;
    type Error = BoxError;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, actual: http::Request<SdkBody>) -> Self::Future {
        match self.data.lock().unwrap().pop() {
            Some((expected, response)) => {
                self.requests
                    .lock()
                    .unwrap()
                    .push(ValidateRequest { expected, actual });
                ready(Ok(response.map(|body| body.into())))
            }
            None => ready(Err(format!(
                "got an unexpected request: {} {}",
                actual.method(),
                actual.uri()
            )
            .into())),
        }
    }
}

/// A connector that captures a single request for inspection and replies
/// with a canned response (HTTP 200 with an empty body by default).
#[derive(Clone, Debug)]
pub struct CaptureRequestHandler(Arc<Mutex<Inner>>);

#[derive(Debug)]
struct Inner {
    response: Option<http::Response<SdkBody>>,
    sender: Option<oneshot::Sender<http::Request<SdkBody>>>,
}

/// The receiving half of [`capture_request`].
#[derive(Debug)]
pub struct CaptureRequestReceiver {
    receiver: oneshot::Receiver<http::Request<SdkBody>>,
}

impl CaptureRequestReceiver {
    pub fn expect_request(mut self) -> http::Request<SdkBody> {
        self.receiver.try_recv().expect("no request was received")
    }
}

pub fn capture_request(
    response: Option<http::Response<SdkBody>>,
) -> (CaptureRequestHandler, CaptureRequestReceiver) {
    let (tx, rx) = oneshot::channel();
    (
        CaptureRequestHandler(Arc::new(Mutex::new(Inner {
            response,
            sender: Some(tx),
        }))),
        CaptureRequestReceiver { receiver: rx },
    )
}

impl Service<http::Request<SdkBody>> for CaptureRequestHandler {
    type Response = http::Response<SdkBody>;
    type Error = BoxError;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<SdkBody>) -> Self::Future {
        let mut inner = self.0.lock().unwrap();
        inner
            .sender
            .take()
            .expect("called more than once")
            .send(request)
            .expect("receiver was dropped");
        let response = inner.response.take().unwrap_or_else(|| {
            http::Response::builder()
                .status(200)
                .body(SdkBody::empty())
                .expect("valid response")
        });
        ready(Ok(response))
    }
}
